//! Timing constants and persistent configuration.
//!
//! Gesture timing depends on the platform's gesture-recognition constants
//! (tap timeout, long-press timeout, ...). They are resolved once into a
//! [`TimingConfig`] when a [`UiController`](crate::driver::UiController) is
//! built, falling back to documented defaults for anything the platform
//! does not report.
//!
//! User settings live in `~/.tapwright/config.json`.
//!
//! # Example
//!
//! ```no_run
//! use tapwright_core::config::{TapwrightConfig, TimingConfig, NoPlatformTimings};
//!
//! // Load (returns defaults if file doesn't exist)
//! let config = TapwrightConfig::load();
//! let timing = config.timing.unwrap_or_else(|| TimingConfig::resolve(&NoPlatformTimings));
//! assert!(timing.long_press_timeout_ms > timing.tap_timeout_ms);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

const CONFIG_FILENAME: &str = "config.json";

/// Default tap timeout: how long a press may last and still be a tap candidate.
pub const DEFAULT_TAP_TIMEOUT_MS: u64 = 100;
/// Default long-press timeout.
pub const DEFAULT_LONG_PRESS_TIMEOUT_MS: u64 = 500;
/// Default maximum interval between the two taps of a double tap.
pub const DEFAULT_DOUBLE_TAP_TIMEOUT_MS: u64 = 300;
/// Default minimum interval between the two taps of a double tap, used when
/// the platform does not report one.
pub const DEFAULT_DOUBLE_TAP_MIN_TIME_MS: u64 = 0;
/// Default time a view shows its pressed state after a tap.
pub const DEFAULT_PRESSED_STATE_DURATION_MS: u64 = 64;
/// Default share of a view that must be visible before a gesture.
pub const DEFAULT_VISIBILITY_PERCENT: u8 = 90;
/// Default bound on render requests while bringing adapter data into view.
pub const DEFAULT_MAX_RENDER_REQUESTS: u32 = 600;

/// Returns the tapwright directory path (`~/.tapwright/`).
///
/// Creates the directory if it doesn't exist.
pub fn tapwright_dir() -> PathBuf {
    let dir = dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".tapwright");
    std::fs::create_dir_all(&dir).ok();
    dir
}

/// Platform-reported gesture constants.
///
/// Every query may come back empty when the platform does not expose the
/// value; [`TimingConfig::resolve`] substitutes the defaults.
pub trait PlatformTimings {
    fn tap_timeout_ms(&self) -> Option<u64>;
    fn long_press_timeout_ms(&self) -> Option<u64>;
    fn double_tap_timeout_ms(&self) -> Option<u64>;
    fn double_tap_min_time_ms(&self) -> Option<u64>;
    fn pressed_state_duration_ms(&self) -> Option<u64>;
}

/// A platform that reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlatformTimings;

impl PlatformTimings for NoPlatformTimings {
    fn tap_timeout_ms(&self) -> Option<u64> {
        None
    }
    fn long_press_timeout_ms(&self) -> Option<u64> {
        None
    }
    fn double_tap_timeout_ms(&self) -> Option<u64> {
        None
    }
    fn double_tap_min_time_ms(&self) -> Option<u64> {
        None
    }
    fn pressed_state_duration_ms(&self) -> Option<u64> {
        None
    }
}

/// Gesture timing constants, resolved once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Tap timeout in milliseconds.
    pub tap_timeout_ms: u64,
    /// Long-press timeout in milliseconds.
    pub long_press_timeout_ms: u64,
    /// Double-tap timeout in milliseconds.
    pub double_tap_timeout_ms: u64,
    /// Minimum double-tap interval in milliseconds. 0 disables the wait.
    pub double_tap_min_time_ms: u64,
    /// Pressed-state duration in milliseconds. 0 disables the hold.
    pub pressed_state_duration_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tap_timeout_ms: DEFAULT_TAP_TIMEOUT_MS,
            long_press_timeout_ms: DEFAULT_LONG_PRESS_TIMEOUT_MS,
            double_tap_timeout_ms: DEFAULT_DOUBLE_TAP_TIMEOUT_MS,
            double_tap_min_time_ms: DEFAULT_DOUBLE_TAP_MIN_TIME_MS,
            pressed_state_duration_ms: DEFAULT_PRESSED_STATE_DURATION_MS,
        }
    }
}

impl TimingConfig {
    /// Queries the platform once, keeping defaults for unreported values.
    pub fn resolve(platform: &dyn PlatformTimings) -> Self {
        let defaults = Self::default();
        Self {
            tap_timeout_ms: platform.tap_timeout_ms().unwrap_or(defaults.tap_timeout_ms),
            long_press_timeout_ms: platform
                .long_press_timeout_ms()
                .unwrap_or(defaults.long_press_timeout_ms),
            double_tap_timeout_ms: platform
                .double_tap_timeout_ms()
                .unwrap_or(defaults.double_tap_timeout_ms),
            double_tap_min_time_ms: platform
                .double_tap_min_time_ms()
                .unwrap_or(defaults.double_tap_min_time_ms),
            pressed_state_duration_ms: platform
                .pressed_state_duration_ms()
                .unwrap_or(defaults.pressed_state_duration_ms),
        }
    }

    pub fn tap_timeout(&self) -> Duration {
        Duration::from_millis(self.tap_timeout_ms)
    }

    pub fn long_press_timeout(&self) -> Duration {
        Duration::from_millis(self.long_press_timeout_ms)
    }

    pub fn double_tap_timeout(&self) -> Duration {
        Duration::from_millis(self.double_tap_timeout_ms)
    }

    pub fn double_tap_min_time(&self) -> Duration {
        Duration::from_millis(self.double_tap_min_time_ms)
    }

    pub fn pressed_state_duration(&self) -> Duration {
        Duration::from_millis(self.pressed_state_duration_ms)
    }
}

/// Persistent tapwright configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapwrightConfig {
    /// Fixed timing constants. When absent the platform is queried.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingConfig>,

    /// Share of a view that must be visible before a gesture runs.
    #[serde(default = "default_visibility_percent")]
    pub visibility_percent: u8,

    /// Upper bound on render requests while loading adapter data.
    #[serde(default = "default_max_render_requests")]
    pub max_render_requests: u32,

    /// Directory for session JSON Lines logs. Defaults to `~/.tapwright/logs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

fn default_visibility_percent() -> u8 {
    DEFAULT_VISIBILITY_PERCENT
}

fn default_max_render_requests() -> u32 {
    DEFAULT_MAX_RENDER_REQUESTS
}

impl Default for TapwrightConfig {
    fn default() -> Self {
        Self {
            timing: None,
            visibility_percent: DEFAULT_VISIBILITY_PERCENT,
            max_render_requests: DEFAULT_MAX_RENDER_REQUESTS,
            log_dir: None,
        }
    }
}

impl TapwrightConfig {
    /// Load config from `~/.tapwright/config.json`.
    ///
    /// Returns [`Default`] if the file does not exist or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&tapwright_dir().join(CONFIG_FILENAME))
    }

    /// Load config from `path`, falling back to [`Default`] like [`load`](Self::load).
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to `~/.tapwright/config.json`.
    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(&tapwright_dir().join(CONFIG_FILENAME))
    }

    /// Save config as pretty JSON to `path`.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Timing to use: the configured override or whatever the platform reports.
    pub fn timing_for(&self, platform: &dyn PlatformTimings) -> TimingConfig {
        self.timing.unwrap_or_else(|| TimingConfig::resolve(platform))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowDevice;

    impl PlatformTimings for SlowDevice {
        fn tap_timeout_ms(&self) -> Option<u64> {
            Some(180)
        }
        fn long_press_timeout_ms(&self) -> Option<u64> {
            Some(900)
        }
        fn double_tap_timeout_ms(&self) -> Option<u64> {
            None
        }
        fn double_tap_min_time_ms(&self) -> Option<u64> {
            None
        }
        fn pressed_state_duration_ms(&self) -> Option<u64> {
            Some(0)
        }
    }

    #[test]
    fn resolve_without_platform_uses_defaults() {
        assert_eq!(TimingConfig::resolve(&NoPlatformTimings), TimingConfig::default());
    }

    #[test]
    fn resolve_prefers_reported_values() {
        let timing = TimingConfig::resolve(&SlowDevice);
        assert_eq!(timing.tap_timeout_ms, 180);
        assert_eq!(timing.long_press_timeout_ms, 900);
        assert_eq!(timing.double_tap_timeout_ms, DEFAULT_DOUBLE_TAP_TIMEOUT_MS);
        assert_eq!(timing.double_tap_min_time(), Duration::ZERO);
        assert_eq!(timing.pressed_state_duration(), Duration::ZERO);
    }

    #[test]
    fn default_config_queries_platform() {
        let config = TapwrightConfig::default();
        assert!(config.timing.is_none());
        assert_eq!(config.visibility_percent, 90);
        assert_eq!(config.timing_for(&SlowDevice).tap_timeout_ms, 180);
    }

    #[test]
    fn configured_timing_overrides_platform() {
        let config = TapwrightConfig {
            timing: Some(TimingConfig {
                tap_timeout_ms: 50,
                ..TimingConfig::default()
            }),
            ..TapwrightConfig::default()
        };
        assert_eq!(config.timing_for(&SlowDevice).tap_timeout_ms, 50);
    }

    #[test]
    fn deserialize_empty_json() {
        let loaded: TapwrightConfig = serde_json::from_str("{}").unwrap();
        assert!(loaded.timing.is_none());
        assert_eq!(loaded.visibility_percent, DEFAULT_VISIBILITY_PERCENT);
        assert_eq!(loaded.max_render_requests, DEFAULT_MAX_RENDER_REQUESTS);
    }

    #[test]
    fn partial_timing_fills_defaults() {
        let loaded: TapwrightConfig =
            serde_json::from_str(r#"{"timing":{"long_press_timeout_ms":700}}"#).unwrap();
        let timing = loaded.timing.unwrap();
        assert_eq!(timing.long_press_timeout_ms, 700);
        assert_eq!(timing.tap_timeout_ms, DEFAULT_TAP_TIMEOUT_MS);
    }

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tapwright-config-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn load_from_missing_file_is_default() {
        let config = TapwrightConfig::load_from(&scratch_file("missing"));
        assert!(config.timing.is_none());
        assert_eq!(config.visibility_percent, DEFAULT_VISIBILITY_PERCENT);
    }

    #[test]
    fn load_from_unparsable_file_is_default() {
        let path = scratch_file("garbage");
        std::fs::write(&path, "{ not json").unwrap();
        let config = TapwrightConfig::load_from(&path);
        assert_eq!(config.max_render_requests, DEFAULT_MAX_RENDER_REQUESTS);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn saved_config_loads_back() {
        let path = scratch_file("saved");
        let config = TapwrightConfig {
            timing: Some(TimingConfig {
                double_tap_min_time_ms: 40,
                ..TimingConfig::default()
            }),
            visibility_percent: 75,
            ..TapwrightConfig::default()
        };
        config.save_to(&path).unwrap();

        let loaded = TapwrightConfig::load_from(&path);
        assert_eq!(loaded.visibility_percent, 75);
        assert_eq!(loaded.timing.map(|t| t.double_tap_min_time_ms), Some(40));
        std::fs::remove_file(path).ok();
    }
}
