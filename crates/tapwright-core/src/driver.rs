//! Boundaries to the platform: event injection and idle synchronization.
//!
//! This module defines the two collaborator traits the gesture engine is
//! written against:
//!
//! - [`EventInjector`] delivers events to the application under test.
//! - [`IdleSynchronizer`] lets the application's main execution context
//!   drain its queue between events.
//!
//! [`UiController`] bundles both with the resolved [`TimingConfig`] and the
//! [`EventClock`]; every action receives one.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tapwright_core::config::TimingConfig;
//! use tapwright_core::driver::{EventInjector, SleepingSynchronizer, UiController};
//!
//! # fn host_injector() -> Arc<dyn EventInjector> { unimplemented!() }
//! let controller = UiController::new(
//!     host_injector(),
//!     Arc::new(SleepingSynchronizer),
//!     TimingConfig::default(),
//! );
//! assert_eq!(controller.timing().tap_timeout_ms, 100);
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::TimingConfig;
use crate::event::{EventClock, KeyEvent, MotionEvent};

/// Errors raised by the injection boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InjectionError {
    /// The platform refused to inject into a window the caller does not own.
    #[error("Injection denied by security policy: {0}")]
    SecurityDenied(String),

    /// A down event was rejected on every attempt.
    #[error("Down event rejected after {attempts} attempts")]
    DownRejected {
        /// How many down events were tried.
        attempts: u32,
    },

    /// The injector does not implement the requested operation.
    #[error("Operation not supported by this injector: {0}")]
    Unsupported(String),

    /// Any other injection failure.
    #[error("Injection failed: {0}")]
    Failed(String),
}

/// Delivers synthesized events to the application under test.
///
/// `Ok(false)` means the event was not delivered and the caller may retry;
/// `Err` means the injection cannot work at all (e.g. security denial).
#[async_trait]
pub trait EventInjector: Send + Sync {
    /// Inject one pointer event.
    async fn inject_motion_event(&self, event: &MotionEvent) -> Result<bool, InjectionError>;

    /// Inject a whole gesture atomically.
    ///
    /// Implementations deliver each event no earlier than its `event_time`
    /// relative to the first event, so recognizers see continuous motion.
    async fn inject_motion_event_sequence(
        &self,
        events: &[MotionEvent],
    ) -> Result<bool, InjectionError>;

    /// Inject one key event.
    async fn inject_key_event(&self, event: &KeyEvent) -> Result<bool, InjectionError>;

    /// Type a string through the platform's key character map.
    ///
    /// The default implementation reports the operation as unsupported.
    async fn inject_string(&self, text: &str) -> Result<bool, InjectionError> {
        let _ = text;
        Err(InjectionError::Unsupported("inject_string".to_string()))
    }
}

/// Blocks until the application's main execution context is quiescent.
///
/// Both calls may pump other queued work while they block.
#[async_trait]
pub trait IdleSynchronizer: Send + Sync {
    /// Run the main context until it has no pending work.
    async fn loop_until_idle(&self);

    /// Run the main context for at least `duration`.
    async fn loop_for_at_least(&self, duration: Duration);
}

/// A synchronizer for hosts without an observable main loop.
///
/// Idling yields to the runtime once; timed loops simply sleep.
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepingSynchronizer;

#[async_trait]
impl IdleSynchronizer for SleepingSynchronizer {
    async fn loop_until_idle(&self) {
        tokio::task::yield_now().await;
    }

    async fn loop_for_at_least(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Everything an action needs to drive the application.
#[derive(Clone)]
pub struct UiController {
    injector: Arc<dyn EventInjector>,
    synchronizer: Arc<dyn IdleSynchronizer>,
    timing: TimingConfig,
    clock: EventClock,
}

impl UiController {
    /// Creates a controller. The event clock starts now.
    pub fn new(
        injector: Arc<dyn EventInjector>,
        synchronizer: Arc<dyn IdleSynchronizer>,
        timing: TimingConfig,
    ) -> Self {
        Self {
            injector,
            synchronizer,
            timing,
            clock: EventClock::new(),
        }
    }

    /// The resolved timing constants.
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Current uptime in milliseconds, the time base of every event.
    pub fn uptime_millis(&self) -> u64 {
        self.clock.uptime_millis()
    }

    pub fn injector(&self) -> &Arc<dyn EventInjector> {
        &self.injector
    }

    pub async fn inject_motion_event(&self, event: &MotionEvent) -> Result<bool, InjectionError> {
        self.injector.inject_motion_event(event).await
    }

    pub async fn inject_motion_event_sequence(
        &self,
        events: &[MotionEvent],
    ) -> Result<bool, InjectionError> {
        self.injector.inject_motion_event_sequence(events).await
    }

    pub async fn inject_key_event(&self, event: &KeyEvent) -> Result<bool, InjectionError> {
        self.injector.inject_key_event(event).await
    }

    pub async fn inject_string(&self, text: &str) -> Result<bool, InjectionError> {
        self.injector.inject_string(text).await
    }

    pub async fn loop_until_idle(&self) {
        self.synchronizer.loop_until_idle().await
    }

    pub async fn loop_for_at_least(&self, duration: Duration) {
        self.synchronizer.loop_for_at_least(duration).await
    }
}
