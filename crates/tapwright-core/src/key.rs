//! Key presses and typed text.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::action::{Constraints, GestureOutcome, PerformCause, PerformError, ViewAction};
use crate::click_action::GeneralClickAction;
use crate::driver::{InjectionError, UiController};
use crate::element::TargetView;
use crate::event::{ButtonState, InputSource, KeyAction, KeyEvent};
use crate::location::GeneralLocation;
use crate::press::Press;
use crate::tap::Tap;

/// Attempts per key event before the key press is reported as failed.
pub const MAX_KEY_EVENT_ATTEMPTS: u32 = 4;

pub const KEYCODE_BACK: u32 = 4;
pub const KEYCODE_ENTER: u32 = 66;
pub const KEYCODE_DEL: u32 = 67;
pub const KEYCODE_MENU: u32 = 82;
pub const KEYCODE_SEARCH: u32 = 84;

pub const META_SHIFT_ON: u32 = 0x01;
pub const META_ALT_ON: u32 = 0x02;
pub const META_CTRL_ON: u32 = 0x1000;

/// A key code plus the modifier keys held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub key_code: u32,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Key {
    pub fn new(key_code: u32) -> Self {
        Self {
            key_code,
            shift: false,
            ctrl: false,
            alt: false,
        }
    }

    pub fn with_shift_pressed(mut self, pressed: bool) -> Self {
        self.shift = pressed;
        self
    }

    pub fn with_ctrl_pressed(mut self, pressed: bool) -> Self {
        self.ctrl = pressed;
        self
    }

    pub fn with_alt_pressed(mut self, pressed: bool) -> Self {
        self.alt = pressed;
        self
    }

    /// The modifier bit mask sent with the key events.
    pub fn meta_state(&self) -> u32 {
        let mut meta = 0;
        if self.shift {
            meta |= META_SHIFT_ON;
        }
        if self.ctrl {
            meta |= META_CTRL_ON;
        }
        if self.alt {
            meta |= META_ALT_ON;
        }
        meta
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "keyCode: {}, metaState: {}",
            self.key_code,
            self.meta_state()
        )
    }
}

/// Presses and releases one key.
#[derive(Debug, Clone, Copy)]
pub struct KeyEventAction {
    key: Key,
}

impl KeyEventAction {
    pub fn new(key: Key) -> Self {
        Self { key }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    async fn inject_with_retries(
        &self,
        controller: &UiController,
        action: KeyAction,
    ) -> Result<bool, InjectionError> {
        let event_time = controller.uptime_millis();
        let event = KeyEvent::new(action, event_time, self.key.key_code, self.key.meta_state());
        for attempt in 1..=MAX_KEY_EVENT_ATTEMPTS {
            if controller.inject_key_event(&event).await? {
                return Ok(true);
            }
            debug!(attempt, ?action, key = %self.key, "key event rejected");
        }
        Ok(false)
    }

    async fn send_key_event(&self, controller: &UiController) -> Result<bool, InjectionError> {
        if !self.inject_with_retries(controller, KeyAction::Down).await? {
            return Ok(false);
        }
        self.inject_with_retries(controller, KeyAction::Up).await
    }
}

#[async_trait]
impl ViewAction for KeyEventAction {
    fn constraints(&self) -> Constraints {
        Constraints::displayed()
    }

    fn description(&self) -> String {
        format!("send {} key event", self.key)
    }

    async fn perform(
        &self,
        controller: &UiController,
        view: &dyn TargetView,
    ) -> Result<GestureOutcome, PerformError> {
        match self.send_key_event(controller).await {
            Ok(true) => Ok(GestureOutcome::Success),
            Ok(false) => {
                error!(key = %self.key, "failed to inject key event");
                Err(PerformError::new(
                    self.description(),
                    view,
                    PerformCause::NotDelivered(format!("Failed to inject key event {}", self.key)),
                ))
            }
            Err(e) => {
                error!(key = %self.key, error = %e, "failed to inject key event");
                Err(PerformError::new(self.description(), view, e))
            }
        }
    }
}

/// Types a string into the focused view.
#[derive(Debug, Clone)]
pub struct TypeTextAction {
    text: String,
    tap_to_focus: bool,
    click_action: Option<GeneralClickAction>,
}

impl TypeTextAction {
    /// Types `text` after tapping the view's center to focus it.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tap_to_focus: true,
            click_action: None,
        }
    }

    /// Types into whatever view already has focus.
    pub fn without_focus_tap(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tap_to_focus: false,
            click_action: None,
        }
    }

    /// Uses `click` instead of the default center tap to focus the view.
    pub fn with_focus_click(mut self, click: GeneralClickAction) -> Self {
        self.tap_to_focus = true;
        self.click_action = Some(click);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn default_click() -> GeneralClickAction {
        GeneralClickAction::new(Tap::Single, GeneralLocation::Center, Press::Finger)
            .with_input(InputSource::Unknown, ButtonState::PRIMARY)
    }
}

#[async_trait]
impl ViewAction for TypeTextAction {
    fn constraints(&self) -> Constraints {
        Constraints::displayed()
    }

    fn description(&self) -> String {
        format!("type text({})", self.text)
    }

    async fn perform(
        &self,
        controller: &UiController,
        view: &dyn TargetView,
    ) -> Result<GestureOutcome, PerformError> {
        if self.text.is_empty() {
            warn!("supplied string is empty, nothing is typed");
            return Ok(GestureOutcome::Success);
        }

        if self.tap_to_focus {
            match &self.click_action {
                Some(click) => click.perform(controller, view).await?,
                None => Self::default_click().perform(controller, view).await?,
            };
            controller.loop_until_idle().await;
        }

        match controller.inject_string(&self.text).await {
            Ok(true) => Ok(GestureOutcome::Success),
            Ok(false) => {
                error!(text = %self.text, "failed to type text");
                Err(PerformError::new(
                    self.description(),
                    view,
                    PerformCause::NotDelivered(format!("Failed to type text: {}", self.text)),
                ))
            }
            Err(e) => {
                error!(text = %self.text, error = %e, "failed to type text");
                Err(PerformError::new(self.description(), view, e))
            }
        }
    }
}
