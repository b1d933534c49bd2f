//! Dismissing the soft keyboard.
//!
//! The input method answers a hide request asynchronously and then animates
//! the keyboard away. [`CloseKeyboardAction`] waits for the answer with a
//! timeout, retries requests the input method dropped, and waits out the
//! animation before the next action looks at the screen.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, error, warn};

use crate::action::{Constraints, GestureOutcome, PerformCause, PerformError, ViewAction};
use crate::driver::UiController;
use crate::element::TargetView;

/// How long to wait for the input method to answer a hide request.
pub const HIDE_RESULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Time allowed for the keyboard's close animation.
pub const KEYBOARD_DISMISSAL_DELAY: Duration = Duration::from_millis(300);

/// Hide requests made before giving up.
pub const CLOSE_KEYBOARD_ATTEMPTS: u32 = 3;

/// The input method's answer to a visibility request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImeResult {
    /// The keyboard was shown and still is.
    UnchangedShown,
    /// The keyboard was already hidden.
    UnchangedHidden,
    /// The keyboard is now shown.
    Shown,
    /// The keyboard is now hidden.
    Hidden,
}

impl ImeResult {
    /// Maps the platform's numeric result code.
    pub fn from_code(code: i32) -> Option<ImeResult> {
        match code {
            0 => Some(ImeResult::UnchangedShown),
            1 => Some(ImeResult::UnchangedHidden),
            2 => Some(ImeResult::Shown),
            3 => Some(ImeResult::Hidden),
            _ => None,
        }
    }

    /// True when the keyboard ended up hidden.
    pub fn is_hidden(self) -> bool {
        matches!(self, ImeResult::UnchangedHidden | ImeResult::Hidden)
    }
}

impl fmt::Display for ImeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The platform's input method manager.
#[async_trait]
pub trait InputMethodService: Send + Sync {
    /// Asks the input method to hide the keyboard attached to `view`'s window.
    ///
    /// Returns `None` when no keyboard was shown. Otherwise the receiver
    /// completes once the input method has processed the request; it may
    /// never complete if the request is lost.
    async fn hide_soft_input(&self, view: &dyn TargetView) -> Option<oneshot::Receiver<ImeResult>>;
}

/// What a single hide request came back with.
enum CloseAttempt {
    NotShown,
    Answered(ImeResult),
    TimedOut,
}

/// Closes the soft keyboard.
#[derive(Clone)]
pub struct CloseKeyboardAction {
    ime: Arc<dyn InputMethodService>,
}

impl CloseKeyboardAction {
    pub fn new(ime: Arc<dyn InputMethodService>) -> Self {
        Self { ime }
    }

    async fn try_to_close(
        &self,
        controller: &UiController,
        view: &dyn TargetView,
    ) -> CloseAttempt {
        let Some(result_rx) = self.ime.hide_soft_input(view).await else {
            warn!("attempting to close soft keyboard while it is not shown");
            return CloseAttempt::NotShown;
        };

        match tokio::time::timeout(HIDE_RESULT_TIMEOUT, result_rx).await {
            Ok(Ok(result)) => {
                controller.loop_for_at_least(KEYBOARD_DISMISSAL_DELAY).await;
                CloseAttempt::Answered(result)
            }
            // A dropped sender can no longer answer; same as a timeout.
            Ok(Err(_)) | Err(_) => CloseAttempt::TimedOut,
        }
    }
}

impl fmt::Debug for CloseKeyboardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseKeyboardAction").finish_non_exhaustive()
    }
}

#[async_trait]
impl ViewAction for CloseKeyboardAction {
    fn constraints(&self) -> Constraints {
        Constraints::ANY
    }

    fn description(&self) -> String {
        "close keyboard".to_string()
    }

    async fn perform(
        &self,
        controller: &UiController,
        view: &dyn TargetView,
    ) -> Result<GestureOutcome, PerformError> {
        for attempt in 1..=CLOSE_KEYBOARD_ATTEMPTS {
            match self.try_to_close(controller, view).await {
                CloseAttempt::NotShown => return Ok(GestureOutcome::Success),
                CloseAttempt::Answered(result) if result.is_hidden() => {
                    debug!(%result, "soft keyboard closed");
                    return Ok(GestureOutcome::Success);
                }
                CloseAttempt::Answered(result) => {
                    error!(%result, "soft keyboard still shown after hide request");
                    return Err(PerformError::new(
                        self.description(),
                        view,
                        PerformCause::KeyboardNotHidden(result),
                    ));
                }
                CloseAttempt::TimedOut => warn!(attempt, "timed out waiting for the input method, retrying"),
            }
        }

        Err(PerformError::new(
            self.description(),
            view,
            PerformCause::KeyboardTimeout {
                attempts: CLOSE_KEYBOARD_ATTEMPTS,
            },
        ))
    }
}
