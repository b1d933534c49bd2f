//! The action abstraction and its results.
//!
//! Every gesture or synchronization step is a [`ViewAction`]: it declares
//! the [`Constraints`] a view must satisfy, describes itself, and performs
//! against a view through a [`UiController`].
//!
//! # Outcomes and errors
//!
//! - [`GestureOutcome`] is the tri-state result of a delivered gesture.
//!   `Warning` is not an error: the gesture was injected, but a tap may
//!   have been read as a long-press.
//! - [`PerformError`] is a terminal failure carrying the action
//!   description, the view description and the cause.
//!
//! # Logging
//!
//! [`ActionLog`] records one executed action for a
//! [`Session`](crate::session::Session).
//!
//! # Example
//!
//! ```
//! use tapwright_core::action::{ActionLog, ActionResult, GestureOutcome};
//!
//! assert_eq!(GestureOutcome::Success.combine(GestureOutcome::Warning), GestureOutcome::Warning);
//!
//! let log = ActionLog::new("single click", "Button{id=ok}", ActionResult::from(GestureOutcome::Success), None);
//! println!("Action {} at {}", log.id, log.timestamp);
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::driver::{InjectionError, UiController};
use crate::element::{Point, TargetView};
use crate::event::Precision;

/// Result of a delivered gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureOutcome {
    /// Delivered with the intended timing.
    Success,
    /// Delivered, but the recipient may have misclassified it.
    Warning,
    /// The injector did not deliver the gesture.
    Failure,
}

impl GestureOutcome {
    /// Combines the outcomes of two sub-gestures: failure dominates, then
    /// warning.
    pub fn combine(self, other: GestureOutcome) -> GestureOutcome {
        match (self, other) {
            (GestureOutcome::Failure, _) | (_, GestureOutcome::Failure) => GestureOutcome::Failure,
            (GestureOutcome::Warning, _) | (_, GestureOutcome::Warning) => GestureOutcome::Warning,
            _ => GestureOutcome::Success,
        }
    }
}

impl fmt::Display for GestureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GestureOutcome::Success => "SUCCESS",
            GestureOutcome::Warning => "WARNING",
            GestureOutcome::Failure => "FAILURE",
        };
        f.write_str(s)
    }
}

/// Conditions a view must meet before an action may run on it.
///
/// Actions only declare constraints; the
/// [`InteractionExecutor`](crate::executor::InteractionExecutor) checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Constraints {
    /// Minimum visible share of the view, in percent.
    pub min_visible_percent: Option<u8>,
}

impl Constraints {
    /// No requirements.
    pub const ANY: Constraints = Constraints {
        min_visible_percent: None,
    };

    /// Requires at least `percent` of the view on screen.
    pub fn displaying_at_least(percent: u8) -> Self {
        Self {
            min_visible_percent: Some(percent),
        }
    }

    /// Requires the view to be visible at all.
    pub fn displayed() -> Self {
        Self::displaying_at_least(1)
    }

    /// The stricter combination of both constraint sets.
    pub fn and(self, other: Constraints) -> Constraints {
        let min_visible_percent = match (self.min_visible_percent, other.min_visible_percent) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        Constraints { min_visible_percent }
    }
}

impl fmt::Display for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.min_visible_percent {
            Some(percent) => write!(f, "at least {}% of the view's area is displayed", percent),
            None => f.write_str("any view"),
        }
    }
}

/// Why an action failed.
#[derive(Error, Debug)]
pub enum PerformCause {
    /// The injection boundary failed outright.
    #[error(transparent)]
    Injection(#[from] InjectionError),

    /// Every click attempt failed.
    #[error(
        "Couldn't click at: {coordinates} precision: {precision} . Tapper: {tapper} coordinate provider: {provider} precision describer: {describer}. Tried {attempts} times. With Rollback? {rollback}"
    )]
    ClickExhausted {
        coordinates: Point,
        precision: Precision,
        tapper: String,
        provider: String,
        describer: String,
        attempts: u32,
        rollback: bool,
    },

    /// Every swipe attempt failed.
    #[error(
        "Couldn't swipe from: {start} to: {end} precision: {precision} . Swiper: {swiper} start coordinate provider: {provider} precision describer: {describer}. Tried {attempts} times"
    )]
    SwipeExhausted {
        start: Point,
        end: Point,
        precision: Precision,
        swiper: String,
        provider: String,
        describer: String,
        attempts: u32,
    },

    /// The view did not satisfy the action's constraints.
    #[error("Action will not be performed because the target view does not match: {0}")]
    ConstraintNotMet(String),

    /// A pre-action hook rejected the view.
    #[error("Pre-action check '{name}' failed: {message}")]
    HookFailed { name: String, message: String },

    /// The input method never answered the hide request.
    #[error("Wait on operation result timed out after {attempts} attempts")]
    KeyboardTimeout { attempts: u32 },

    /// The input method answered, but the keyboard is still shown.
    #[error("Attempt to close the soft keyboard did not result in soft keyboard to be hidden. resultCode = {0:?}")]
    KeyboardNotHidden(crate::keyboard::ImeResult),

    /// Adapter data could not be selected.
    #[error("{0}")]
    AdapterData(String),

    /// Adapter data never rendered.
    #[error("Data was not rendered after {requests} render requests")]
    AdapterRenderTimeout { requests: u32 },

    /// A key or text event was not delivered.
    #[error("{0}")]
    NotDelivered(String),
}

/// A failed action, with enough context to reproduce it.
#[derive(Error, Debug)]
#[error("Error performing '{action}' on view '{view}'. Cause: {cause}")]
pub struct PerformError {
    /// Description of the action, including coordinates when known.
    pub action: String,
    /// Description of the target view.
    pub view: String,
    /// The underlying failure.
    #[source]
    pub cause: PerformCause,
}

impl PerformError {
    pub fn new(action: impl Into<String>, view: &dyn TargetView, cause: impl Into<PerformCause>) -> Self {
        Self {
            action: action.into(),
            view: view.description(),
            cause: cause.into(),
        }
    }
}

/// An action performed on a single view.
///
/// Actions are immutable and may be performed any number of times, on any
/// number of views.
#[async_trait]
pub trait ViewAction: Send + Sync {
    /// Requirements the view must meet before [`perform`](Self::perform).
    fn constraints(&self) -> Constraints;

    /// Short human-readable description, e.g. "single click".
    fn description(&self) -> String;

    /// Performs the action.
    async fn perform(
        &self,
        controller: &UiController,
        view: &dyn TargetView,
    ) -> Result<GestureOutcome, PerformError>;
}

/// A named check run against the view before every action.
#[derive(Clone)]
pub struct PreActionHook {
    name: String,
    check: Arc<dyn Fn(&dyn TargetView) -> Result<(), String> + Send + Sync>,
}

impl PreActionHook {
    pub fn new(
        name: impl Into<String>,
        check: impl Fn(&dyn TargetView) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the check, mapping a rejection to [`PerformCause::HookFailed`].
    pub fn check(&self, view: &dyn TargetView) -> Result<(), PerformCause> {
        (self.check)(view).map_err(|message| PerformCause::HookFailed {
            name: self.name.clone(),
            message,
        })
    }
}

impl fmt::Debug for PreActionHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreActionHook").field("name", &self.name).finish()
    }
}

/// The result of executing an action, as recorded in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionResult {
    /// The action completed successfully.
    Success,

    /// The action completed, but a tap may have been read as a long-press.
    Warning,

    /// The action failed with the given error message.
    Failure(String),
}

impl From<GestureOutcome> for ActionResult {
    fn from(outcome: GestureOutcome) -> Self {
        match outcome {
            GestureOutcome::Success => ActionResult::Success,
            GestureOutcome::Warning => ActionResult::Warning,
            GestureOutcome::Failure => ActionResult::Failure("gesture was not delivered".to_string()),
        }
    }
}

/// A logged action with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    /// Unique identifier for this log entry.
    pub id: Uuid,

    /// When the action was executed.
    pub timestamp: DateTime<Utc>,

    /// Description of the action.
    pub action: String,

    /// Description of the target view.
    pub view: String,

    /// The result of the action.
    pub result: ActionResult,

    /// How long the action took in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl ActionLog {
    /// Creates a new action log entry with a fresh id and the current time.
    pub fn new(
        action: impl Into<String>,
        view: impl Into<String>,
        result: ActionResult,
        duration_ms: Option<u64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            action: action.into(),
            view: view.into(),
            result,
            duration_ms,
        }
    }
}
