//! Tap strategies: single, long and double taps.
//!
//! Each strategy is a small state machine over one pointer:
//!
//! ```text
//! IDLE -> DOWN_SENT -> (timed wait) -> UP_SENT -> DONE
//!                             \-> CANCEL_SENT (up rejected)
//! ```
//!
//! and reports a [`GestureOutcome`]. A [`GestureOutcome::Warning`] means
//! the press lasted long enough that the application may have seen a
//! long-press instead of a tap.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::action::GestureOutcome;
use crate::driver::{InjectionError, UiController};
use crate::element::Point;
use crate::event::{ButtonState, InputSource, MotionEvent, Precision};
use crate::motion::{send_cancel, send_down, send_up};

/// The kind of tap to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tap {
    /// A short tap, released before the long-press timeout.
    Single,
    /// A press held for 1.5x the long-press timeout.
    Long,
    /// Two single taps separated by the minimum double-tap interval.
    Double,
}

impl Tap {
    /// Lower-case name, as used in action descriptions.
    pub fn name(self) -> &'static str {
        match self {
            Tap::Single => "single",
            Tap::Long => "long",
            Tap::Double => "double",
        }
    }

    /// Performs the tap at `coordinates`.
    ///
    /// `Err` is returned only for failures that retrying cannot fix (the
    /// injector denied access, or every down event was rejected); a
    /// rejected up event is a [`GestureOutcome::Failure`].
    pub async fn send_tap(
        self,
        controller: &UiController,
        coordinates: Point,
        precision: Precision,
        source: InputSource,
        button_state: ButtonState,
    ) -> Result<GestureOutcome, InjectionError> {
        match self {
            Tap::Single => send_single_click(controller, coordinates, precision, source, button_state).await,
            Tap::Long => send_long_press(controller, coordinates, precision, source, button_state).await,
            Tap::Double => send_double_click(controller, coordinates, precision, source, button_state).await,
        }
    }
}

impl fmt::Display for Tap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 1.5x a timeout, the safety margin against scheduler jitter.
fn with_margin(timeout: Duration) -> Duration {
    timeout * 3 / 2
}

async fn send_single_click(
    controller: &UiController,
    coordinates: Point,
    precision: Precision,
    source: InputSource,
    button_state: ButtonState,
) -> Result<GestureOutcome, InjectionError> {
    let outcome = send_single_tap(controller, coordinates, precision, source, button_state).await?;
    if outcome == GestureOutcome::Success {
        // Give the main thread time to process the touch.
        controller
            .loop_for_at_least(with_margin(controller.timing().tap_timeout()))
            .await;
    }
    Ok(outcome)
}

async fn send_long_press(
    controller: &UiController,
    coordinates: Point,
    precision: Precision,
    source: InputSource,
    button_state: ButtonState,
) -> Result<GestureOutcome, InjectionError> {
    let res = send_down(controller, coordinates, precision, source, button_state).await?;

    controller
        .loop_for_at_least(with_margin(controller.timing().long_press_timeout()))
        .await;

    finish_with_up(controller, &res.down, GestureOutcome::Success).await
}

async fn send_double_click(
    controller: &UiController,
    coordinates: Point,
    precision: Precision,
    source: InputSource,
    button_state: ButtonState,
) -> Result<GestureOutcome, InjectionError> {
    let first = send_single_tap(controller, coordinates, precision, source, button_state).await?;
    if first == GestureOutcome::Failure {
        return Ok(GestureOutcome::Failure);
    }

    let min_interval = controller.timing().double_tap_min_time();
    if !min_interval.is_zero() {
        controller.loop_for_at_least(min_interval).await;
    }

    let second = send_single_tap(controller, coordinates, precision, source, button_state).await?;
    Ok(first.combine(second))
}

/// Down, timed wait, up. No trailing hold.
async fn send_single_tap(
    controller: &UiController,
    coordinates: Point,
    precision: Precision,
    source: InputSource,
    button_state: ButtonState,
) -> Result<GestureOutcome, InjectionError> {
    let res = send_down(controller, coordinates, precision, source, button_state).await?;
    let outcome = if res.long_press {
        GestureOutcome::Warning
    } else {
        GestureOutcome::Success
    };
    finish_with_up(controller, &res.down, outcome).await
}

/// Sends the up event, cancelling the gesture if it cannot be delivered.
async fn finish_with_up(
    controller: &UiController,
    down: &MotionEvent,
    outcome: GestureOutcome,
) -> Result<GestureOutcome, InjectionError> {
    match send_up(controller, down).await {
        Ok(true) => Ok(outcome),
        Ok(false) => {
            debug!("injection of up event as part of the click failed, sending cancel");
            send_cancel(controller, down).await;
            Ok(GestureOutcome::Failure)
        }
        Err(e) => {
            send_cancel(controller, down).await;
            Err(e)
        }
    }
}
