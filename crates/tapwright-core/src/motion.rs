//! Single-event injection primitives shared by the tap strategies.
//!
//! [`send_down`] is where tap timing is reconciled with the platform's
//! recognizers: after the down event is delivered it keeps the pointer down
//! for about half the tap timeout (long enough to register as a deliberate
//! touch) and then checks whether scheduling delays pushed the press past the
//! long-press timeout.

use std::time::Duration;

use tracing::{debug, error, warn};

use crate::driver::{InjectionError, UiController};
use crate::element::Point;
use crate::event::{ButtonState, InputSource, MotionAction, MotionEvent, Precision};

/// How many down events are tried before the gesture gives up.
pub const MAX_DOWN_ATTEMPTS: u32 = 3;

/// Remaining press time below which the tap wait stops polling.
const TAP_WAIT_SLACK_MS: u64 = 10;

/// A delivered down event.
#[derive(Debug, Clone)]
pub struct DownResult {
    /// The injected down event; later events of the gesture derive from it.
    pub down: MotionEvent,
    /// True when the press already lasted at least the long-press timeout.
    pub long_press: bool,
}

/// Injects a down event and holds it for roughly half the tap timeout.
///
/// The wait sleeps only a quarter of the remaining time per round so that
/// work pumped by the synchronizer cannot make it oversleep by much.
/// Rejected downs are retried with a fresh event up to
/// [`MAX_DOWN_ATTEMPTS`] times. A security denial is returned immediately.
pub async fn send_down(
    controller: &UiController,
    coordinates: Point,
    precision: Precision,
    source: InputSource,
    button_state: ButtonState,
) -> Result<DownResult, InjectionError> {
    let timing = *controller.timing();

    for attempt in 1..=MAX_DOWN_ATTEMPTS {
        let down_time = controller.uptime_millis();
        let down = MotionEvent::down(down_time, coordinates, precision, source, button_state);
        let is_tap_at = down_time + timing.tap_timeout_ms / 2;

        let injected = controller.inject_motion_event(&down).await?;

        loop {
            let delay_to_be_tap = is_tap_at.saturating_sub(controller.uptime_millis());
            if delay_to_be_tap <= TAP_WAIT_SLACK_MS {
                break;
            }
            controller
                .loop_for_at_least(Duration::from_millis(delay_to_be_tap / 4))
                .await;
        }

        let pressed_ms = controller.uptime_millis().saturating_sub(down_time);
        let long_press = pressed_ms >= timing.long_press_timeout_ms;
        if long_press {
            warn!(
                pressed_ms,
                long_press_timeout_ms = timing.long_press_timeout_ms,
                "overslept and turned a tap into a long press"
            );
        }

        if !injected {
            debug!(attempt, "down event rejected");
            continue;
        }

        return Ok(DownResult { down, long_press });
    }

    Err(InjectionError::DownRejected {
        attempts: MAX_DOWN_ATTEMPTS,
    })
}

/// Injects the up event ending the gesture started by `down`, at the down
/// position.
///
/// Returns `Ok(false)` when the injector did not deliver it.
pub async fn send_up(controller: &UiController, down: &MotionEvent) -> Result<bool, InjectionError> {
    send_up_at(controller, down, down.position()).await
}

/// Moves the pointer of the gesture started by `down` to `coordinates`.
///
/// Returns `Ok(false)` when the injector did not deliver the move.
pub async fn send_movement(
    controller: &UiController,
    down: &MotionEvent,
    coordinates: Point,
) -> Result<bool, InjectionError> {
    let movement = down.follow_up(MotionAction::Move, controller.uptime_millis(), coordinates);
    let injected = controller.inject_motion_event(&movement).await?;
    if !injected {
        error!(down = %down, "injection of motion event failed");
    }
    Ok(injected)
}

/// Injects an up event at `coordinates`, ending a gesture that may have
/// moved away from its down position.
pub async fn send_up_at(
    controller: &UiController,
    down: &MotionEvent,
    coordinates: Point,
) -> Result<bool, InjectionError> {
    let up = down.follow_up(MotionAction::Up, controller.uptime_millis(), coordinates);
    let injected = controller.inject_motion_event(&up).await?;
    if !injected {
        error!(down = %down, "injection of up event failed");
    }
    Ok(injected)
}

/// Cancels the gesture started by `down`.
///
/// Best effort: a rejected or failed cancel is logged and otherwise
/// ignored, so the caller's own failure is what gets reported.
pub async fn send_cancel(controller: &UiController, down: &MotionEvent) {
    let cancel = down.follow_up(MotionAction::Cancel, controller.uptime_millis(), down.position());
    match controller.inject_motion_event(&cancel).await {
        Ok(true) => {}
        Ok(false) => error!(down = %down, "injection of cancel event failed"),
        Err(e) => error!(down = %down, error = %e, "injection of cancel event raised an error"),
    }
}
