//! Swipe strategies.
//!
//! A swipe is built up front as one gesture (a down at the start point,
//! evenly spaced moves along a straight line, an up at the end point) and
//! handed to the injector as a single sequence, so gesture recognizers see
//! continuous motion instead of discrete jumps.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::action::GestureOutcome;
use crate::driver::UiController;
use crate::element::Point;
use crate::event::{ButtonState, InputSource, MotionAction, MotionEvent, Precision};

/// Number of interior move events in a swipe.
pub const SWIPE_EVENT_COUNT: usize = 10;

/// Swipe events carry no input source, like a bare touch injected by the
/// framework.
pub const SWIPE_INPUT_SOURCE: InputSource = InputSource::Unknown;
/// Swipes press no button.
pub const SWIPE_BUTTON_STATE: ButtonState = ButtonState::NONE;

const FAST_SWIPE_DURATION_MS: u64 = 100;
const SLOW_SWIPE_DURATION_MS: u64 = 1500;

/// The kind of swipe to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Swipe {
    /// Completes in 100 ms; reads as a fling.
    Fast,
    /// Completes in 1500 ms; reads as a drag.
    Slow,
    /// Explicit duration and number of interior steps.
    Linear {
        duration_ms: u64,
        steps: usize,
    },
}

impl Swipe {
    pub fn name(self) -> &'static str {
        match self {
            Swipe::Fast => "fast",
            Swipe::Slow => "slow",
            Swipe::Linear { .. } => "linear",
        }
    }

    /// Total duration of the gesture.
    pub fn duration(self) -> Duration {
        match self {
            Swipe::Fast => Duration::from_millis(FAST_SWIPE_DURATION_MS),
            Swipe::Slow => Duration::from_millis(SLOW_SWIPE_DURATION_MS),
            Swipe::Linear { duration_ms, .. } => Duration::from_millis(duration_ms),
        }
    }

    /// Number of interior move events.
    pub fn steps(self) -> usize {
        match self {
            Swipe::Fast | Swipe::Slow => SWIPE_EVENT_COUNT,
            Swipe::Linear { steps, .. } => steps,
        }
    }

    /// Swipes from `start` to `end`. Never errors; any failure is a
    /// [`GestureOutcome::Failure`].
    pub async fn send_swipe(
        self,
        controller: &UiController,
        start: Point,
        end: Point,
        precision: Precision,
    ) -> GestureOutcome {
        send_linear_swipe(
            controller,
            start,
            end,
            precision,
            self.duration(),
            self.steps(),
        )
        .await
    }
}

impl fmt::Display for Swipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Interior points of the straight line from `start` to `end`.
///
/// Point `i` (1-based) lies at `i / (steps + 2)` of the way; the endpoints
/// themselves are not included.
pub fn interpolate(start: Point, end: Point, steps: usize) -> Vec<Point> {
    let divisor = (steps + 2) as f32;
    (1..=steps)
        .map(|i| {
            let fraction = i as f32 / divisor;
            Point::new(
                start.x + (end.x - start.x) * fraction,
                start.y + (end.y - start.y) * fraction,
            )
        })
        .collect()
}

/// Builds the complete swipe gesture starting at `down_time`.
///
/// Moves are spaced `duration / steps` apart (at least 1 ms so timestamps
/// stay strictly increasing); the up follows one interval after the last
/// move.
pub fn build_swipe_events(
    down_time: u64,
    start: Point,
    end: Point,
    precision: Precision,
    duration: Duration,
    steps: usize,
) -> Vec<MotionEvent> {
    let interval = (duration.as_millis() as u64 / steps.max(1) as u64).max(1);

    let down = MotionEvent::down(
        down_time,
        start,
        precision,
        SWIPE_INPUT_SOURCE,
        SWIPE_BUTTON_STATE,
    );

    let mut events = Vec::with_capacity(steps + 2);
    let mut event_time = down_time;
    for point in interpolate(start, end, steps) {
        event_time += interval;
        events.push(down.follow_up(MotionAction::Move, event_time, point));
    }
    event_time += interval;
    let up = down.follow_up(MotionAction::Up, event_time, end);

    events.insert(0, down);
    events.push(up);
    events
}

/// Injects a linear swipe as one atomic sequence.
pub async fn send_linear_swipe(
    controller: &UiController,
    start: Point,
    end: Point,
    precision: Precision,
    duration: Duration,
    steps: usize,
) -> GestureOutcome {
    let events = build_swipe_events(
        controller.uptime_millis(),
        start,
        end,
        precision,
        duration,
        steps,
    );

    match controller.inject_motion_event_sequence(&events).await {
        Ok(true) => {
            debug!(events = events.len(), "swipe injected");
            GestureOutcome::Success
        }
        Ok(false) => {
            warn!(from = %start, to = %end, "swipe sequence was not delivered");
            GestureOutcome::Failure
        }
        Err(e) => {
            warn!(from = %start, to = %end, error = %e, "swipe injection raised an error");
            GestureOutcome::Failure
        }
    }
}
