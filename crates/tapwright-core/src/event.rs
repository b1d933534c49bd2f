//! Low-level input event records and the factory that builds them.
//!
//! A [`MotionEvent`] is immutable once built. Every event of one gesture
//! carries the `down_time` of the gesture's initial [`MotionAction::Down`],
//! so the recipient can compute the press duration no matter when the later
//! events were actually constructed.
//!
//! # Example
//!
//! ```
//! use tapwright_core::element::Point;
//! use tapwright_core::event::{ButtonState, InputSource, MotionAction, MotionEvent, Precision};
//!
//! let down = MotionEvent::down(
//!     1_000,
//!     Point::new(50.0, 50.0),
//!     Precision::new(16.0, 16.0),
//!     InputSource::Touchscreen,
//!     ButtonState::PRIMARY,
//! );
//! let up = down.follow_up(MotionAction::Up, 1_060, down.position());
//! assert_eq!(up.down_time, 1_000);
//! assert_eq!(up.event_time - up.down_time, 60);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::element::Point;

/// Kind of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionAction {
    /// Pointer went down; starts a gesture.
    Down,
    /// Pointer moved while down.
    Move,
    /// Pointer lifted; ends a gesture.
    Up,
    /// Gesture aborted; ends a gesture without an activation.
    Cancel,
}

impl MotionAction {
    /// Returns true for the actions that end a gesture.
    pub fn is_terminal(self) -> bool {
        matches!(self, MotionAction::Up | MotionAction::Cancel)
    }
}

/// The input device an event claims to originate from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputSource {
    /// Source not specified.
    #[default]
    Unknown,
    /// A touch screen.
    Touchscreen,
    /// A mouse.
    Mouse,
    /// A stylus.
    Stylus,
}

/// The tool performing the contact, derived from the [`InputSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolType {
    Unknown,
    Finger,
    Mouse,
    Stylus,
}

impl From<InputSource> for ToolType {
    fn from(source: InputSource) -> Self {
        match source {
            InputSource::Mouse => ToolType::Mouse,
            InputSource::Stylus => ToolType::Stylus,
            InputSource::Touchscreen => ToolType::Finger,
            InputSource::Unknown => ToolType::Unknown,
        }
    }
}

/// Bit set of pressed buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ButtonState(pub u32);

impl ButtonState {
    pub const NONE: ButtonState = ButtonState(0);
    pub const PRIMARY: ButtonState = ButtonState(1);
    pub const SECONDARY: ButtonState = ButtonState(1 << 1);
    pub const TERTIARY: ButtonState = ButtonState(1 << 2);
}

/// Half-width and half-height of the simulated contact area.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Precision {
    pub x: f32,
    pub y: f32,
}

impl Precision {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

/// One single-pointer event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionEvent {
    /// What happened.
    pub action: MotionAction,
    /// Uptime (ms) of the gesture's initial down event.
    pub down_time: u64,
    /// Uptime (ms) at which this event happened.
    pub event_time: u64,
    /// Horizontal screen position.
    pub x: f32,
    /// Vertical screen position.
    pub y: f32,
    /// Horizontal contact precision.
    pub x_precision: f32,
    /// Vertical contact precision.
    pub y_precision: f32,
    /// Originating device.
    pub source: InputSource,
    /// Contact tool, derived from `source`.
    pub tool_type: ToolType,
    /// Pressed buttons.
    pub button_state: ButtonState,
    /// Pointer id; always 0 for single-pointer gestures.
    pub pointer_id: u32,
}

impl MotionEvent {
    /// Builds an event from scratch.
    pub fn obtain(
        down_time: u64,
        event_time: u64,
        action: MotionAction,
        position: Point,
        precision: Precision,
        source: InputSource,
        button_state: ButtonState,
    ) -> Self {
        Self {
            action,
            down_time,
            event_time,
            x: position.x,
            y: position.y,
            x_precision: precision.x,
            y_precision: precision.y,
            source,
            tool_type: ToolType::from(source),
            button_state,
            pointer_id: 0,
        }
    }

    /// Builds the down event starting a gesture at `down_time`.
    pub fn down(
        down_time: u64,
        position: Point,
        precision: Precision,
        source: InputSource,
        button_state: ButtonState,
    ) -> Self {
        Self::obtain(
            down_time,
            down_time,
            MotionAction::Down,
            position,
            precision,
            source,
            button_state,
        )
    }

    /// Builds a later event of the same gesture.
    ///
    /// Down time, precision, source, tool and button state are copied from
    /// `self`.
    pub fn follow_up(&self, action: MotionAction, event_time: u64, position: Point) -> Self {
        Self {
            action,
            event_time,
            x: position.x,
            y: position.y,
            ..self.clone()
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn precision(&self) -> Precision {
        Precision::new(self.x_precision, self.y_precision)
    }
}

impl fmt::Display for MotionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MotionEvent{{action={:?}, x={}, y={}, downTime={}, eventTime={}}}",
            self.action, self.x, self.y, self.down_time, self.event_time
        )
    }
}

/// Kind of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAction {
    Down,
    Up,
}

/// One key event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub action: KeyAction,
    pub down_time: u64,
    pub event_time: u64,
    pub key_code: u32,
    pub meta_state: u32,
    pub repeat: u32,
}

impl KeyEvent {
    /// Builds a non-repeating key event whose down and event times coincide.
    pub fn new(action: KeyAction, time: u64, key_code: u32, meta_state: u32) -> Self {
        Self {
            action,
            down_time: time,
            event_time: time,
            key_code,
            meta_state,
            repeat: 0,
        }
    }
}

/// Monotonic millisecond uptime source for event timestamps.
///
/// Backed by [`tokio::time::Instant`], so paused test runtimes control it
/// together with every sleep the synchronizer performs.
#[derive(Debug, Clone, Copy)]
pub struct EventClock {
    origin: Instant,
}

impl EventClock {
    /// Starts a clock at the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Milliseconds elapsed since the clock was started.
    pub fn uptime_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

impl Default for EventClock {
    fn default() -> Self {
        Self::new()
    }
}
