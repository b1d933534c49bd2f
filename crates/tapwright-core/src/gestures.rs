//! Ready-made actions for the common interactions.
//!
//! ```
//! use tapwright_core::action::ViewAction;
//! use tapwright_core::gestures;
//!
//! assert_eq!(gestures::click().description(), "single click");
//! assert_eq!(gestures::swipe_left().description(), "fast swipe");
//! ```

use std::sync::Arc;

use crate::action::ViewAction;
use crate::click_action::GeneralClickAction;
use crate::event::{ButtonState, InputSource};
use crate::key::{Key, KeyEventAction, TypeTextAction, KEYCODE_BACK, KEYCODE_MENU};
use crate::keyboard::{CloseKeyboardAction, InputMethodService};
use crate::location::{translate, GeneralLocation, EDGE_FUZZ_FACTOR};
use crate::press::Press;
use crate::swipe::Swipe;
use crate::swipe_action::GeneralSwipeAction;
use crate::tap::Tap;

/// Single tap at the center of the visible part of the view.
pub fn click() -> GeneralClickAction {
    click_with(InputSource::Unknown, ButtonState::PRIMARY)
}

/// Single tap that runs `rollback` whenever the tap was read as a
/// long-press, then tries again.
pub fn click_with_rollback(rollback: impl ViewAction + 'static) -> GeneralClickAction {
    GeneralClickAction::new(Tap::Single, GeneralLocation::Center, Press::Finger)
        .with_input(InputSource::Unknown, ButtonState::PRIMARY)
        .with_rollback(rollback)
}

/// Single tap from a specific input device and button, e.g. a mouse
/// right-click.
pub fn click_with(source: InputSource, button_state: ButtonState) -> GeneralClickAction {
    GeneralClickAction::new(Tap::Single, GeneralLocation::VisibleCenter, Press::Finger)
        .with_input(source, button_state)
}

pub fn double_click() -> GeneralClickAction {
    GeneralClickAction::new(Tap::Double, GeneralLocation::Center, Press::Finger)
        .with_input(InputSource::Unknown, ButtonState::PRIMARY)
}

pub fn long_click() -> GeneralClickAction {
    GeneralClickAction::new(Tap::Long, GeneralLocation::Center, Press::Finger)
        .with_input(InputSource::Unknown, ButtonState::PRIMARY)
}

/// Right to left across the view's vertical center.
pub fn swipe_left() -> GeneralSwipeAction {
    GeneralSwipeAction::new(
        Swipe::Fast,
        translate(GeneralLocation::CenterRight, -EDGE_FUZZ_FACTOR, 0.0),
        GeneralLocation::CenterLeft,
        Press::Finger,
    )
}

/// Left to right across the view's vertical center.
pub fn swipe_right() -> GeneralSwipeAction {
    GeneralSwipeAction::new(
        Swipe::Fast,
        translate(GeneralLocation::CenterLeft, EDGE_FUZZ_FACTOR, 0.0),
        GeneralLocation::CenterRight,
        Press::Finger,
    )
}

/// Bottom to top across the view's horizontal center.
pub fn swipe_up() -> GeneralSwipeAction {
    GeneralSwipeAction::new(
        Swipe::Fast,
        translate(GeneralLocation::BottomCenter, 0.0, -EDGE_FUZZ_FACTOR),
        GeneralLocation::TopCenter,
        Press::Finger,
    )
}

/// Top to bottom across the view's horizontal center.
pub fn swipe_down() -> GeneralSwipeAction {
    GeneralSwipeAction::new(
        Swipe::Fast,
        translate(GeneralLocation::TopCenter, 0.0, EDGE_FUZZ_FACTOR),
        GeneralLocation::BottomCenter,
        Press::Finger,
    )
}

pub fn close_soft_keyboard(ime: Arc<dyn InputMethodService>) -> CloseKeyboardAction {
    CloseKeyboardAction::new(ime)
}

pub fn press_key(key: Key) -> KeyEventAction {
    KeyEventAction::new(key)
}

pub fn press_back() -> KeyEventAction {
    press_key(Key::new(KEYCODE_BACK))
}

pub fn press_menu_key() -> KeyEventAction {
    press_key(Key::new(KEYCODE_MENU))
}

/// Taps the view to focus it, then types `text`.
pub fn type_text(text: impl Into<String>) -> TypeTextAction {
    TypeTextAction::new(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Rect, ViewElement};
    use crate::location::CoordinatesProvider;

    #[test]
    fn canned_descriptions() {
        assert_eq!(double_click().description(), "double click");
        assert_eq!(long_click().description(), "long click");
        assert_eq!(press_back().key().key_code, KEYCODE_BACK);
        assert_eq!(press_menu_key().key().key_code, KEYCODE_MENU);
        assert_eq!(type_text("abc").text(), "abc");
    }

    #[test]
    fn swipe_start_is_fuzzed_inside_the_view() {
        let view = ViewElement::with_frame(Rect::new(0, 0, 1000, 100));
        let start = translate(GeneralLocation::CenterRight, -EDGE_FUZZ_FACTOR, 0.0)
            .calculate_coordinates(&view);
        assert!((start.x - 916.0).abs() < 1e-3);
        assert_eq!(start.y, 49.5);
    }
}
