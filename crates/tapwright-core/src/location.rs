//! Coordinate providers: where on a view a gesture lands.
//!
//! Providers are pure functions of the view's current geometry. They compose
//! through [`translate`], which shifts any provider by a fraction of the
//! view's size; the canned swipes use it to start slightly inside the view
//! so they don't trigger edge gestures such as system navigation.

use std::fmt;
use std::sync::Arc;

use crate::element::{Point, TargetView};

/// Distance of a swipe's start from the view's edge, as a fraction of the
/// view's length.
pub const EDGE_FUZZ_FACTOR: f32 = 0.083;

/// Maps a view's on-screen geometry to a point.
pub trait CoordinatesProvider: fmt::Debug + Send + Sync {
    fn calculate_coordinates(&self, view: &dyn TargetView) -> Point;
}

/// A fixed screen point, independent of the view.
impl CoordinatesProvider for Point {
    fn calculate_coordinates(&self, _view: &dyn TargetView) -> Point {
        *self
    }
}

impl<P: CoordinatesProvider + ?Sized> CoordinatesProvider for Arc<P> {
    fn calculate_coordinates(&self, view: &dyn TargetView) -> Point {
        (**self).calculate_coordinates(view)
    }
}

/// Well-known positions on a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneralLocation {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    /// Center of the visible part of the view.
    VisibleCenter,
}

#[derive(Debug, Clone, Copy)]
enum Position {
    Begin,
    Middle,
    End,
}

impl Position {
    fn resolve(self, view_pos: i32, view_length: i32) -> f32 {
        match self {
            Position::Begin => view_pos as f32,
            // Midpoint between the first and last pixel (at view_length - 1).
            Position::Middle => view_pos as f32 + (view_length - 1) as f32 / 2.0,
            Position::End => (view_pos + view_length - 1) as f32,
        }
    }
}

impl GeneralLocation {
    fn positions(self) -> (Position, Position) {
        use Position::*;
        match self {
            GeneralLocation::TopLeft => (Begin, Begin),
            GeneralLocation::TopCenter => (Begin, Middle),
            GeneralLocation::TopRight => (Begin, End),
            GeneralLocation::CenterLeft => (Middle, Begin),
            GeneralLocation::Center | GeneralLocation::VisibleCenter => (Middle, Middle),
            GeneralLocation::CenterRight => (Middle, End),
            GeneralLocation::BottomLeft => (End, Begin),
            GeneralLocation::BottomCenter => (End, Middle),
            GeneralLocation::BottomRight => (End, End),
        }
    }
}

impl CoordinatesProvider for GeneralLocation {
    fn calculate_coordinates(&self, view: &dyn TargetView) -> Point {
        let (vertical, horizontal) = self.positions();
        let frame = view.frame();
        let (width, height) = match self {
            GeneralLocation::VisibleCenter => view
                .visible_rect()
                .map(|visible| (visible.width, visible.height))
                .unwrap_or((0, 0)),
            _ => (frame.width, frame.height),
        };
        Point::new(
            horizontal.resolve(frame.x, width),
            vertical.resolve(frame.y, height),
        )
    }
}

/// A provider shifted by a fraction of the view's width and height.
#[derive(Debug, Clone)]
pub struct TranslatedCoordinatesProvider {
    base: Arc<dyn CoordinatesProvider>,
    dx: f32,
    dy: f32,
}

impl CoordinatesProvider for TranslatedCoordinatesProvider {
    fn calculate_coordinates(&self, view: &dyn TargetView) -> Point {
        let point = self.base.calculate_coordinates(view);
        let frame = view.frame();
        Point::new(
            point.x + self.dx * frame.width as f32,
            point.y + self.dy * frame.height as f32,
        )
    }
}

/// Shifts `base` by `dx` view widths and `dy` view heights.
pub fn translate(
    base: impl CoordinatesProvider + 'static,
    dx: f32,
    dy: f32,
) -> TranslatedCoordinatesProvider {
    TranslatedCoordinatesProvider {
        base: Arc::new(base),
        dx,
        dy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Rect, ViewElement};

    fn view() -> ViewElement {
        ViewElement::with_frame(Rect::new(100, 200, 101, 51))
    }

    #[test]
    fn corners_use_first_and_last_pixel() {
        let view = view();
        assert_eq!(GeneralLocation::TopLeft.calculate_coordinates(&view), Point::new(100.0, 200.0));
        assert_eq!(GeneralLocation::BottomRight.calculate_coordinates(&view), Point::new(200.0, 250.0));
        assert_eq!(GeneralLocation::TopRight.calculate_coordinates(&view), Point::new(200.0, 200.0));
        assert_eq!(GeneralLocation::BottomLeft.calculate_coordinates(&view), Point::new(100.0, 250.0));
    }

    #[test]
    fn center_is_between_first_and_last_pixel() {
        let view = view();
        assert_eq!(GeneralLocation::Center.calculate_coordinates(&view), Point::new(150.0, 225.0));
        assert_eq!(GeneralLocation::CenterLeft.calculate_coordinates(&view), Point::new(100.0, 225.0));
        assert_eq!(GeneralLocation::BottomCenter.calculate_coordinates(&view), Point::new(150.0, 250.0));
    }

    #[test]
    fn visible_center_uses_visible_size() {
        let view = ViewElement::with_frame(Rect::new(0, 0, 101, 101))
            .clipped_to(Some(Rect::new(0, 0, 101, 21)));
        assert_eq!(GeneralLocation::VisibleCenter.calculate_coordinates(&view), Point::new(50.0, 10.0));
    }

    #[test]
    fn translation_is_relative_to_view_size() {
        let view = ViewElement::with_frame(Rect::new(0, 0, 200, 100));
        let provider = translate(GeneralLocation::CenterLeft, 0.25, -0.5);
        let point = provider.calculate_coordinates(&view);
        assert_eq!(point, Point::new(50.0, 49.5 - 50.0));
    }

    #[test]
    fn fixed_point_ignores_view() {
        let point = Point::new(50.0, 50.0);
        assert_eq!(point.calculate_coordinates(&view()), point);
    }
}
