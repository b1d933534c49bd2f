//! View geometry types consumed by the gesture engine.
//!
//! The widget tree itself lives outside this crate. Actions only need a
//! coordinate and visibility oracle, which is what [`TargetView`] describes.
//! [`ViewElement`] is a plain serializable implementation of that oracle,
//! useful for fixtures and for hosts that snapshot their hierarchy as JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A point in screen coordinates (pixels, origin at the top-left corner).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
}

impl Point {
    /// Creates a point from its two coordinates.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

/// An axis-aligned rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// The x-coordinate of the left edge.
    pub x: i32,
    /// The y-coordinate of the top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Rect {
    /// Creates a rectangle from its origin and size.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Area in square pixels. Degenerate rectangles have zero area.
    pub fn area(&self) -> i64 {
        if self.width <= 0 || self.height <= 0 {
            return 0;
        }
        i64::from(self.width) * i64::from(self.height)
    }
}

/// The coordinate and visibility oracle an action runs against.
///
/// Implementations must report the geometry as it is *now*: actions query
/// it again on every attempt because a view may move or scale between
/// retries.
pub trait TargetView: Send + Sync {
    /// Human-readable description used in error messages and logs.
    fn description(&self) -> String;

    /// The view's bounds in screen coordinates.
    fn frame(&self) -> Rect;

    /// The portion of the view that is actually visible on screen, or
    /// `None` when nothing of it is visible.
    fn visible_rect(&self) -> Option<Rect>;

    /// Whether the view renders web content.
    ///
    /// Web content delays click processing until the double-tap timeout has
    /// passed, so single clicks on such views hold a little longer.
    fn is_web_view(&self) -> bool {
        false
    }
}

/// Percentage (0-100) of the view's area that is visible on screen.
pub fn displayed_percent(view: &dyn TargetView) -> u8 {
    let total = view.frame().area();
    if total == 0 {
        return 0;
    }
    let visible = view.visible_rect().map(|r| r.area()).unwrap_or(0);
    ((visible * 100) / total).clamp(0, 100) as u8
}

/// Returns true if at least `percent` of the view is visible.
pub fn is_displaying_at_least(view: &dyn TargetView, percent: u8) -> bool {
    displayed_percent(view) >= percent
}

/// A serializable snapshot of a view's geometry.
///
/// Elements form a tree via `children`; only the element an action is
/// performed on is consulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewElement {
    /// Identifier of the view (resource name or test tag).
    #[serde(default)]
    pub identifier: Option<String>,

    /// The view's class or widget type (e.g. "Button", "EditText").
    #[serde(rename = "type", default)]
    pub element_type: Option<String>,

    /// Bounds in screen coordinates.
    pub frame: Rect,

    /// Visible part of the bounds, `None` when the element is off screen.
    #[serde(default)]
    pub visible: Option<Rect>,

    /// Whether the element hosts web content.
    #[serde(default)]
    pub web_content: bool,

    /// Child elements nested within this element.
    #[serde(default)]
    pub children: Vec<ViewElement>,
}

impl ViewElement {
    /// Creates a fully visible element with the given bounds.
    pub fn with_frame(frame: Rect) -> Self {
        Self {
            identifier: None,
            element_type: None,
            frame,
            visible: Some(frame),
            web_content: false,
            children: Vec::new(),
        }
    }

    /// Sets the identifier.
    pub fn identified(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Overrides the visible portion of the element.
    pub fn clipped_to(mut self, visible: Option<Rect>) -> Self {
        self.visible = visible;
        self
    }
}

impl TargetView for ViewElement {
    fn description(&self) -> String {
        format!(
            "{}{{id={}, x={}, y={}, width={}, height={}}}",
            self.element_type.as_deref().unwrap_or("View"),
            self.identifier.as_deref().unwrap_or("<none>"),
            self.frame.x,
            self.frame.y,
            self.frame.width,
            self.frame.height,
        )
    }

    fn frame(&self) -> Rect {
        self.frame
    }

    fn visible_rect(&self) -> Option<Rect> {
        self.visible
    }

    fn is_web_view(&self) -> bool {
        self.web_content
    }
}
