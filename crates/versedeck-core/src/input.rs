//! Pointer and keyboard input vocabulary for the canvas controller.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Double-click detection constants.
const DOUBLE_CLICK_TIME: Duration = Duration::from_millis(500);
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };
}

/// Keys the controller understands. Everything else is passed through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Other(String),
}

impl Key {
    /// Map a DOM-style key name (`"ArrowUp"`, `"a"`, ...) to a key.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            other => Key::Other(other.to_string()),
        }
    }

    /// Unit direction of an arrow key in canvas coordinates (y grows down).
    pub fn arrow_direction(&self) -> Option<Vec2> {
        match self {
            Key::ArrowUp => Some(Vec2::new(0.0, -1.0)),
            Key::ArrowDown => Some(Vec2::new(0.0, 1.0)),
            Key::ArrowLeft => Some(Vec2::new(-1.0, 0.0)),
            Key::ArrowRight => Some(Vec2::new(1.0, 0.0)),
            Key::Other(_) => None,
        }
    }
}

/// Whether a key event was consumed.
///
/// Hosts suppress the platform default action only for `Handled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
}

impl KeyOutcome {
    pub fn is_handled(self) -> bool {
        self == KeyOutcome::Handled
    }
}

/// Detects double-clicks from a stream of pointer presses.
#[derive(Debug, Clone, Default)]
pub struct ClickTracker {
    last_click: Option<(Instant, Point)>,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a press at `position`. Returns true when it completes a
    /// double-click.
    pub fn register(&mut self, position: Point, now: Instant) -> bool {
        if let Some((last_time, last_pos)) = self.last_click {
            let elapsed = now.saturating_duration_since(last_time);
            if elapsed < DOUBLE_CLICK_TIME && last_pos.distance(position) < DOUBLE_CLICK_DISTANCE {
                // A third click starts a new sequence
                self.last_click = None;
                return true;
            }
        }
        self.last_click = Some((now, position));
        false
    }

    pub fn reset(&mut self) {
        self.last_click = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("ArrowLeft"), Key::ArrowLeft);
        assert_eq!(Key::from_name("Enter"), Key::Other("Enter".to_string()));
        assert_eq!(Key::ArrowUp.arrow_direction(), Some(Vec2::new(0.0, -1.0)));
        assert_eq!(Key::from_name("x").arrow_direction(), None);
    }

    #[test]
    fn test_double_click_detection() {
        let mut clicks = ClickTracker::new();
        let start = Instant::now();
        let pos = Point::new(100.0, 100.0);

        assert!(!clicks.register(pos, start));
        assert!(clicks.register(pos, start + Duration::from_millis(200)));
        // Sequence restarts after a double-click
        assert!(!clicks.register(pos, start + Duration::from_millis(300)));
    }

    #[test]
    fn test_double_click_too_far() {
        let mut clicks = ClickTracker::new();
        let start = Instant::now();

        clicks.register(Point::new(100.0, 100.0), start);
        assert!(!clicks.register(Point::new(200.0, 200.0), start + Duration::from_millis(100)));
    }

    #[test]
    fn test_double_click_too_slow() {
        let mut clicks = ClickTracker::new();
        let start = Instant::now();
        let pos = Point::new(10.0, 10.0);

        clicks.register(pos, start);
        assert!(!clicks.register(pos, start + Duration::from_millis(900)));
    }
}
