use serde::{Deserialize, Serialize};

use crate::PAN_SLOP_PX;

/// A point or offset in page coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Largest single-axis component, the measure the slop threshold uses.
    #[must_use]
    pub fn max_axis(self) -> f64 {
        self.x.abs().max(self.y.abs())
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub page_x: f64,
    pub page_y: f64,
}

impl TouchPoint {
    #[must_use]
    pub const fn new(page_x: f64, page_y: f64) -> Self {
        Self { page_x, page_y }
    }

    #[must_use]
    pub const fn position(self) -> Vec2 {
        Vec2::new(self.page_x, self.page_y)
    }
}

/// One move event: the active touches plus the cumulative offset since the
/// gesture started.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub touches: Vec<TouchPoint>,
    pub delta: Vec2,
}

impl TouchEvent {
    #[must_use]
    pub fn pan(dx: f64, dy: f64) -> Self {
        Self {
            touches: vec![TouchPoint::new(0.0, 0.0)],
            delta: Vec2::new(dx, dy),
        }
    }

    #[must_use]
    pub fn pinch(a: TouchPoint, b: TouchPoint) -> Self {
        Self {
            touches: vec![a, b],
            delta: Vec2::ZERO,
        }
    }

    /// Distance between the first two touches, if there are two.
    #[must_use]
    pub fn pinch_distance(&self) -> Option<f64> {
        match self.touches.as_slice() {
            [a, b, ..] => Some(a.position().distance_to(b.position())),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    #[default]
    Idle,
    Panning,
    Pinching,
}

/// Two or more touches always pinch, whatever the movement. A single touch
/// only pans once it has moved past the slop.
#[must_use]
pub fn classify(touch_count: usize, movement: f64) -> GestureKind {
    classify_with_slop(touch_count, movement, PAN_SLOP_PX)
}

#[must_use]
pub fn classify_with_slop(touch_count: usize, movement: f64, slop: f64) -> GestureKind {
    match touch_count {
        0 => GestureKind::Idle,
        1 if movement > slop => GestureKind::Panning,
        1 => GestureKind::Idle,
        _ => GestureKind::Pinching,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinch_wins_over_large_movement() {
        assert_eq!(classify(2, 500.0), GestureKind::Pinching);
        assert_eq!(classify(3, 0.0), GestureKind::Pinching);
    }

    #[test]
    fn single_touch_needs_to_clear_slop() {
        assert_eq!(classify(1, 0.0), GestureKind::Idle);
        assert_eq!(classify(1, PAN_SLOP_PX), GestureKind::Idle);
        assert_eq!(classify(1, PAN_SLOP_PX + 0.1), GestureKind::Panning);
    }

    #[test]
    fn no_touches_is_idle() {
        assert_eq!(classify(0, 100.0), GestureKind::Idle);
    }

    #[test]
    fn pinch_distance_uses_first_two_points() {
        let event = TouchEvent {
            touches: vec![
                TouchPoint::new(0.0, 0.0),
                TouchPoint::new(30.0, 40.0),
                TouchPoint::new(1000.0, 1000.0),
            ],
            delta: Vec2::ZERO,
        };
        assert_eq!(event.pinch_distance(), Some(50.0));
        assert_eq!(TouchEvent::pan(3.0, 4.0).pinch_distance(), None);
    }

    #[test]
    fn max_axis_is_chebyshev() {
        assert_eq!(Vec2::new(-7.0, 3.0).max_axis(), 7.0);
    }
}
