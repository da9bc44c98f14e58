// Plane math shared by entities and colliders.

use serde::{Deserialize, Serialize};

pub use glam::Vec2 as Vector2;

/// Moves `current` toward `target` by at most `max_step`.
///
/// Lands exactly on `target` once the remaining distance fits in one step.
pub fn move_towards(current: Vector2, target: Vector2, max_step: f32) -> Vector2 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_step || distance == 0.0 {
        return target;
    }
    current + delta / distance * max_step
}

/// One-dimensional `move_towards`, used for scalar convergence (throttle, alpha fades).
pub fn move_towards_scalar(current: f32, target: f32, max_step: f32) -> f32 {
    move_towards(Vector2::new(current, 0.0), Vector2::new(target, 0.0), max_step).x
}

/// Axis-aligned box: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(center: Vector2, size: Vector2) -> Self {
        Self {
            x: center.x - size.x / 2.0,
            y: center.y - size.y / 2.0,
            w: size.x,
            h: size.y,
        }
    }

    pub fn min_x(&self) -> f32 {
        self.x.min(self.x + self.w)
    }

    pub fn max_x(&self) -> f32 {
        self.x.max(self.x + self.w)
    }

    pub fn min_y(&self) -> f32 {
        self.y.min(self.y + self.h)
    }

    pub fn max_y(&self) -> f32 {
        self.y.max(self.y + self.h)
    }

    pub fn top_left(&self) -> Vector2 {
        Vector2::new(self.min_x(), self.min_y())
    }

    pub fn top_right(&self) -> Vector2 {
        Vector2::new(self.max_x(), self.min_y())
    }

    pub fn bottom_left(&self) -> Vector2 {
        Vector2::new(self.min_x(), self.max_y())
    }

    pub fn bottom_right(&self) -> Vector2 {
        Vector2::new(self.max_x(), self.max_y())
    }

    pub fn center(&self) -> Vector2 {
        Vector2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn size(&self) -> Vector2 {
        Vector2::new(self.w, self.h)
    }

    /// Strict overlap: touching edges do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min_x() < other.max_x()
            && other.min_x() < self.max_x()
            && self.min_y() < other.max_y()
            && other.min_y() < self.max_y()
    }

    /// Overlap test inflated by `epsilon`: true while the gap on both axes stays below it.
    pub fn intersects_within(&self, other: &Rect, epsilon: f32) -> bool {
        let gap_x = (other.min_x() - self.max_x()).max(self.min_x() - other.max_x());
        let gap_y = (other.min_y() - self.max_y()).max(self.min_y() - other.max_y());
        gap_x < epsilon && gap_y < epsilon
    }

    /// True when `other` lies fully inside this rect (shared edges count).
    pub fn contains(&self, other: &Rect) -> bool {
        other.min_x() >= self.min_x()
            && other.max_x() <= self.max_x()
            && other.min_y() >= self.min_y()
            && other.max_y() <= self.max_y()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_target_is_within_step_then_move_towards_lands_on_target() {
        let result = move_towards(Vector2::new(0.0, 0.0), Vector2::new(3.0, 4.0), 5.0);
        assert_eq!(result, Vector2::new(3.0, 4.0));
    }

    #[test]
    fn when_target_is_far_then_move_towards_advances_by_max_step() {
        let result = move_towards(Vector2::new(0.0, 0.0), Vector2::new(30.0, 40.0), 5.0);
        assert!((result - Vector2::new(3.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn when_moving_scalar_down_then_direction_is_respected() {
        assert_eq!(move_towards_scalar(1.0, 0.0, 0.25), 0.75);
        assert_eq!(move_towards_scalar(0.1, 0.0, 0.25), 0.0);
    }

    #[test]
    fn when_rects_only_touch_then_they_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects_within(&b, 0.4));
    }

    #[test]
    fn when_gap_exceeds_epsilon_then_inflated_test_misses() {
        let a = Rect::from_center(Vector2::ZERO, Vector2::splat(16.0));
        let b = Rect::from_center(Vector2::new(20.0, 20.0), Vector2::splat(16.0));
        assert!(!a.intersects_within(&b, 0.4));
    }

    #[test]
    fn when_rect_is_inside_then_contains_is_true() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(outer.contains(&Rect::new(10.0, 10.0, 5.0, 5.0)));
        assert!(outer.contains(&outer));
        assert!(!outer.contains(&Rect::new(95.0, 95.0, 10.0, 10.0)));
    }

    #[test]
    fn when_built_from_center_then_corners_match() {
        let rect = Rect::from_center(Vector2::new(5.0, 5.0), Vector2::new(4.0, 2.0));
        assert_eq!(rect.top_left(), Vector2::new(3.0, 4.0));
        assert_eq!(rect.bottom_right(), Vector2::new(7.0, 6.0));
        assert_eq!(rect.center(), Vector2::new(5.0, 5.0));
    }
}
