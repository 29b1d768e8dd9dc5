// Drag/pinch gesture state for the in-camera transform.
//
// Idle, dragging and pinching are tracked with the recorded baselines the
// move handlers work against. All transitions are pure so the event closures
// in `interaction.rs` stay thin.

use crate::model::Transform;

#[derive(Default, Debug, Clone)]
pub struct GestureState {
    pub dragging: bool,
    pub drag_start_x: f64,
    pub drag_start_y: f64,
    pub drag_start_pan_x: f64,
    pub drag_start_pan_y: f64,
    pub pinch: bool,
    pub start_pinch_dist: f64,
    pub start_scale: f64,
}

impl GestureState {
    pub fn begin_drag(&mut self, x: f64, y: f64, tf: &Transform) {
        self.dragging = true;
        self.drag_start_x = x;
        self.drag_start_y = y;
        self.drag_start_pan_x = tf.pan_x;
        self.drag_start_pan_y = tf.pan_y;
    }

    /// Updates the pan by the pointer delta from the drag start. No-op when
    /// not dragging, so stray move events are harmless.
    pub fn drag_to(&self, x: f64, y: f64, tf: &mut Transform) -> bool {
        if !self.dragging {
            return false;
        }
        tf.pan_x = self.drag_start_pan_x + (x - self.drag_start_x);
        tf.pan_y = self.drag_start_pan_y + (y - self.drag_start_y);
        true
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    pub fn begin_pinch(&mut self, dist: f64, tf: &Transform) {
        self.pinch = true;
        self.start_pinch_dist = dist.max(1.0);
        self.start_scale = tf.scale;
    }

    /// Scales relative to the pinch baseline; clamping happens in the
    /// transform. No-op when no pinch is in progress.
    pub fn pinch_to(&self, dist: f64, tf: &mut Transform) -> bool {
        if !self.pinch {
            return false;
        }
        tf.set_scale(self.start_scale * (dist / self.start_pinch_dist));
        true
    }

    pub fn end_pinch(&mut self) {
        self.pinch = false;
        self.start_pinch_dist = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MAX_SCALE, MIN_SCALE};

    #[test]
    fn drag_updates_pan_by_pointer_delta() {
        let mut tf = Transform::default();
        let mut g = GestureState::default();
        g.begin_drag(100.0, 200.0, &tf);
        assert!(g.drag_to(140.0, 190.0, &mut tf));
        assert_eq!(tf.pan_x, 40.0);
        assert_eq!(tf.pan_y, -10.0);
        g.end_drag();
        assert!(!g.drag_to(500.0, 500.0, &mut tf));
        assert_eq!(tf.pan_x, 40.0);
    }

    #[test]
    fn drag_is_relative_to_pan_at_drag_start() {
        let mut tf = Transform { pan_x: 10.0, pan_y: 20.0, scale: 1.0 };
        let mut g = GestureState::default();
        g.begin_drag(0.0, 0.0, &tf);
        g.drag_to(5.0, -5.0, &mut tf);
        assert_eq!(tf.pan_x, 15.0);
        assert_eq!(tf.pan_y, 15.0);
    }

    #[test]
    fn pinch_scales_by_distance_ratio() {
        let mut tf = Transform::default();
        let mut g = GestureState::default();
        g.begin_pinch(100.0, &tf);
        assert!(g.pinch_to(150.0, &mut tf));
        assert!((tf.scale - 1.5).abs() < 1e-12);
        assert!(g.pinch_to(50.0, &mut tf));
        assert!((tf.scale - 0.5).abs() < 1e-12);
    }

    #[test]
    fn pinch_respects_scale_bounds() {
        let mut tf = Transform::default();
        let mut g = GestureState::default();
        g.begin_pinch(10.0, &tf);
        g.pinch_to(10_000.0, &mut tf);
        assert_eq!(tf.scale, MAX_SCALE);
        g.pinch_to(0.1, &mut tf);
        assert_eq!(tf.scale, MIN_SCALE);
    }

    #[test]
    fn pinch_baseline_clears_on_end() {
        let mut tf = Transform::default();
        let mut g = GestureState::default();
        g.begin_pinch(80.0, &tf);
        g.end_pinch();
        assert!(!g.pinch_to(160.0, &mut tf));
        assert_eq!(tf.scale, 1.0);
    }

    // Pan (40, -10), then a -2 deltaY wheel tick.
    #[test]
    fn drag_then_wheel_sequence() {
        let mut tf = Transform::default();
        let mut g = GestureState::default();
        g.begin_drag(0.0, 0.0, &tf);
        g.drag_to(40.0, -10.0, &mut tf);
        g.end_drag();
        tf.zoom_by_wheel(-2.0);
        assert_eq!(tf.pan_x, 40.0);
        assert_eq!(tf.pan_y, -10.0);
        assert!((tf.scale - 1.002).abs() < 1e-12);
    }
}
