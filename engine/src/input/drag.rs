//! Pointer Drag Tracker
//!
//! Turns raw button and cursor events into drag deltas plus a "dragging"
//! flag. The first cursor sample after a press only records the anchor
//! point, so pressing never produces a jump. A press counts as a drag only
//! once the pointer has actually moved.

/// Drag state for a single pointer.
#[derive(Debug, Clone, Default)]
pub struct DragState {
    pressed: bool,
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer went down.
    pub fn press(&mut self) {
        self.pressed = true;
    }

    /// Pointer released or the drag was cancelled (focus loss, cursor left).
    pub fn release(&mut self) {
        self.pressed = false;
        self.dragging = false;
        self.last_cursor = None;
    }

    /// Feed a cursor position. Returns the delta since the previous sample
    /// while held; `None` when not dragging or on the first sample.
    pub fn cursor_moved(&mut self, x: f64, y: f64) -> Option<(f32, f32)> {
        if !self.pressed {
            self.last_cursor = None;
            return None;
        }
        let delta = self
            .last_cursor
            .map(|(last_x, last_y)| ((x - last_x) as f32, (y - last_y) as f32));
        self.last_cursor = Some((x, y));
        if delta.is_some() {
            self.dragging = true;
        }
        delta
    }

    /// Held and moved since the press.
    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_delta_without_press() {
        let mut drag = DragState::new();
        assert_eq!(drag.cursor_moved(10.0, 10.0), None);
        assert_eq!(drag.cursor_moved(20.0, 20.0), None);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_first_sample_after_press_is_anchor() {
        let mut drag = DragState::new();
        drag.press();
        assert_eq!(drag.cursor_moved(100.0, 50.0), None);
        assert_eq!(drag.cursor_moved(110.0, 45.0), Some((10.0, -5.0)));
        assert_eq!(drag.cursor_moved(111.0, 47.0), Some((1.0, 2.0)));
    }

    #[test]
    fn test_release_clears_anchor() {
        let mut drag = DragState::new();
        drag.press();
        drag.cursor_moved(0.0, 0.0);
        drag.cursor_moved(5.0, 0.0);
        drag.release();
        assert!(!drag.is_dragging());
        drag.press();
        assert_eq!(drag.cursor_moved(500.0, 500.0), None);
    }

    #[test]
    fn test_press_without_motion_is_not_a_drag() {
        let mut drag = DragState::new();
        drag.press();
        assert!(!drag.is_dragging());
        // Anchor sample only.
        drag.cursor_moved(40.0, 40.0);
        assert!(!drag.is_dragging());
        drag.cursor_moved(41.0, 40.0);
        assert!(drag.is_dragging());
    }
}
