use glam::Vec2;

/// Cursor travel (in pixels) beyond which a press becomes a drag.
const DRAG_THRESHOLD: f32 = 4.0;

/// Result of releasing the primary button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClickResult {
    /// Press and release without a drag: the trigger event.
    Click,
    /// The press turned into an orbit drag.
    Drag,
    /// Release without a matching press.
    NoAction,
}

/// Tracks the primary button so a drag used for orbiting does not also
/// fire a firework.
#[derive(Debug, Default)]
pub(crate) struct ClickTracker {
    cursor: Option<Vec2>,
    pressed_at: Option<Vec2>,
    dragging: bool,
}

impl ClickTracker {
    /// Record a cursor position. Returns the movement since the previous
    /// one while the button is held, for orbiting.
    pub(crate) fn cursor_moved(&mut self, position: Vec2) -> Option<Vec2> {
        let delta = self.cursor.map(|last| position - last);
        self.cursor = Some(position);

        let origin = self.pressed_at?;
        if position.distance(origin) > DRAG_THRESHOLD {
            self.dragging = true;
        }
        delta
    }

    pub(crate) fn pressed(&mut self) {
        self.pressed_at = Some(self.cursor.unwrap_or(Vec2::ZERO));
        self.dragging = false;
    }

    pub(crate) fn released(&mut self) -> ClickResult {
        let was_pressed = self.pressed_at.take().is_some();
        let was_dragging = std::mem::take(&mut self.dragging);
        match (was_pressed, was_dragging) {
            (false, _) => ClickResult::NoAction,
            (true, true) => ClickResult::Drag,
            (true, false) => ClickResult::Click,
        }
    }
}
