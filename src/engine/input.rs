//! Input dispatch for [`FireworksEngine`].

use glam::Vec2;

use super::FireworksEngine;
use crate::input::mouse::ClickResult;
use crate::input::{InputEvent, MouseButton};

impl FireworksEngine {
    /// Process a platform-agnostic input event.
    ///
    /// Dragging with the left button orbits the camera, the wheel zooms, and
    /// a left click without a drag (or [`InputEvent::Trigger`]) spawns the
    /// next firework. Returns `true` when a spawn was triggered.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::CursorMoved { x, y } => {
                if let Some(delta) = self.clicks.cursor_moved(Vec2::new(x, y))
                {
                    self.orbit.rotate(delta);
                }
                false
            }
            InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed,
            } => {
                if pressed {
                    self.clicks.pressed();
                    false
                } else if self.clicks.released() == ClickResult::Click {
                    self.trigger();
                    true
                } else {
                    false
                }
            }
            InputEvent::MouseButton { .. } => false,
            InputEvent::Scroll { delta } => {
                self.orbit.zoom(delta);
                false
            }
            InputEvent::Trigger => {
                self.trigger();
                true
            }
        }
    }
}
