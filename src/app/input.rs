use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Per-frame mouse input snapshot.
///
/// Deltas accumulate over the window events of one frame and are cleared by
/// [`Input::end_frame`], so a stopped mouse stops the camera.
#[derive(Default, Debug, Clone)]
pub struct Input {
    /// Cursor position in window coordinates.
    pub cursor_position: Vec2,
    /// Cursor movement since the previous frame.
    pub cursor_delta: Vec2,
    /// Scroll amount accumulated this frame.
    pub scroll_delta: Vec2,
    /// Window size in physical pixels.
    pub screen_size: Vec2,
    /// Mouse buttons currently held down.
    pub mouse_buttons: HashSet<MouseButton>,
}

impl Input {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the frame deltas. Called once at the end of every frame.
    pub fn end_frame(&mut self) {
        self.cursor_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    pub fn handle_resize(&mut self, width: u32, height: u32) {
        self.screen_size = Vec2::new(width as f32, height as f32);
    }

    pub fn handle_cursor_move(&mut self, x: f64, y: f64) {
        let new_pos = Vec2::new(x as f32, y as f32);
        // Skip the delta on the very first cursor event.
        if self.cursor_position != Vec2::ZERO {
            self.cursor_delta += new_pos - self.cursor_position;
        }
        self.cursor_position = new_pos;
    }

    pub fn handle_mouse_input(&mut self, state: ElementState, button: MouseButton) {
        match state {
            ElementState::Pressed => {
                self.mouse_buttons.insert(button);
            }
            ElementState::Released => {
                self.mouse_buttons.remove(&button);
            }
        }
    }

    pub fn handle_mouse_wheel(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(x, y) => {
                self.scroll_delta += Vec2::new(x, y);
            }
            MouseScrollDelta::PixelDelta(pos) => {
                // Pixel deltas come in much larger units than lines.
                self.scroll_delta += Vec2::new(pos.x as f32, pos.y as f32) * 0.1;
            }
        }
    }

    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }
}
