//! Mouse and keyboard state for the orbit camera and scene hotkeys.

use glam::Vec2;
use std::collections::HashSet;

/// Pixels of trackpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f32 = 40.0;

/// Manages input state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed this frame.
    keys_pressed: HashSet<KeyCode>,

    /// Mouse buttons currently held.
    mouse_held: HashSet<MouseButton>,

    /// Last cursor position in window coordinates.
    cursor_position: Option<Vec2>,
    /// Cursor movement delta this frame.
    mouse_delta: Vec2,
    accumulated_delta: Vec2,

    /// Wheel lines scrolled this frame (positive = away from the user).
    scroll_lines: f32,
    accumulated_scroll: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch the events gathered since the last frame. Call once per frame before
    /// reading deltas.
    pub fn begin_frame(&mut self) {
        self.mouse_delta = self.accumulated_delta;
        self.accumulated_delta = Vec2::ZERO;
        self.scroll_lines = self.accumulated_scroll;
        self.accumulated_scroll = 0.0;
    }

    /// Clear one-shot state. Call after the frame has consumed it.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }

    /// Process a mouse button event.
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.mouse_held.insert(button);
            }
            ElementState::Released => {
                self.mouse_held.remove(&button);
            }
        }
    }

    /// Process cursor position update. Motion is measured between successive positions.
    pub fn process_cursor_position(&mut self, position: (f64, f64)) {
        let position = Vec2::new(position.0 as f32, position.1 as f32);
        if let Some(last) = self.cursor_position {
            self.accumulated_delta += position - last;
        }
        self.cursor_position = Some(position);
    }

    /// The cursor left the window; the next position starts a fresh stroke.
    pub fn process_cursor_left(&mut self) {
        self.cursor_position = None;
    }

    /// Process a wheel or trackpad scroll.
    pub fn process_scroll(&mut self, delta: MouseScrollDelta) {
        self.accumulated_scroll += match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
        };
    }

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if a mouse button is held.
    pub fn is_mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    /// Get the mouse movement delta for this frame.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Cursor motion while the left button is held, zero otherwise.
    pub fn drag_delta(&self) -> Vec2 {
        if self.is_mouse_held(MouseButton::Left) {
            self.mouse_delta
        } else {
            Vec2::ZERO
        }
    }

    pub fn scroll_lines(&self) -> f32 {
        self.scroll_lines
    }

    pub fn is_quit_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::Escape)
    }

    /// Space toggles the effect update.
    pub fn is_pause_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::Space)
    }

    /// R regenerates particles and lights.
    pub fn is_reseed_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::KeyR)
    }
}

// Re-export for convenience
pub use winit::event::{ElementState, MouseButton, MouseScrollDelta};
pub use winit::keyboard::KeyCode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_press_is_one_shot_until_release() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyR, ElementState::Pressed);
        input.begin_frame();
        assert!(input.is_reseed_pressed());
        input.end_frame();

        // Auto-repeat while held does not press again.
        input.process_keyboard(KeyCode::KeyR, ElementState::Pressed);
        input.begin_frame();
        assert!(!input.is_reseed_pressed());
        assert!(input.is_key_held(KeyCode::KeyR));
        input.end_frame();

        input.process_keyboard(KeyCode::KeyR, ElementState::Released);
        input.process_keyboard(KeyCode::KeyR, ElementState::Pressed);
        input.begin_frame();
        assert!(input.is_reseed_pressed());
    }

    #[test]
    fn drag_requires_left_button() {
        let mut input = InputState::new();
        input.process_cursor_position((10.0, 10.0));
        input.process_cursor_position((25.0, 5.0));
        input.begin_frame();
        assert_eq!(input.mouse_delta(), Vec2::new(15.0, -5.0));
        assert_eq!(input.drag_delta(), Vec2::ZERO);

        input.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        input.process_cursor_position((30.0, 5.0));
        input.begin_frame();
        assert_eq!(input.drag_delta(), Vec2::new(5.0, 0.0));
    }

    #[test]
    fn cursor_leaving_resets_the_stroke() {
        let mut input = InputState::new();
        input.process_cursor_position((10.0, 10.0));
        input.process_cursor_left();
        input.process_cursor_position((500.0, 300.0));
        input.begin_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn scroll_accumulates_per_frame() {
        let mut input = InputState::new();
        input.process_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        input.process_scroll(MouseScrollDelta::PixelDelta(winit::dpi::PhysicalPosition::new(0.0, 80.0)));
        input.begin_frame();
        assert!((input.scroll_lines() - 3.0).abs() < 1e-6);
        input.begin_frame();
        assert_eq!(input.scroll_lines(), 0.0);
    }
}
