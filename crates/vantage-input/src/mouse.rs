//! Frame-coherent mouse state: pointer delta and button edges.

use glam::Vec2;
use winit::event::{ElementState, MouseButton};

#[derive(Debug, Clone, Copy, Default)]
struct ButtonFrame {
    pressed: bool,
    just_pressed: bool,
    just_released: bool,
}

fn button_index(button: MouseButton) -> usize {
    match button {
        MouseButton::Left => 0,
        MouseButton::Right => 1,
        MouseButton::Middle => 2,
        MouseButton::Back => 3,
        MouseButton::Forward | MouseButton::Other(_) => 4,
    }
}

/// Pointer delta and button state for one frame.
///
/// While the cursor is captured, look input comes from raw device motion;
/// otherwise from successive cursor positions.
#[derive(Debug, Clone, Default)]
pub struct MouseState {
    position: Vec2,
    delta: Vec2,
    buttons: [ButtonFrame; 5],
    captured: bool,
}

impl MouseState {
    /// Creates a state with no motion and no buttons held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a `CursorMoved` event.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let pos = Vec2::new(x as f32, y as f32);
        if !self.captured {
            self.delta += pos - self.position;
        }
        self.position = pos;
    }

    /// Process a `DeviceEvent::MouseMotion` raw delta. Ignored unless captured.
    pub fn on_raw_motion(&mut self, dx: f64, dy: f64) {
        if self.captured {
            self.delta += Vec2::new(dx as f32, dy as f32);
        }
    }

    /// Process a `MouseInput` event.
    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        let frame = &mut self.buttons[button_index(button)];
        match state {
            ElementState::Pressed => {
                if !frame.pressed {
                    frame.just_pressed = true;
                }
                frame.pressed = true;
            }
            ElementState::Released => {
                if frame.pressed {
                    frame.just_released = true;
                }
                frame.pressed = false;
            }
        }
    }

    /// Adds a pointer delta directly, as scripted hosts and tests do.
    pub fn add_delta(&mut self, dx: f32, dy: f32) {
        self.delta += Vec2::new(dx, dy);
    }

    /// Switches between raw-motion (captured) and cursor-position deltas.
    pub fn set_captured(&mut self, captured: bool) {
        self.captured = captured;
    }

    /// Whether raw motion is currently the delta source.
    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Pointer movement accumulated since the last clear. +x right, +y down.
    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Whether the button is held.
    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons[button_index(button)].pressed
    }

    /// Whether the button went down this frame.
    #[must_use]
    pub fn just_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons[button_index(button)].just_pressed
    }

    /// Whether the button came up this frame.
    #[must_use]
    pub fn just_button_released(&self, button: MouseButton) -> bool {
        self.buttons[button_index(button)].just_released
    }

    /// Clears delta and button edges. Call at end of frame.
    pub fn clear_transients(&mut self) {
        self.delta = Vec2::ZERO;
        for b in &mut self.buttons {
            b.just_pressed = false;
            b.just_released = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_delta_when_not_captured() {
        let mut m = MouseState::new();
        m.on_cursor_moved(10.0, 5.0);
        m.on_cursor_moved(15.0, 2.0);
        assert_eq!(m.delta(), Vec2::new(15.0, 2.0));
    }

    #[test]
    fn test_raw_motion_only_when_captured() {
        let mut m = MouseState::new();
        m.on_raw_motion(4.0, 4.0);
        assert_eq!(m.delta(), Vec2::ZERO);
        m.set_captured(true);
        m.on_raw_motion(4.0, -2.0);
        assert_eq!(m.delta(), Vec2::new(4.0, -2.0));
    }

    #[test]
    fn test_button_edges() {
        let mut m = MouseState::new();
        m.on_button(MouseButton::Left, ElementState::Pressed);
        assert!(m.just_button_pressed(MouseButton::Left));
        m.clear_transients();
        assert!(m.is_button_pressed(MouseButton::Left));
        assert!(!m.just_button_pressed(MouseButton::Left));
        m.on_button(MouseButton::Left, ElementState::Released);
        assert!(m.just_button_released(MouseButton::Left));
    }

    #[test]
    fn test_clear_resets_delta() {
        let mut m = MouseState::new();
        m.add_delta(3.0, 1.0);
        m.clear_transients();
        assert_eq!(m.delta(), Vec2::ZERO);
    }
}
