//! Combined per-frame input snapshot read by the controllers.

use glam::Vec2;

use crate::binding::Binding;
use crate::keyboard::KeyboardState;
use crate::mouse::MouseState;

/// Keyboard and mouse for one frame, queried through [`Binding`]s.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Keyboard keys.
    pub keyboard: KeyboardState,
    /// Pointer motion and buttons.
    pub mouse: MouseState,
}

impl InputState {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the bound input is held.
    #[must_use]
    pub fn held(&self, binding: Binding) -> bool {
        match binding {
            Binding::Key(code) => self.keyboard.is_pressed(code),
            Binding::Mouse(button) => self.mouse.is_button_pressed(button.to_winit()),
        }
    }

    /// Whether the bound input went down this frame.
    #[must_use]
    pub fn just_pressed(&self, binding: Binding) -> bool {
        match binding {
            Binding::Key(code) => self.keyboard.just_pressed(code),
            Binding::Mouse(button) => self.mouse.just_button_pressed(button.to_winit()),
        }
    }

    /// Digital axis from two opposing bindings: −1, 0, or +1.
    #[must_use]
    pub fn axis_raw(&self, negative: Binding, positive: Binding) -> f32 {
        let mut value = 0.0;
        if self.held(negative) {
            value -= 1.0;
        }
        if self.held(positive) {
            value += 1.0;
        }
        value
    }

    /// Pointer delta for this frame, +x right, +y down.
    #[must_use]
    pub fn pointer_delta(&self) -> Vec2 {
        self.mouse.delta()
    }

    /// Ends the frame on both devices.
    pub fn clear_transients(&mut self) {
        self.keyboard.clear_transients();
        self.mouse.clear_transients();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::MouseButtonBinding;
    use winit::event::{ElementState, MouseButton};
    use winit::keyboard::KeyCode;

    #[test]
    fn test_axis_raw_opposing_keys_cancel() {
        let mut input = InputState::new();
        let (a, d) = (Binding::Key(KeyCode::KeyA), Binding::Key(KeyCode::KeyD));
        assert_eq!(input.axis_raw(a, d), 0.0);
        input.keyboard.press(KeyCode::KeyD);
        assert_eq!(input.axis_raw(a, d), 1.0);
        input.keyboard.press(KeyCode::KeyA);
        assert_eq!(input.axis_raw(a, d), 0.0);
        input.keyboard.release(KeyCode::KeyD);
        assert_eq!(input.axis_raw(a, d), -1.0);
    }

    #[test]
    fn test_mouse_binding_edges() {
        let mut input = InputState::new();
        let throw = Binding::Mouse(MouseButtonBinding::Left);
        input.mouse.on_button(MouseButton::Left, ElementState::Pressed);
        assert!(input.just_pressed(throw));
        assert!(input.held(throw));
        input.clear_transients();
        assert!(!input.just_pressed(throw));
        assert!(input.held(throw));
    }
}
