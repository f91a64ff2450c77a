//! Frame-coherent keyboard state tracker.
//!
//! Keys are tracked by [`KeyCode`] (the physical scan code) so that movement
//! and peek bindings stay on the same keys regardless of keyboard layout.

use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Platform-independent key event, used by hosts without a winit window and by tests.
#[derive(Debug, Clone, Copy)]
pub struct RawKeyEvent {
    /// The physical key involved.
    pub key: KeyCode,
    /// Whether the key was pressed or released.
    pub state: ElementState,
    /// Whether this is an OS auto-repeat.
    pub repeat: bool,
}

impl RawKeyEvent {
    /// A non-repeat press of `key`.
    #[must_use]
    pub fn press(key: KeyCode) -> Self {
        Self {
            key,
            state: ElementState::Pressed,
            repeat: false,
        }
    }

    /// A release of `key`.
    #[must_use]
    pub fn release(key: KeyCode) -> Self {
        Self {
            key,
            state: ElementState::Released,
            repeat: false,
        }
    }
}

/// Held / just-pressed / just-released sets for one frame.
///
/// Feed events during the frame, query during update, then call
/// [`clear_transients`](Self::clear_transients) once the frame is done.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<KeyCode>,
    pressed_this_frame: HashSet<KeyCode>,
    released_this_frame: HashSet<KeyCode>,
}

impl KeyboardState {
    /// Creates a state with nothing held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes a winit [`KeyEvent`]. Unidentified keys are dropped.
    pub fn process_event(&mut self, event: &KeyEvent) {
        let PhysicalKey::Code(key) = event.physical_key else {
            return;
        };
        self.process_raw(RawKeyEvent {
            key,
            state: event.state,
            repeat: event.repeat,
        });
    }

    /// Processes a [`RawKeyEvent`]. Auto-repeats never count as fresh presses.
    pub fn process_raw(&mut self, event: RawKeyEvent) {
        if event.repeat {
            return;
        }
        match event.state {
            ElementState::Pressed => {
                if self.held.insert(event.key) {
                    self.pressed_this_frame.insert(event.key);
                }
            }
            ElementState::Released => {
                if self.held.remove(&event.key) {
                    self.released_this_frame.insert(event.key);
                }
            }
        }
    }

    /// Convenience for scripted input: press `key`.
    pub fn press(&mut self, key: KeyCode) {
        self.process_raw(RawKeyEvent::press(key));
    }

    /// Convenience for scripted input: release `key`.
    pub fn release(&mut self, key: KeyCode) {
        self.process_raw(RawKeyEvent::release(key));
    }

    /// `true` while the key is down.
    #[must_use]
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// `true` only in the frame the key went down.
    #[must_use]
    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.pressed_this_frame.contains(&key)
    }

    /// `true` only in the frame the key came up.
    #[must_use]
    pub fn just_released(&self, key: KeyCode) -> bool {
        self.released_this_frame.contains(&key)
    }

    /// Forgets the per-frame edges. Held keys stay held.
    pub fn clear_transients(&mut self) {
        self.pressed_this_frame.clear();
        self.released_this_frame.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_no_keys_pressed() {
        let kb = KeyboardState::new();
        for key in [KeyCode::KeyW, KeyCode::KeyE, KeyCode::ShiftLeft] {
            assert!(!kb.is_pressed(key));
            assert!(!kb.just_pressed(key));
            assert!(!kb.just_released(key));
        }
    }

    #[test]
    fn test_press_then_release() {
        let mut kb = KeyboardState::new();
        kb.press(KeyCode::KeyE);
        assert!(kb.is_pressed(KeyCode::KeyE));
        assert!(kb.just_pressed(KeyCode::KeyE));
        kb.release(KeyCode::KeyE);
        assert!(!kb.is_pressed(KeyCode::KeyE));
        assert!(kb.just_released(KeyCode::KeyE));
    }

    #[test]
    fn test_just_pressed_lasts_one_frame() {
        let mut kb = KeyboardState::new();
        kb.press(KeyCode::KeyR);
        kb.clear_transients();
        assert!(!kb.just_pressed(KeyCode::KeyR));
        assert!(kb.is_pressed(KeyCode::KeyR));
    }

    #[test]
    fn test_repeat_does_not_retrigger() {
        let mut kb = KeyboardState::new();
        kb.press(KeyCode::KeyE);
        kb.clear_transients();
        kb.process_raw(RawKeyEvent {
            key: KeyCode::KeyE,
            state: ElementState::Pressed,
            repeat: true,
        });
        assert!(!kb.just_pressed(KeyCode::KeyE));
        assert!(kb.is_pressed(KeyCode::KeyE));
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut kb = KeyboardState::new();
        kb.release(KeyCode::KeyQ);
        assert!(!kb.just_released(KeyCode::KeyQ));
    }
}
