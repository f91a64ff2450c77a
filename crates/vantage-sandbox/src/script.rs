//! Scripted input: a frame-indexed list of device events fed into the
//! [`InputState`] before each frame.

use bevy_ecs::prelude::*;
use vantage_input::InputState;
use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

/// One device event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    /// Pointer motion in pixels, +y down.
    Pointer(f32, f32),
}

impl InputAction {
    fn apply(self, input: &mut InputState) {
        match self {
            InputAction::KeyDown(key) => input.keyboard.press(key),
            InputAction::KeyUp(key) => input.keyboard.release(key),
            InputAction::MouseDown(button) => input.mouse.on_button(button, ElementState::Pressed),
            InputAction::MouseUp(button) => input.mouse.on_button(button, ElementState::Released),
            InputAction::Pointer(dx, dy) => input.mouse.add_delta(dx, dy),
        }
    }
}

/// Events keyed by the frame they fire on.
#[derive(Resource, Debug, Clone, Default)]
pub struct InputScript {
    events: Vec<(u32, InputAction)>,
}

impl InputScript {
    /// Builds a script from `(frame, action)` pairs in any order.
    pub fn new(mut events: Vec<(u32, InputAction)>) -> Self {
        events.sort_by_key(|(frame, _)| *frame);
        Self { events }
    }

    /// Adds a key press on `frame` and its release `hold` frames later.
    #[must_use]
    pub fn tap(mut self, frame: u32, key: KeyCode, hold: u32) -> Self {
        self.events.push((frame, InputAction::KeyDown(key)));
        self.events.push((frame + hold.max(1), InputAction::KeyUp(key)));
        self.events.sort_by_key(|(f, _)| *f);
        self
    }

    /// Applies every event scheduled for `frame`. Returns how many fired.
    pub fn apply_frame(&self, frame: u32, input: &mut InputState) -> usize {
        let start = self.events.partition_point(|(f, _)| *f < frame);
        let mut fired = 0;
        for (_, action) in self.events[start..].iter().take_while(|(f, _)| *f == frame) {
            action.apply(input);
            fired += 1;
        }
        fired
    }

    /// Last frame with an event, if any.
    pub fn last_frame(&self) -> Option<u32> {
        self.events.last().map(|(f, _)| *f)
    }

    /// The walkthrough the binary plays: look down at the near crate, pick it
    /// up, spin it, throw it, then walk over and carry another one before running off.
    pub fn demo() -> Self {
        use InputAction::*;
        Self::new(vec![
            // Tilt the view about 34 degrees down toward Crate0.
            (10, Pointer(0.0, 283.0)),
            (90, KeyDown(KeyCode::KeyE)),
            (92, KeyUp(KeyCode::KeyE)),
            // Spin the held crate while the view stays put.
            (120, KeyDown(KeyCode::KeyR)),
            (121, Pointer(150.0, 0.0)),
            (122, Pointer(0.0, -80.0)),
            (150, KeyUp(KeyCode::KeyR)),
            // Throw is ignored during rotation; this one lands.
            (170, MouseDown(MouseButton::Left)),
            (172, MouseUp(MouseButton::Left)),
            // Face Crate2 and stop about two metres short of it.
            (200, Pointer(-221.4, 0.0)),
            (230, KeyDown(KeyCode::KeyW)),
            (259, KeyUp(KeyCode::KeyW)),
            (290, KeyDown(KeyCode::KeyE)),
            (292, KeyUp(KeyCode::KeyE)),
            // Carry it back and set it down.
            (310, KeyDown(KeyCode::KeyS)),
            (370, KeyUp(KeyCode::KeyS)),
            (390, KeyDown(KeyCode::KeyE)),
            (392, KeyUp(KeyCode::KeyE)),
            // Turn around and run off, peeking on the way.
            (400, Pointer(1500.0, 0.0)),
            (410, KeyDown(KeyCode::KeyW)),
            (410, KeyDown(KeyCode::ShiftLeft)),
            (420, KeyDown(KeyCode::KeyQ)),
            (450, KeyUp(KeyCode::KeyQ)),
            (470, KeyUp(KeyCode::ShiftLeft)),
            (470, KeyUp(KeyCode::KeyW)),
            (490, KeyDown(KeyCode::Escape)),
            (492, KeyUp(KeyCode::Escape)),
        ])
    }
}
