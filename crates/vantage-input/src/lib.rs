//! Frame-coherent keyboard and mouse state plus serialisable key bindings.

pub mod binding;
pub mod input_state;
pub mod keyboard;
pub mod mouse;

pub use binding::{Binding, MouseButtonBinding};
pub use input_state::InputState;
pub use keyboard::{KeyboardState, RawKeyEvent};
pub use mouse::MouseState;
