//! Headless sandbox that runs the first-person and pickup controllers
//! against a small physics level, driven by scripted input.

pub mod app;
pub mod level;
pub mod schedule;
pub mod script;

pub use app::{CameraPose, FrameClock, Input, Sandbox};
pub use level::Level;
pub use schedule::{FixedSet, SandboxSchedules, Stage, UpdateSet};
pub use script::{InputAction, InputScript};
