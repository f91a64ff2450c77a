//! First-person look, locomotion, and camera feel.

pub mod camera_rig;
pub mod first_person_controller;

pub use camera_rig::{CameraRig, NoiseGains};
pub use first_person_controller::{FirstPersonController, FirstPersonDeps, PlayerBindings};
