//! Smoothing filters, rigid transforms, and rotation helpers shared by the Vantage controllers.

mod smoothing;
mod transform;

pub use smoothing::{SmoothDamp, damp, damp_vec3, exp_smoothing};
pub use transform::{Transform, from_to_rotation};
