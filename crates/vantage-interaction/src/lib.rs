//! Object interaction for a first-person viewer: pick up, carry, rotate,
//! drop, and throw physics objects.

mod error;
pub mod pickup;

pub use error::PickupError;
pub use pickup::{HeldObject, PickupBindings, PickupController, PickupDeps};
