/// Reasons a pickup attempt is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PickupError {
    /// The targeted object is tagged as pickable but has no rigid body.
    #[error("object '{object}' has no rigid body")]
    MissingBody {
        /// Name of the targeted object.
        object: String,
    },
}
