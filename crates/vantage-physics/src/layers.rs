//! Named collision layers.
//!
//! A collider's layer is the single membership bit of its Rapier collision
//! groups. Queries filter on those bits through a [`LayerMask`].

use rapier3d::prelude::*;
use tracing::warn;
use vantage_config::LayerConfig;

use crate::PhysicsWorld;

/// Number of usable layers, one per collision-group bit.
pub const MAX_LAYERS: usize = 32;

/// A collision layer index in `0..32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Layer(u8);

impl Layer {
    /// Layer 0, the fallback for anything unresolved.
    pub const DEFAULT: Self = Self(0);

    /// Creates a layer, or `None` past the last usable index.
    #[must_use]
    pub fn new(index: u8) -> Option<Self> {
        (usize::from(index) < MAX_LAYERS).then_some(Self(index))
    }

    /// The layer number.
    #[must_use]
    pub fn index(self) -> u8 {
        self.0
    }

    /// The single-bit group mask for this layer.
    #[must_use]
    pub fn bit(self) -> u32 {
        1 << self.0
    }
}

/// Set of layers a query may hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Every layer.
    pub const ALL: Self = Self(u32::MAX);

    /// Builds a mask from individual layers.
    #[must_use]
    pub fn from_layers(layers: &[Layer]) -> Self {
        Self(layers.iter().fold(0, |acc, l| acc | l.bit()))
    }

    /// Whether `layer` is in the mask.
    #[must_use]
    pub fn contains(self, layer: Layer) -> bool {
        self.0 & layer.bit() != 0
    }

    /// Whether any of the group bits overlap the mask.
    #[must_use]
    pub fn intersects_bits(self, bits: u32) -> bool {
        self.0 & bits != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Layer lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayerError {
    /// No layer carries the requested name.
    #[error("no collision layer named '{name}'")]
    UnknownLayer {
        /// The name that was looked up.
        name: String,
    },
}

/// Name ↔ index table for collision layers.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    names: Vec<String>,
}

impl LayerRegistry {
    /// Builds a registry from names in index order. Names past index 31 are dropped.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().take(MAX_LAYERS).map(Into::into).collect(),
        }
    }

    /// Builds a registry from the configured layer list.
    #[must_use]
    pub fn from_config(config: &LayerConfig) -> Self {
        Self::from_names(config.names.iter().cloned())
    }

    /// Looks a layer up by name.
    pub fn name_to_layer(&self, name: &str) -> Result<Layer, LayerError> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| u8::try_from(i).ok())
            .and_then(Layer::new)
            .ok_or_else(|| LayerError::UnknownLayer {
                name: name.to_string(),
            })
    }

    /// Looks a layer up by name, falling back to [`Layer::DEFAULT`] with a warning.
    pub fn resolve_or_default(&self, name: &str) -> Layer {
        match self.name_to_layer(name) {
            Ok(layer) => layer,
            Err(err) => {
                warn!("{err}; using the default layer");
                Layer::DEFAULT
            }
        }
    }
}

/// Layer of a collider, read from its lowest membership bit.
#[must_use]
pub fn collider_layer(physics: &PhysicsWorld, collider: ColliderHandle) -> Option<Layer> {
    let bits = physics
        .collider_set
        .get(collider)?
        .collision_groups()
        .memberships
        .bits();
    if bits == 0 {
        return None;
    }
    u8::try_from(bits.trailing_zeros()).ok().and_then(Layer::new)
}

/// Moves a collider onto `layer`, keeping its collision filter.
pub fn set_collider_layer(physics: &mut PhysicsWorld, collider: ColliderHandle, layer: Layer) {
    if let Some(c) = physics.collider_set.get_mut(collider) {
        let mut groups = c.collision_groups();
        groups.memberships = Group::from_bits_truncate(layer.bit());
        c.set_collision_groups(groups);
    }
}
