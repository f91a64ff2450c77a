//! Physics services for the Vantage controllers: rigid bodies, named collision
//! layers, layer-masked scene queries, a small scene graph, and a kinematic
//! character body.
//!
//! Wraps the Rapier 3D physics engine behind a single [`PhysicsWorld`] resource
//! that owns all simulation state.

use bevy_ecs::prelude::*;
use rapier3d::prelude::*;

pub mod character;
mod convert;
pub mod debug_draw;
pub mod layers;
pub mod pair_filter;
pub mod queries;
pub mod scene;

pub use character::CharacterBody;
pub use convert::{quat_from_rapier, quat_to_rapier, vec_from_rapier, vec_to_rapier};
pub use debug_draw::{DebugLine, DebugLineBuffer, GIZMO_CYAN, GIZMO_YELLOW};
pub use layers::{Layer, LayerError, LayerMask, LayerRegistry};
pub use pair_filter::IgnoredPairs;
pub use queries::{QueryOptions, RayHit, raycast, sphere_cast};
pub use scene::{ObjectDesc, ObjectId, Scene, SceneObject, ShapeDesc};

/// Central physics simulation resource owning all Rapier state.
#[derive(Resource)]
pub struct PhysicsWorld {
    /// World-space gravity vector.
    pub gravity: Vector,
    /// Timestep and solver configuration.
    pub integration_parameters: IntegrationParameters,
    /// The main simulation pipeline.
    pub physics_pipeline: PhysicsPipeline,
    /// Tracks sleeping/awake body islands.
    pub island_manager: IslandManager,
    /// Broad-phase collision detection (also provides query pipeline).
    pub broad_phase: BroadPhaseBvh,
    /// Narrow-phase collision detection (contact manifolds).
    pub narrow_phase: NarrowPhase,
    /// All rigid bodies in the simulation.
    pub rigid_body_set: RigidBodySet,
    /// All colliders in the simulation.
    pub collider_set: ColliderSet,
    /// Impulse-based joints.
    pub impulse_joint_set: ImpulseJointSet,
    /// Multibody joints.
    pub multibody_joint_set: MultibodyJointSet,
    /// Continuous collision detection solver.
    pub ccd_solver: CCDSolver,
    /// Collider pairs whose contacts are suppressed.
    pub ignored_pairs: IgnoredPairs,
}

impl PhysicsWorld {
    /// Fixed physics timestep in seconds.
    pub const FIXED_DT: f32 = 1.0 / 60.0;

    /// Creates a new physics world with gravity `(0, -9.81, 0)` and a `1/60` s step.
    pub fn new() -> Self {
        let integration_parameters = IntegrationParameters {
            dt: Self::FIXED_DT,
            ..Default::default()
        };

        Self {
            gravity: Vector::new(0.0, -9.81, 0.0),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            ignored_pairs: IgnoredPairs::default(),
        }
    }

    /// Advances the simulation by one fixed timestep.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &self.ignored_pairs,
            &(),
        );
    }

    /// Sets the world gravity vector.
    pub fn set_gravity(&mut self, x: f32, y: f32, z: f32) {
        self.gravity = Vector::new(x, y, z);
    }

    /// Suppresses or re-enables contacts between two colliders.
    pub fn set_collision_ignored(&mut self, a: ColliderHandle, b: ColliderHandle, ignore: bool) {
        self.ignored_pairs.set(a, b, ignore);
    }

    /// Returns the current gravity as `(x, y, z)`.
    pub fn gravity(&self) -> (f32, f32, f32) {
        (self.gravity.x, self.gravity.y, self.gravity.z)
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// ECS system that steps the physics simulation once per invocation.
///
/// Intended for the fixed-step schedule at 60 Hz.
pub fn physics_step_system(mut physics: ResMut<PhysicsWorld>) {
    physics.step();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physics_world_initializes() {
        let world = PhysicsWorld::new();
        assert_eq!(world.rigid_body_set.len(), 0);
        assert_eq!(world.collider_set.len(), 0);
        assert!(world.ignored_pairs.is_empty());
    }

    #[test]
    fn test_gravity_set_custom() {
        let mut world = PhysicsWorld::new();
        assert_eq!(world.gravity(), (0.0, -9.81, 0.0));
        world.set_gravity(0.0, -1.62, 0.0);
        assert_eq!(world.gravity(), (0.0, -1.62, 0.0));
    }

    #[test]
    fn test_step_advances_simulation() {
        let mut world = PhysicsWorld::new();
        let body = RigidBodyBuilder::dynamic()
            .translation(Vector::new(0.0, 10.0, 0.0))
            .build();
        let handle = world.rigid_body_set.insert(body);
        let collider = ColliderBuilder::ball(0.5).build();
        world
            .collider_set
            .insert_with_parent(collider, handle, &mut world.rigid_body_set);

        for _ in 0..60 {
            world.step();
        }

        let pos = world.rigid_body_set[handle].translation();
        assert!(pos.y < 10.0, "Body should have fallen: y={}", pos.y);
    }
}
