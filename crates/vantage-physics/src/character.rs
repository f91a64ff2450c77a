//! Kinematic character body: capsule collider moved by collide-and-slide.
//!
//! [`CharacterBody`] wraps Rapier's [`KinematicCharacterController`]. Each
//! [`move_by`](CharacterBody::move_by) resolves one displacement against the
//! world and applies it immediately, so several moves in a frame chain from
//! each other. The frame velocity is the sum of those displacements divided
//! by the frame time.

use glam::{Quat, Vec3};
use rapier3d::control::{CharacterAutostep, CharacterLength, KinematicCharacterController};
use rapier3d::prelude::*;

use crate::PhysicsWorld;
use crate::convert::{quat_from_rapier, quat_to_rapier, vec_from_rapier, vec_to_rapier};
use crate::layers::{Layer, set_collider_layer};
use crate::pair_filter::FILTER_HOOKS;

/// Capsule half-height of the cylindrical segment (meters).
pub const CAPSULE_HALF_HEIGHT: f32 = 0.6;
/// Capsule radius (meters).
pub const CAPSULE_RADIUS: f32 = 0.3;

/// Kinematic body + capsule collider + controller.
pub struct CharacterBody {
    /// Handle to the kinematic rigid body in the physics world.
    pub body: RigidBodyHandle,
    /// Handle to the capsule collider attached to the body.
    pub collider: ColliderHandle,
    controller: KinematicCharacterController,
    shape: Capsule,
    grounded: bool,
    frame_displacement: Vec3,
    velocity: Vec3,
}

impl CharacterBody {
    /// Spawns a 1.8 m capsule (2×0.6 half-height + 2×0.3 radius) at `position` on `layer`.
    pub fn spawn(physics: &mut PhysicsWorld, position: Vec3, layer: Layer) -> Self {
        Self::spawn_with_shape(physics, position, layer, CAPSULE_HALF_HEIGHT, CAPSULE_RADIUS)
    }

    /// Spawns a capsule with explicit dimensions.
    pub fn spawn_with_shape(
        physics: &mut PhysicsWorld,
        position: Vec3,
        layer: Layer,
        half_height: f32,
        radius: f32,
    ) -> Self {
        let body = RigidBodyBuilder::kinematic_position_based()
            .translation(vec_to_rapier(position))
            .build();
        let body = physics.rigid_body_set.insert(body);

        let collider = ColliderBuilder::capsule_y(half_height, radius)
            .friction(0.0)
            .active_hooks(FILTER_HOOKS)
            .build();
        let collider =
            physics
                .collider_set
                .insert_with_parent(collider, body, &mut physics.rigid_body_set);
        set_collider_layer(physics, collider, layer);

        let controller = KinematicCharacterController {
            max_slope_climb_angle: std::f32::consts::FRAC_PI_4, // 45°
            min_slope_slide_angle: std::f32::consts::FRAC_PI_4,
            autostep: Some(CharacterAutostep {
                max_height: CharacterLength::Absolute(0.3),
                min_width: CharacterLength::Absolute(0.2),
                include_dynamic_bodies: false,
            }),
            snap_to_ground: Some(CharacterLength::Absolute(0.2)),
            offset: CharacterLength::Absolute(0.01),
            ..Default::default()
        };

        Self {
            body,
            collider,
            controller,
            shape: Capsule::new_y(half_height, radius),
            grounded: false,
            frame_displacement: Vec3::ZERO,
            velocity: Vec3::ZERO,
        }
    }

    /// Starts a new frame of displacement accumulation.
    pub fn begin_frame(&mut self) {
        self.frame_displacement = Vec3::ZERO;
    }

    /// Moves by `delta`, sliding along obstacles, and updates the grounded flag.
    ///
    /// Colliders ignored with this character's collider are passed through.
    /// Returns the displacement actually applied.
    pub fn move_by(&mut self, physics: &mut PhysicsWorld, delta: Vec3, dt: f32) -> Vec3 {
        let Some(body_pos) = physics
            .rigid_body_set
            .get(self.body)
            .map(|b| *b.position())
        else {
            return Vec3::ZERO;
        };

        let corrected = {
            let own = self.collider;
            let ignored = &physics.ignored_pairs;
            let predicate = |handle: ColliderHandle, _: &Collider| !ignored.contains(own, handle);
            let filter = QueryFilter::new()
                .exclude_rigid_body(self.body)
                .exclude_sensors()
                .predicate(&predicate);
            let query_pipeline = physics.broad_phase.as_query_pipeline(
                physics.narrow_phase.query_dispatcher(),
                &physics.rigid_body_set,
                &physics.collider_set,
                filter,
            );
            self.controller.move_shape(
                dt,
                &query_pipeline,
                &self.shape,
                &body_pos,
                vec_to_rapier(delta),
                |_| {},
            )
        };

        let moved = vec_from_rapier(&corrected.translation);
        if let Some(body) = physics.rigid_body_set.get_mut(self.body) {
            let next = vec_from_rapier(&body.translation()) + moved;
            body.set_translation(vec_to_rapier(next), true);
        }
        self.grounded = corrected.grounded;
        self.frame_displacement += moved;
        moved
    }

    /// Closes the frame: velocity becomes the accumulated displacement over `dt`.
    pub fn finish_frame(&mut self, dt: f32) {
        self.velocity = if dt > 0.0 {
            self.frame_displacement / dt
        } else {
            Vec3::ZERO
        };
    }

    /// Whether the last move ended on ground.
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Velocity over the last finished frame.
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Body orientation.
    pub fn heading(&self, physics: &PhysicsWorld) -> Quat {
        physics
            .rigid_body_set
            .get(self.body)
            .map(|b| quat_from_rapier(&b.rotation()))
            .unwrap_or_default()
    }

    /// Turns the body in place. The capsule is symmetric about Y, so only
    /// attached children and movement axes see the change.
    pub fn set_heading(&self, physics: &mut PhysicsWorld, rotation: Quat) {
        if let Some(body) = physics.rigid_body_set.get_mut(self.body) {
            body.set_rotation(quat_to_rapier(rotation), true);
        }
    }

    /// Current body position.
    pub fn position(&self, physics: &PhysicsWorld) -> Vec3 {
        physics
            .rigid_body_set
            .get(self.body)
            .map(|b| vec_from_rapier(&b.translation()))
            .unwrap_or_default()
    }
}
