//! Pick-up controller: one held object at a time, carried at a hold anchor in
//! front of the viewer.
//!
//! The controller is either idle or holding. While holding, the object sits on
//! the hold layer as a kinematic body, ignores the player's collider, and is
//! driven toward the anchor every physics step. Holding the rotate binding
//! spins the object with the pointer and locks out drop and throw until it is
//! released.
//!
//! Host contract: call [`PickupController::update`] once per visual frame and
//! [`PickupController::fixed_update`] once per physics step, before the step.

use bevy_ecs::prelude::*;
use glam::Vec3;
use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};
use tracing::{debug, info, warn};
use vantage_config::{Config, HoldMode, InputConfig, PickupConfig};
use vantage_input::{Binding, InputState};
use vantage_math::{SmoothDamp, Transform, from_to_rotation};
use vantage_physics::{
    DebugLineBuffer, GIZMO_CYAN, GIZMO_YELLOW, Layer, LayerMask, LayerRegistry, ObjectId,
    PhysicsWorld, QueryOptions, Scene, raycast, sphere_cast,
};

use crate::error::PickupError;

/// Name of the anchor node created when none is supplied.
pub const AUTO_ANCHOR_NAME: &str = "HoldPos_Auto";

/// Smallest sphere radius used for clipping prevention.
const MIN_CLIP_RADIUS: f32 = 0.05;
/// Radius used when the held object has no collider.
const FALLBACK_CLIP_RADIUS: f32 = 0.15;
/// Gap left between a pulled-back object and the obstruction.
const CLIP_SKIN: f32 = 0.01;
/// Height above the object the surface-snap ray starts from.
const SNAP_RAY_LIFT: f32 = 0.05;
/// Radius of the hold anchor gizmo.
const ANCHOR_GIZMO_RADIUS: f32 = 0.05;

/// Scene objects the controller works against.
#[derive(Debug, Clone, Copy)]
pub struct PickupDeps {
    /// Object whose position and forward axis aim the pickup ray, usually the camera.
    pub ray_origin: ObjectId,
    /// Where held objects are carried. Created under `ray_origin` when `None`.
    pub hold_anchor: Option<ObjectId>,
    /// The player's own collider, excluded from queries and from contact with held objects.
    pub player_collider: Option<ColliderHandle>,
}

/// Input bindings the controller reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickupBindings {
    /// Pick up when idle, drop when holding.
    pub pick: Binding,
    /// Hold to rotate the held object.
    pub rotate: Binding,
    /// Throw the held object.
    pub throw: Binding,
}

impl From<&InputConfig> for PickupBindings {
    fn from(input: &InputConfig) -> Self {
        Self {
            pick: input.pick,
            rotate: input.rotate,
            throw: input.throw,
        }
    }
}

/// State saved for the object currently held.
#[derive(Debug, Clone)]
pub struct HeldObject {
    /// The held object.
    pub object: ObjectId,
    /// Its rigid body.
    pub body: RigidBodyHandle,
    /// Its collider, if any.
    pub collider: Option<ColliderHandle>,
    /// Layer to restore on release.
    pub original_layer: Option<Layer>,
    /// Parent to restore on release.
    pub original_parent: Option<ObjectId>,
    follow: SmoothDamp,
}

impl HeldObject {
    /// Velocity carried by the follow spring.
    #[must_use]
    pub fn follow_velocity(&self) -> Vec3 {
        self.follow.velocity
    }
}

/// Pick up, carry, rotate, drop, and throw.
#[derive(Resource, Debug)]
pub struct PickupController {
    config: PickupConfig,
    bindings: PickupBindings,
    draw_gizmos: bool,
    ray_origin: ObjectId,
    hold_anchor: ObjectId,
    player_collider: Option<ColliderHandle>,
    hold_layer: Layer,
    held: Option<HeldObject>,
    can_drop: bool,
}

impl PickupController {
    /// Builds the controller, resolving the hold layer and creating the hold
    /// anchor if the caller did not supply one.
    pub fn new(
        config: &Config,
        deps: PickupDeps,
        layers: &LayerRegistry,
        scene: &mut Scene,
    ) -> Self {
        let hold_layer = layers.resolve_or_default(&config.pickup.hold_layer);
        let hold_anchor = deps.hold_anchor.unwrap_or_else(|| {
            let offset = Vec3::from_array(config.pickup.hold_offset);
            debug!(?offset, "creating {AUTO_ANCHOR_NAME}");
            scene.spawn_node(
                AUTO_ANCHOR_NAME,
                Some(deps.ray_origin),
                Transform::from_translation(offset),
            )
        });

        Self {
            config: config.pickup.clone(),
            bindings: PickupBindings::from(&config.input),
            draw_gizmos: config.debug.draw_gizmos,
            ray_origin: deps.ray_origin,
            hold_anchor,
            player_collider: deps.player_collider,
            hold_layer,
            held: None,
            can_drop: true,
        }
    }

    /// The held object, if any.
    pub fn held(&self) -> Option<&HeldObject> {
        self.held.as_ref()
    }

    /// Whether an object is held.
    pub fn is_holding(&self) -> bool {
        self.held.is_some()
    }

    /// `false` while the rotate binding is held.
    pub fn can_drop(&self) -> bool {
        self.can_drop
    }

    /// The anchor held objects are carried to.
    pub fn hold_anchor(&self) -> ObjectId {
        self.hold_anchor
    }

    /// Layer held objects are moved to.
    pub fn hold_layer(&self) -> Layer {
        self.hold_layer
    }

    fn query_options(&self) -> QueryOptions {
        QueryOptions::new(LayerMask(self.config.interactable_mask))
            .with_triggers(self.config.trigger_interaction)
            .excluding(self.player_collider)
    }

    /// Frame update: pick/drop, rotate, throw.
    pub fn update(&mut self, input: &InputState, physics: &mut PhysicsWorld, scene: &mut Scene) {
        if input.just_pressed(self.bindings.pick) {
            if self.held.is_none() {
                if let Err(err) = self.try_pick_up(physics, scene) {
                    warn!("pickup refused: {err}");
                }
            } else if self.can_drop {
                self.drop_object(physics, scene);
            }
        }

        if self.held.is_some() {
            self.rotate_held_object(input, physics, scene);
            if input.just_pressed(self.bindings.throw) && self.can_drop {
                self.throw_object(physics, scene);
            }
        }
    }

    /// Physics-step update: drives the held object toward the anchor.
    pub fn fixed_update(&mut self, dt: f32, physics: &mut PhysicsWorld, scene: &mut Scene) {
        if self.held.is_some() {
            self.follow_hold_position(dt, physics, scene);
        }
    }

    /// Casts the pickup ray and takes the first qualifying object.
    ///
    /// Returns `Ok(true)` when an object was picked up and `Ok(false)` when the
    /// ray missed, hit an untagged object, or something is already held.
    pub fn try_pick_up(
        &mut self,
        physics: &mut PhysicsWorld,
        scene: &mut Scene,
    ) -> Result<bool, PickupError> {
        if self.held.is_some() {
            return Ok(false);
        }
        let Some(origin) = scene.world_transform(physics, self.ray_origin) else {
            return Ok(false);
        };
        let Some(hit) = raycast(
            physics,
            origin.translation,
            origin.forward(),
            self.config.pick_up_range,
            &self.query_options(),
        ) else {
            return Ok(false);
        };
        let Some(object) = scene.object_for_collider(hit.collider) else {
            return Ok(false);
        };
        if !scene.compare_tag(object, &self.config.pickable_tag) {
            return Ok(false);
        }
        let Some(body) = scene.body(object) else {
            let name = scene.get(object).map(|o| o.name.clone()).unwrap_or_default();
            return Err(PickupError::MissingBody { object: name });
        };

        self.pick_up_object(object, body, physics, scene);
        Ok(true)
    }

    fn pick_up_object(
        &mut self,
        object: ObjectId,
        body: RigidBodyHandle,
        physics: &mut PhysicsWorld,
        scene: &mut Scene,
    ) {
        let collider = scene.collider(object);
        let held = HeldObject {
            object,
            body,
            collider,
            original_layer: scene.layer(physics, object),
            original_parent: scene.parent(object),
            follow: SmoothDamp::new(),
        };

        if let (Some(player), Some(col)) = (self.player_collider, collider) {
            physics.set_collision_ignored(col, player, true);
        }
        scene.set_layer(physics, object, self.hold_layer);
        scene.set_kinematic(physics, object, true);

        if self.config.hold_mode == HoldMode::Rigid {
            scene.set_parent(physics, object, Some(self.hold_anchor));
            if let Some(anchor) = scene.world_transform(physics, self.hold_anchor) {
                scene.set_world_position(physics, object, anchor.translation);
            }
        }

        info!(
            object = scene.get(object).map(|o| o.name.as_str()).unwrap_or_default(),
            "picked up"
        );
        self.held = Some(held);
    }

    /// Moves the held object toward the anchor for one physics step.
    pub fn follow_hold_position(&mut self, dt: f32, physics: &mut PhysicsWorld, scene: &mut Scene) {
        let Some(held) = self.held.as_mut() else {
            return;
        };
        let Some(anchor) = scene.world_transform(physics, self.hold_anchor) else {
            return;
        };
        let target = anchor.translation;

        match self.config.hold_mode {
            HoldMode::Rigid => {
                scene.sync_to_parent(physics, held.object);
                scene.set_world_position(physics, held.object, target);
            }
            HoldMode::Follow { smooth: true } => {
                let Some(current) = scene.world_transform(physics, held.object) else {
                    return;
                };
                let next = held.follow.step(
                    current.translation,
                    target,
                    self.config.follow_smooth_time,
                    self.config.max_follow_speed,
                    dt,
                );
                scene.move_kinematic(physics, held.object, next);
            }
            HoldMode::Follow { smooth: false } => {
                scene.move_kinematic(physics, held.object, target);
            }
        }
    }

    /// Spins the held object with the pointer while the rotate binding is held.
    pub fn rotate_held_object(
        &mut self,
        input: &InputState,
        physics: &mut PhysicsWorld,
        scene: &mut Scene,
    ) {
        if !input.held(self.bindings.rotate) {
            self.can_drop = true;
            return;
        }
        self.can_drop = false;

        let Some(held) = self.held.as_ref() else {
            return;
        };
        let Some(mut t) = scene.world_transform(physics, held.object) else {
            return;
        };
        let delta = input.pointer_delta();
        let sens = self.config.rotation_sensitivity;
        let invert = if self.config.invert_y { -1.0 } else { 1.0 };

        t.rotate_world_axis(Vec3::Y, -delta.x * sens);
        t.rotate_world_axis(Vec3::X, -delta.y * sens * invert);
        scene.set_world_rotation(physics, held.object, t.rotation);
    }

    /// Releases the held object in place, optionally pulled out of walls and
    /// settled on the surface below.
    pub fn drop_object(&mut self, physics: &mut PhysicsWorld, scene: &mut Scene) {
        if self.held.is_none() {
            return;
        }
        if self.config.prevent_clipping {
            self.prevent_clipping(physics, scene);
        }
        if self.config.snap_to_surface {
            self.snap_to_surface(physics, scene);
        }
        self.release(Vec3::ZERO, physics, scene);
    }

    /// Releases the held object with an impulse along the view direction.
    pub fn throw_object(&mut self, physics: &mut PhysicsWorld, scene: &mut Scene) {
        if self.held.is_none() {
            return;
        }
        if self.config.prevent_clipping {
            self.prevent_clipping(physics, scene);
        }
        let forward = scene
            .world_transform(physics, self.ray_origin)
            .map(|t| t.forward())
            .unwrap_or(Vec3::NEG_Z);
        self.release(forward * self.config.throw_force, physics, scene);
    }

    fn release(&mut self, impulse: Vec3, physics: &mut PhysicsWorld, scene: &mut Scene) {
        let Some(held) = self.held.take() else {
            return;
        };
        let object = held.object;

        scene.set_parent(physics, object, held.original_parent);
        if let Some(layer) = held.original_layer {
            scene.set_layer(physics, object, layer);
        }
        scene.set_kinematic(physics, object, false);
        if let (Some(player), Some(col)) = (self.player_collider, held.collider) {
            physics.set_collision_ignored(col, player, false);
        }
        if impulse != Vec3::ZERO {
            scene.apply_impulse(physics, object, impulse);
        }

        self.can_drop = true;
        info!(
            object = scene.get(object).map(|o| o.name.as_str()).unwrap_or_default(),
            thrown = impulse != Vec3::ZERO,
            "released"
        );
    }

    /// Pulls the held object back toward the viewer if the path from the ray
    /// origin to the anchor is blocked.
    pub fn prevent_clipping(&self, physics: &mut PhysicsWorld, scene: &mut Scene) {
        let Some(held) = self.held.as_ref() else {
            return;
        };
        let (Some(origin), Some(anchor)) = (
            scene.world_transform(physics, self.ray_origin),
            scene.world_transform(physics, self.hold_anchor),
        ) else {
            return;
        };
        let start = origin.translation;
        let path = anchor.translation - start;
        let Some(dir) = path.try_normalize() else {
            return;
        };

        let radius = scene
            .bounds_half_extents(physics, held.object)
            .map_or(FALLBACK_CLIP_RADIUS, |h| h.min_element().max(MIN_CLIP_RADIUS));
        let opts = self.query_options().excluding(held.collider);

        if let Some(hit) = sphere_cast(physics, start, radius, dir, path.length(), &opts) {
            let safe = hit.point - dir * (radius + CLIP_SKIN);
            debug!(?safe, "held object path blocked, pulling back");
            scene.set_world_position(physics, held.object, safe);
        }
    }

    /// Rests the held object on the surface below it, up axis aligned to the
    /// surface normal.
    pub fn snap_to_surface(&self, physics: &mut PhysicsWorld, scene: &mut Scene) {
        let Some(held) = self.held.as_ref() else {
            return;
        };
        let Some(t) = scene.world_transform(physics, held.object) else {
            return;
        };
        let origin = t.translation + Vec3::Y * SNAP_RAY_LIFT;
        let opts = self.query_options().excluding(held.collider);

        if let Some(hit) = raycast(
            physics,
            origin,
            Vec3::NEG_Y,
            self.config.snap_cast_distance,
            &opts,
        ) {
            let position = hit.point + Vec3::Y * self.config.snap_offset_y;
            let rotation = from_to_rotation(t.up(), hit.normal) * t.rotation;
            scene.set_world_position(physics, held.object, position);
            scene.set_world_rotation(physics, held.object, rotation);
        }
    }

    /// Pushes the pickup ray and the anchor marker into `lines` when gizmos are enabled.
    pub fn debug_draw(&self, physics: &PhysicsWorld, scene: &Scene, lines: &mut DebugLineBuffer) {
        if !self.draw_gizmos {
            return;
        }
        if let Some(origin) = scene.world_transform(physics, self.ray_origin) {
            let end = origin.translation + origin.forward() * self.config.pick_up_range;
            lines.push_line(origin.translation, end, GIZMO_CYAN);
        }
        if let Some(anchor) = scene.world_transform(physics, self.hold_anchor) {
            lines.push_wire_sphere(anchor.translation, ANCHOR_GIZMO_RADIUS, GIZMO_YELLOW);
        }
    }
}
