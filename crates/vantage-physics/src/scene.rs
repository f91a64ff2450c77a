//! Minimal scene graph over the physics world.
//!
//! A [`Scene`] names objects, tags them, and parents them. Objects are either
//! transform nodes (pure local transforms), rigid bodies with a collider, or
//! body-less static colliders. A body's pose in the [`PhysicsWorld`] is
//! authoritative for its world transform; nodes derive theirs from the parent
//! chain.

use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};
use rapier3d::prelude::*;
use rustc_hash::FxHashMap;
use tracing::debug;
use vantage_math::Transform;

use crate::PhysicsWorld;
use crate::convert::{quat_from_rapier, quat_to_rapier, vec_from_rapier, vec_to_rapier};
use crate::layers::{Layer, collider_layer, set_collider_layer};
use crate::pair_filter::FILTER_HOOKS;

/// Parent chains deeper than this are treated as broken.
const MAX_DEPTH: usize = 64;

/// Index of an object in a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One object in the scene.
#[derive(Debug, Clone)]
pub struct SceneObject {
    /// Display name.
    pub name: String,
    /// Optional gameplay tag.
    pub tag: Option<String>,
    parent: Option<ObjectId>,
    local: Transform,
    body: Option<RigidBodyHandle>,
    collider: Option<ColliderHandle>,
}

impl SceneObject {
    /// Parent object, if attached.
    #[must_use]
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    /// Rigid body handle, if the object is simulated.
    #[must_use]
    pub fn body(&self) -> Option<RigidBodyHandle> {
        self.body
    }

    /// Collider handle, if the object has a shape.
    #[must_use]
    pub fn collider(&self) -> Option<ColliderHandle> {
        self.collider
    }
}

/// Collision shape for spawned objects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeDesc {
    /// Box with the given half extents.
    Cuboid {
        /// Half size along each axis.
        half_extents: Vec3,
    },
    /// Sphere.
    Ball {
        /// Sphere radius.
        radius: f32,
    },
    /// Y-aligned capsule.
    Capsule {
        /// Half length of the cylindrical segment.
        half_height: f32,
        /// Cap radius.
        radius: f32,
    },
}

impl ShapeDesc {
    fn builder(self) -> ColliderBuilder {
        match self {
            Self::Cuboid { half_extents: h } => ColliderBuilder::cuboid(h.x, h.y, h.z),
            Self::Ball { radius } => ColliderBuilder::ball(radius),
            Self::Capsule {
                half_height,
                radius,
            } => ColliderBuilder::capsule_y(half_height, radius),
        }
    }
}

/// Description of an object to spawn.
#[derive(Debug, Clone)]
pub struct ObjectDesc {
    /// Display name.
    pub name: String,
    /// Optional gameplay tag.
    pub tag: Option<String>,
    /// Collision layer.
    pub layer: Layer,
    /// Collision shape.
    pub shape: ShapeDesc,
    /// Initial world transform.
    pub transform: Transform,
    /// Body mass in kg. Ignored for static objects.
    pub mass: f32,
    /// Whether the collider is a sensor.
    pub sensor: bool,
}

impl ObjectDesc {
    /// A 1 kg object on the default layer at the origin.
    pub fn new(name: impl Into<String>, shape: ShapeDesc) -> Self {
        Self {
            name: name.into(),
            tag: None,
            layer: Layer::DEFAULT,
            shape,
            transform: Transform::IDENTITY,
            mass: 1.0,
            sensor: false,
        }
    }

    /// Sets the tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Sets the layer.
    #[must_use]
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    /// Places the object at `translation`.
    #[must_use]
    pub fn at(mut self, translation: Vec3) -> Self {
        self.transform.translation = translation;
        self
    }

    /// Sets the initial rotation.
    #[must_use]
    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    /// Sets the mass.
    #[must_use]
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Marks the collider as a sensor.
    #[must_use]
    pub fn sensor(mut self) -> Self {
        self.sensor = true;
        self
    }
}

/// Scene graph resource.
#[derive(Resource, Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    by_collider: FxHashMap<ColliderHandle, ObjectId>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the scene has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn push(&mut self, object: SceneObject) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        if let Some(c) = object.collider {
            self.by_collider.insert(c, id);
        }
        self.objects.push(object);
        id
    }

    /// Adds a transform node under `parent` with a local transform.
    pub fn spawn_node(
        &mut self,
        name: impl Into<String>,
        parent: Option<ObjectId>,
        local: Transform,
    ) -> ObjectId {
        let parent = parent.filter(|p| self.get(*p).is_some());
        self.push(SceneObject {
            name: name.into(),
            tag: None,
            parent,
            local,
            body: None,
            collider: None,
        })
    }

    /// Spawns a dynamic body with one collider.
    pub fn spawn_dynamic(&mut self, physics: &mut PhysicsWorld, desc: ObjectDesc) -> ObjectId {
        let mut body = RigidBodyBuilder::dynamic()
            .translation(vec_to_rapier(desc.transform.translation))
            .build();
        body.set_rotation(quat_to_rapier(desc.transform.rotation), false);
        let body_handle = physics.rigid_body_set.insert(body);

        let collider = desc
            .shape
            .builder()
            .mass(desc.mass)
            .sensor(desc.sensor)
            .active_hooks(FILTER_HOOKS)
            .build();
        let collider_handle = physics.collider_set.insert_with_parent(
            collider,
            body_handle,
            &mut physics.rigid_body_set,
        );
        set_collider_layer(physics, collider_handle, desc.layer);

        debug!(name = %desc.name, "spawned dynamic object");
        self.push(SceneObject {
            name: desc.name,
            tag: desc.tag,
            parent: None,
            local: desc.transform,
            body: Some(body_handle),
            collider: Some(collider_handle),
        })
    }

    /// Spawns a body-less collider, the usual form of level geometry.
    pub fn spawn_static(&mut self, physics: &mut PhysicsWorld, desc: ObjectDesc) -> ObjectId {
        let mut collider = desc
            .shape
            .builder()
            .translation(vec_to_rapier(desc.transform.translation))
            .sensor(desc.sensor)
            .active_hooks(FILTER_HOOKS)
            .build();
        collider.set_rotation(quat_to_rapier(desc.transform.rotation));
        let collider_handle = physics.collider_set.insert(collider);
        set_collider_layer(physics, collider_handle, desc.layer);

        self.push(SceneObject {
            name: desc.name,
            tag: desc.tag,
            parent: None,
            local: desc.transform,
            body: None,
            collider: Some(collider_handle),
        })
    }

    /// Registers a body created elsewhere, such as a character body.
    pub fn register_body(
        &mut self,
        name: impl Into<String>,
        body: RigidBodyHandle,
        collider: Option<ColliderHandle>,
    ) -> ObjectId {
        self.push(SceneObject {
            name: name.into(),
            tag: None,
            parent: None,
            local: Transform::IDENTITY,
            body: Some(body),
            collider,
        })
    }

    /// Looks up an object.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.index())
    }

    /// Sets or clears an object's tag.
    pub fn set_tag(&mut self, id: ObjectId, tag: Option<String>) {
        if let Some(obj) = self.objects.get_mut(id.index()) {
            obj.tag = tag;
        }
    }

    /// First object with the given name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .position(|o| o.name == name)
            .map(|i| ObjectId(i as u32))
    }

    /// Object owning a collider.
    #[must_use]
    pub fn object_for_collider(&self, collider: ColliderHandle) -> Option<ObjectId> {
        self.by_collider.get(&collider).copied()
    }

    /// Whether the object carries exactly `tag`.
    #[must_use]
    pub fn compare_tag(&self, id: ObjectId, tag: &str) -> bool {
        self.get(id)
            .and_then(|o| o.tag.as_deref())
            .is_some_and(|t| t == tag)
    }

    /// Parent of an object.
    #[must_use]
    pub fn parent(&self, id: ObjectId) -> Option<ObjectId> {
        self.get(id).and_then(SceneObject::parent)
    }

    /// Rigid body of an object.
    #[must_use]
    pub fn body(&self, id: ObjectId) -> Option<RigidBodyHandle> {
        self.get(id).and_then(SceneObject::body)
    }

    /// Collider of an object.
    #[must_use]
    pub fn collider(&self, id: ObjectId) -> Option<ColliderHandle> {
        self.get(id).and_then(SceneObject::collider)
    }

    /// Local transform relative to the parent.
    #[must_use]
    pub fn local(&self, id: ObjectId) -> Option<Transform> {
        self.get(id).map(|o| o.local)
    }

    /// Overwrites the local transform of a transform node.
    ///
    /// Bodies keep their simulated pose; use [`Scene::set_world_position`] for them.
    pub fn set_local(&mut self, id: ObjectId, local: Transform) {
        if let Some(obj) = self.objects.get_mut(id.index())
            && obj.body.is_none()
            && obj.collider.is_none()
        {
            obj.local = local;
        }
    }

    /// Whether `ancestor` appears on `id`'s parent chain.
    fn is_ancestor(&self, ancestor: ObjectId, id: ObjectId) -> bool {
        let mut cur = Some(id);
        for _ in 0..MAX_DEPTH {
            match cur {
                Some(c) if c == ancestor => return true,
                Some(c) => cur = self.parent(c),
                None => return false,
            }
        }
        true
    }

    /// Reparents an object, keeping its world transform.
    ///
    /// Returns `false` (and changes nothing) when the new parent would form a
    /// cycle or the object is a body-less static collider.
    pub fn set_parent(
        &mut self,
        physics: &PhysicsWorld,
        id: ObjectId,
        parent: Option<ObjectId>,
    ) -> bool {
        let Some(obj) = self.get(id) else {
            return false;
        };
        if obj.body.is_none() && obj.collider.is_some() {
            return false;
        }
        if let Some(p) = parent
            && (self.get(p).is_none() || self.is_ancestor(id, p))
        {
            return false;
        }
        let Some(world) = self.world_transform(physics, id) else {
            return false;
        };
        let local = match parent.and_then(|p| self.world_transform(physics, p)) {
            Some(parent_world) => parent_world.inverse().mul_transform(&world),
            None => world,
        };
        let obj = &mut self.objects[id.index()];
        obj.parent = parent;
        obj.local = local;
        true
    }

    /// World transform of an object.
    #[must_use]
    pub fn world_transform(&self, physics: &PhysicsWorld, id: ObjectId) -> Option<Transform> {
        self.world_transform_at(physics, id, 0)
    }

    fn world_transform_at(
        &self,
        physics: &PhysicsWorld,
        id: ObjectId,
        depth: usize,
    ) -> Option<Transform> {
        let obj = self.get(id)?;
        if let Some(b) = obj.body {
            let body = physics.rigid_body_set.get(b)?;
            return Some(Transform::new(
                vec_from_rapier(&body.translation()),
                quat_from_rapier(&body.rotation()),
            ));
        }
        if let Some(c) = obj.collider {
            let collider = physics.collider_set.get(c)?;
            return Some(Transform::new(
                vec_from_rapier(&collider.translation()),
                quat_from_rapier(&collider.rotation()),
            ));
        }
        match obj.parent {
            Some(p) if depth < MAX_DEPTH => Some(
                self.world_transform_at(physics, p, depth + 1)?
                    .mul_transform(&obj.local),
            ),
            _ => Some(obj.local),
        }
    }

    /// Writes a world transform to whatever backs the object.
    fn apply_world(&mut self, physics: &mut PhysicsWorld, id: ObjectId, world: Transform) {
        let parent_world = self
            .parent(id)
            .and_then(|p| self.world_transform(physics, p));
        let Some(obj) = self.objects.get_mut(id.index()) else {
            return;
        };
        obj.local = match parent_world {
            Some(pw) => pw.inverse().mul_transform(&world),
            None => world,
        };
        if let Some(b) = obj.body {
            if let Some(body) = physics.rigid_body_set.get_mut(b) {
                body.set_translation(vec_to_rapier(world.translation), true);
                body.set_rotation(quat_to_rapier(world.rotation), true);
            }
        } else if let Some(c) = obj.collider
            && let Some(collider) = physics.collider_set.get_mut(c)
        {
            collider.set_translation(vec_to_rapier(world.translation));
            collider.set_rotation(quat_to_rapier(world.rotation));
        }
    }

    /// Teleports an object to a world position, keeping its rotation.
    pub fn set_world_position(&mut self, physics: &mut PhysicsWorld, id: ObjectId, position: Vec3) {
        if let Some(mut world) = self.world_transform(physics, id) {
            world.translation = position;
            self.apply_world(physics, id, world);
        }
    }

    /// Sets an object's world rotation, keeping its position.
    pub fn set_world_rotation(&mut self, physics: &mut PhysicsWorld, id: ObjectId, rotation: Quat) {
        if let Some(mut world) = self.world_transform(physics, id) {
            world.rotation = rotation.normalize();
            self.apply_world(physics, id, world);
        }
    }

    /// Moves a parented body to its parent-relative pose.
    pub fn sync_to_parent(&self, physics: &mut PhysicsWorld, id: ObjectId) {
        let Some(obj) = self.get(id) else {
            return;
        };
        let (Some(handle), Some(parent)) = (obj.body, obj.parent) else {
            return;
        };
        let local = obj.local;
        let Some(parent_world) = self.world_transform(physics, parent) else {
            return;
        };
        let world = parent_world.mul_transform(&local);
        if let Some(body) = physics.rigid_body_set.get_mut(handle) {
            body.set_translation(vec_to_rapier(world.translation), true);
            body.set_rotation(quat_to_rapier(world.rotation), true);
        }
    }

    /// Half extents of the object's world-space collider bounds.
    #[must_use]
    pub fn bounds_half_extents(&self, physics: &PhysicsWorld, id: ObjectId) -> Option<Vec3> {
        let collider = physics.collider_set.get(self.collider(id)?)?;
        Some(vec_from_rapier(&collider.compute_aabb().half_extents()))
    }

    /// Switches a body between kinematic and dynamic.
    ///
    /// A body returning to dynamic starts at rest.
    pub fn set_kinematic(&self, physics: &mut PhysicsWorld, id: ObjectId, kinematic: bool) {
        let Some(body) = self
            .body(id)
            .and_then(|b| physics.rigid_body_set.get_mut(b))
        else {
            return;
        };
        if kinematic {
            body.set_body_type(RigidBodyType::KinematicPositionBased, true);
        } else {
            body.set_body_type(RigidBodyType::Dynamic, true);
            body.set_linvel(vec_to_rapier(Vec3::ZERO), true);
            body.set_angvel(vec_to_rapier(Vec3::ZERO), true);
        }
    }

    /// Whether the object's body is kinematic.
    #[must_use]
    pub fn is_kinematic(&self, physics: &PhysicsWorld, id: ObjectId) -> bool {
        self.body(id)
            .and_then(|b| physics.rigid_body_set.get(b))
            .is_some_and(RigidBody::is_kinematic)
    }

    /// Sets the position a kinematic body reaches at the next physics step.
    pub fn move_kinematic(&self, physics: &mut PhysicsWorld, id: ObjectId, position: Vec3) {
        if let Some(body) = self
            .body(id)
            .and_then(|b| physics.rigid_body_set.get_mut(b))
        {
            body.set_next_kinematic_translation(vec_to_rapier(position));
        }
    }

    /// Applies an instantaneous impulse at the centre of mass.
    ///
    /// The velocity change is `impulse / mass` using the collider-derived mass,
    /// so it takes effect even on a body that switched from kinematic this frame.
    pub fn apply_impulse(&self, physics: &mut PhysicsWorld, id: ObjectId, impulse: Vec3) {
        let Some(body) = self
            .body(id)
            .and_then(|b| physics.rigid_body_set.get_mut(b))
        else {
            return;
        };
        let mass = body.mass();
        if mass > 0.0 {
            let linvel = vec_from_rapier(&body.linvel()) + impulse / mass;
            body.set_linvel(vec_to_rapier(linvel), true);
        }
    }

    /// Linear velocity of the object's body.
    #[must_use]
    pub fn linear_velocity(&self, physics: &PhysicsWorld, id: ObjectId) -> Option<Vec3> {
        let body = physics.rigid_body_set.get(self.body(id)?)?;
        Some(vec_from_rapier(&body.linvel()))
    }

    /// Mass of the object's body.
    #[must_use]
    pub fn mass(&self, physics: &PhysicsWorld, id: ObjectId) -> Option<f32> {
        Some(physics.rigid_body_set.get(self.body(id)?)?.mass())
    }

    /// Collision layer of the object's collider.
    #[must_use]
    pub fn layer(&self, physics: &PhysicsWorld, id: ObjectId) -> Option<Layer> {
        collider_layer(physics, self.collider(id)?)
    }

    /// Moves the object's collider to `layer`.
    pub fn set_layer(&self, physics: &mut PhysicsWorld, id: ObjectId, layer: Layer) {
        if let Some(c) = self.collider(id) {
            set_collider_layer(physics, c, layer);
        }
    }
}
