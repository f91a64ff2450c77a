//! Layer-masked scene queries.

use glam::Vec3;
use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::prelude::*;
use vantage_config::TriggerInteraction;

use crate::PhysicsWorld;
use crate::convert::{vec_from_rapier, vec_to_rapier};
use crate::layers::LayerMask;

/// Filtering applied to a scene query.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Layers the query may hit.
    pub mask: LayerMask,
    /// Whether sensor colliders are hit.
    pub triggers: TriggerInteraction,
    /// Colliders never reported.
    pub exclude: Vec<ColliderHandle>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            mask: LayerMask::ALL,
            triggers: TriggerInteraction::Ignore,
            exclude: Vec::new(),
        }
    }
}

impl QueryOptions {
    /// Query against `mask`, ignoring sensors.
    #[must_use]
    pub fn new(mask: LayerMask) -> Self {
        Self {
            mask,
            ..Default::default()
        }
    }

    /// Sets the sensor policy.
    #[must_use]
    pub fn with_triggers(mut self, triggers: TriggerInteraction) -> Self {
        self.triggers = triggers;
        self
    }

    /// Adds a collider to the exclusion list. `None` is ignored.
    #[must_use]
    pub fn excluding(mut self, collider: impl Into<Option<ColliderHandle>>) -> Self {
        if let Some(c) = collider.into() {
            self.exclude.push(c);
        }
        self
    }

    fn accepts(&self, handle: ColliderHandle, collider: &Collider) -> bool {
        !self.exclude.contains(&handle)
            && self
                .mask
                .intersects_bits(collider.collision_groups().memberships.bits())
    }
}

/// Closest hit reported by a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The collider that was hit.
    pub collider: ColliderHandle,
    /// World-space contact point.
    pub point: Vec3,
    /// Surface normal at the contact.
    pub normal: Vec3,
    /// Distance travelled along the query direction.
    pub distance: f32,
}

/// Casts a ray and returns the nearest accepted hit.
///
/// `dir` need not be normalised. A zero direction or non-positive distance
/// yields `None`.
pub fn raycast(
    physics: &PhysicsWorld,
    origin: Vec3,
    dir: Vec3,
    max_distance: f32,
    opts: &QueryOptions,
) -> Option<RayHit> {
    let dir = dir.try_normalize()?;
    if !valid_distance(max_distance) {
        return None;
    }
    with_query_pipeline(physics, opts, |pipeline| {
        let ray = Ray::new(vec_to_rapier(origin), vec_to_rapier(dir));
        let (collider, intersection) = pipeline.cast_ray_and_get_normal(&ray, max_distance, true)?;
        let distance = intersection.time_of_impact;
        Some(RayHit {
            collider,
            point: origin + dir * distance,
            normal: vec_from_rapier(&intersection.normal),
            distance,
        })
    })
}

/// Sweeps a ball of `radius` from `origin` along `dir` and returns the first
/// accepted collider it touches.
///
/// `point` is the contact on the hit collider and `distance` is how far the
/// ball's centre travelled. A ball that starts overlapping something reports
/// a hit at distance zero. A non-positive radius falls back to [`raycast`].
pub fn sphere_cast(
    physics: &PhysicsWorld,
    origin: Vec3,
    radius: f32,
    dir: Vec3,
    max_distance: f32,
    opts: &QueryOptions,
) -> Option<RayHit> {
    if radius.is_nan() || radius <= 0.0 {
        return raycast(physics, origin, dir, max_distance, opts);
    }
    let dir = dir.try_normalize()?;
    if !valid_distance(max_distance) {
        return None;
    }

    let ball = Ball::new(radius);
    let start = Pose::from_translation(vec_to_rapier(origin));
    let options = ShapeCastOptions {
        max_time_of_impact: max_distance,
        stop_at_penetration: true,
        compute_impact_geometry_on_penetration: true,
        ..Default::default()
    };
    with_query_pipeline(physics, opts, |pipeline| {
        let (collider, hit) = pipeline.cast_shape(&start, vec_to_rapier(dir), &ball, options)?;
        Some(RayHit {
            collider,
            point: vec_from_rapier(&hit.witness1),
            normal: vec_from_rapier(&hit.normal1),
            distance: hit.time_of_impact,
        })
    })
}

fn valid_distance(max_distance: f32) -> bool {
    !max_distance.is_nan() && max_distance > 0.0
}

/// Runs `query` against the broad phase with `opts` applied as the filter.
fn with_query_pipeline<R>(
    physics: &PhysicsWorld,
    opts: &QueryOptions,
    query: impl FnOnce(&QueryPipeline<'_>) -> R,
) -> R {
    let predicate = |handle: ColliderHandle, collider: &Collider| opts.accepts(handle, collider);
    let mut filter = QueryFilter::new().predicate(&predicate);
    if opts.triggers == TriggerInteraction::Ignore {
        filter = filter.exclude_sensors();
    }
    let pipeline = physics.broad_phase.as_query_pipeline(
        physics.narrow_phase.query_dispatcher(),
        &physics.rigid_body_set,
        &physics.collider_set,
        filter,
    );
    query(&pipeline)
}
