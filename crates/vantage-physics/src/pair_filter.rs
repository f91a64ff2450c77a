//! Per-pair collision suppression.
//!
//! [`IgnoredPairs`] is passed to the Rapier pipeline as its physics hooks.
//! Colliders only consult it when spawned with the pair-filter hooks active,
//! which every [`Scene`](crate::Scene) spawn and the character body do.

use rapier3d::prelude::*;
use rustc_hash::FxHashSet;

/// Hooks every Vantage collider enables.
pub const FILTER_HOOKS: ActiveHooks =
    ActiveHooks::FILTER_CONTACT_PAIRS.union(ActiveHooks::FILTER_INTERSECTION_PAIR);

/// Unordered set of collider pairs that must not touch.
#[derive(Debug, Clone, Default)]
pub struct IgnoredPairs {
    pairs: FxHashSet<(ColliderHandle, ColliderHandle)>,
}

impl IgnoredPairs {
    /// Suppresses or re-enables contacts between `a` and `b`.
    pub fn set(&mut self, a: ColliderHandle, b: ColliderHandle, ignore: bool) {
        if ignore {
            self.pairs.insert((a, b));
            self.pairs.insert((b, a));
        } else {
            self.pairs.remove(&(a, b));
            self.pairs.remove(&(b, a));
        }
    }

    /// Whether contacts between `a` and `b` are suppressed.
    #[must_use]
    pub fn contains(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        self.pairs.contains(&(a, b))
    }

    /// No pairs are suppressed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl PhysicsHooks for IgnoredPairs {
    fn filter_contact_pair(&self, context: &PairFilterContext) -> Option<SolverFlags> {
        if self.contains(context.collider1, context.collider2) {
            None
        } else {
            Some(SolverFlags::COMPUTE_IMPULSES)
        }
    }

    fn filter_intersection_pair(&self, context: &PairFilterContext) -> bool {
        !self.contains(context.collider1, context.collider2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PhysicsWorld;

    fn two_colliders() -> (PhysicsWorld, ColliderHandle, ColliderHandle) {
        let mut physics = PhysicsWorld::new();
        let a = physics.collider_set.insert(ColliderBuilder::ball(0.5).build());
        let b = physics.collider_set.insert(ColliderBuilder::ball(0.5).build());
        (physics, a, b)
    }

    #[test]
    fn test_pair_is_symmetric() {
        let (_physics, a, b) = two_colliders();
        let mut pairs = IgnoredPairs::default();
        pairs.set(a, b, true);
        assert!(pairs.contains(a, b));
        assert!(pairs.contains(b, a));
    }

    #[test]
    fn test_reenable_removes_both_orders() {
        let (_physics, a, b) = two_colliders();
        let mut pairs = IgnoredPairs::default();
        pairs.set(b, a, true);
        pairs.set(a, b, false);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_ignored_pair_lets_dynamic_body_fall_through() {
        let mut physics = PhysicsWorld::new();
        let floor = physics.collider_set.insert(
            ColliderBuilder::cuboid(5.0, 0.5, 5.0)
                .translation(Vector::new(0.0, -0.5, 0.0))
                .active_hooks(FILTER_HOOKS)
                .build(),
        );
        let body = physics.rigid_body_set.insert(
            RigidBodyBuilder::dynamic()
                .translation(Vector::new(0.0, 1.0, 0.0))
                .build(),
        );
        let ball = physics.collider_set.insert_with_parent(
            ColliderBuilder::ball(0.25).active_hooks(FILTER_HOOKS).build(),
            body,
            &mut physics.rigid_body_set,
        );
        physics.ignored_pairs.set(ball, floor, true);

        for _ in 0..90 {
            physics.step();
        }
        let y = physics.rigid_body_set[body].translation().y;
        assert!(y < -0.5, "ball should pass through the ignored floor, y={y}");
    }
}
