//! Rigid transforms and rotation helpers.
//!
//! Conventions follow glam's right-handed frame: +Y up, −Z forward, +X right.

use glam::{Quat, Vec3};

/// Position and orientation of a scene object or transform node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Position in the parent's frame (or world space for root objects).
    pub translation: Vec3,
    /// Orientation as a unit quaternion.
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// No translation, no rotation.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Creates a transform from a translation with identity rotation.
    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }

    /// Creates a transform from both parts.
    #[must_use]
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Local −Z expressed in the parent frame.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Local +X expressed in the parent frame.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Local +Y expressed in the parent frame.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Maps a point from this transform's local frame into its parent frame.
    #[must_use]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation + self.rotation * point
    }

    /// Composes `self` (parent) with `child` (expressed in `self`'s frame).
    #[must_use]
    pub fn mul_transform(&self, child: &Transform) -> Transform {
        Transform {
            translation: self.transform_point(child.translation),
            rotation: (self.rotation * child.rotation).normalize(),
        }
    }

    /// Inverse transform, so that `t.inverse().mul_transform(&t)` is identity.
    #[must_use]
    pub fn inverse(&self) -> Transform {
        let inv = self.rotation.inverse();
        Transform {
            translation: inv * -self.translation,
            rotation: inv,
        }
    }

    /// Rotates about a world-space axis through the transform's origin.
    pub fn rotate_world_axis(&mut self, axis: Vec3, degrees: f32) {
        let Some(axis) = axis.try_normalize() else {
            return;
        };
        let delta = Quat::from_axis_angle(axis, degrees.to_radians());
        self.rotation = (delta * self.rotation).normalize();
    }
}

/// Shortest-arc rotation taking direction `from` onto direction `to`.
///
/// Zero-length inputs yield identity. Opposite directions rotate half a turn
/// about an arbitrary axis perpendicular to `from`.
#[must_use]
pub fn from_to_rotation(from: Vec3, to: Vec3) -> Quat {
    let (Some(from), Some(to)) = (from.try_normalize(), to.try_normalize()) else {
        return Quat::IDENTITY;
    };
    Quat::from_rotation_arc(from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 1e-5
    }

    #[test]
    fn test_identity_axes() {
        let t = Transform::IDENTITY;
        assert_eq!(t.forward(), Vec3::NEG_Z);
        assert_eq!(t.right(), Vec3::X);
        assert_eq!(t.up(), Vec3::Y);
    }

    #[test]
    fn test_compose_parent_child() {
        let parent = Transform::new(Vec3::new(1.0, 2.0, 0.0), Quat::from_rotation_y(FRAC_PI_2));
        let child = Transform::from_translation(Vec3::new(0.0, 0.0, -1.0));
        let world = parent.mul_transform(&child);
        // Quarter turn left maps −Z onto −X.
        assert!(approx(world.translation, Vec3::new(0.0, 2.0, 0.0)));
    }

    #[test]
    fn test_inverse_roundtrip() {
        let t = Transform::new(Vec3::new(3.0, -1.0, 2.0), Quat::from_rotation_x(0.7));
        let id = t.inverse().mul_transform(&t);
        assert!(approx(id.translation, Vec3::ZERO));
        assert!(id.rotation.abs_diff_eq(Quat::IDENTITY, 1e-4));
    }

    #[test]
    fn test_rotate_world_axis_yaw() {
        let mut t = Transform::IDENTITY;
        t.rotate_world_axis(Vec3::Y, 90.0);
        assert!(approx(t.forward(), Vec3::NEG_X));
    }

    #[test]
    fn test_rotate_world_axis_ignores_zero_axis() {
        let mut t = Transform::IDENTITY;
        t.rotate_world_axis(Vec3::ZERO, 45.0);
        assert_eq!(t.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_from_to_rotation_maps_up_to_normal() {
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();
        let q = from_to_rotation(Vec3::Y, normal);
        assert!(approx(q * Vec3::Y, normal));
    }

    #[test]
    fn test_from_to_rotation_antiparallel() {
        let q = from_to_rotation(Vec3::Y, Vec3::NEG_Y);
        assert!(approx(q * Vec3::Y, Vec3::NEG_Y));
    }

    #[test]
    fn test_from_to_rotation_degenerate_is_identity() {
        assert_eq!(from_to_rotation(Vec3::ZERO, Vec3::Y), Quat::IDENTITY);
    }
}
