//! Conversions between the workspace `glam` types and Rapier's math types.
//!
//! Rapier may link a different glam version than the workspace, so values
//! always cross the boundary component-wise.

use glam::{Quat, Vec3};
use rapier3d::math::Rotation;
use rapier3d::prelude::Vector;

/// Workspace vector to Rapier vector.
#[inline]
#[must_use]
pub fn vec_to_rapier(v: Vec3) -> Vector {
    Vector::new(v.x, v.y, v.z)
}

/// Rapier vector to workspace vector.
#[inline]
#[must_use]
pub fn vec_from_rapier(v: &Vector) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// Workspace quaternion to Rapier rotation.
#[inline]
#[must_use]
pub fn quat_to_rapier(q: Quat) -> Rotation {
    let [x, y, z, w] = q.normalize().to_array();
    Rotation::from_xyzw(x, y, z, w)
}

/// Rapier rotation to workspace quaternion.
#[inline]
#[must_use]
pub fn quat_from_rapier(r: &Rotation) -> Quat {
    let [x, y, z, w] = r.to_array();
    Quat::from_xyzw(x, y, z, w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_roundtrip() {
        let v = Vec3::new(1.5, -2.0, 3.25);
        assert_eq!(vec_from_rapier(&vec_to_rapier(v)), v);
    }

    #[test]
    fn test_rotation_roundtrip() {
        let q = Quat::from_rotation_y(0.8) * Quat::from_rotation_x(-0.3);
        let back = quat_from_rapier(&quat_to_rapier(q));
        assert!(back.abs_diff_eq(q, 1e-4));
    }
}
