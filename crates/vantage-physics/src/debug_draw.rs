//! Debug line buffer for gizmo overlays.
//!
//! Controllers push segments here each frame; a renderer, if any, drains the
//! buffer. Nothing in this module touches simulation state.

use bevy_ecs::prelude::*;
use glam::Vec3;

/// Pickup ray color.
pub const GIZMO_CYAN: [f32; 4] = [0.0, 1.0, 1.0, 1.0];
/// Hold anchor color.
pub const GIZMO_YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];

/// A single debug line segment with color.
#[derive(Clone, Debug, PartialEq)]
pub struct DebugLine {
    /// Start point in world space.
    pub start: [f32; 3],
    /// End point in world space.
    pub end: [f32; 3],
    /// RGBA color.
    pub color: [f32; 4],
}

/// Buffer of debug line segments to be drawn this frame.
#[derive(Resource, Clone, Debug, Default)]
pub struct DebugLineBuffer {
    /// Line segments accumulated during the current frame.
    pub lines: Vec<DebugLine>,
}

impl DebugLineBuffer {
    /// Push a line segment.
    pub fn push_line(&mut self, start: Vec3, end: Vec3, color: [f32; 4]) {
        self.lines.push(DebugLine {
            start: start.to_array(),
            end: end.to_array(),
            color,
        });
    }

    /// Push a sphere wireframe as 3 great circles (16 segments each).
    pub fn push_wire_sphere(&mut self, center: Vec3, radius: f32, color: [f32; 4]) {
        const SEGMENTS: usize = 16;

        for plane in 0..3 {
            let mut prev = None;
            for i in 0..=SEGMENTS {
                let angle = (i as f32 / SEGMENTS as f32) * std::f32::consts::TAU;
                let (s, c) = angle.sin_cos();
                let local = match plane {
                    0 => Vec3::new(c * radius, s * radius, 0.0),
                    1 => Vec3::new(c * radius, 0.0, s * radius),
                    _ => Vec3::new(0.0, c * radius, s * radius),
                };
                let world = center + local;
                if let Some(p) = prev {
                    self.push_line(p, world, color);
                }
                prev = Some(world);
            }
        }
    }

    /// Number of buffered segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the buffer holds no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Clear all lines (call at start of each frame).
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
