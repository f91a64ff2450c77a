//! Camera rig output written by the first-person controller each frame.
//!
//! The rig carries no renderer state. A host reads [`CameraRig::offset`] as the
//! camera's position relative to its root, [`CameraRig::dutch_degrees`] as lens
//! roll, and samples [`NoiseGains`] for the procedural shake.

use std::sync::OnceLock;

use glam::{Quat, Vec3};
use noise::{NoiseFn, Perlin};

/// Seed of the shared shake source.
const SHAKE_SEED: u32 = 0x5eed;

/// Shake in degrees per axis (pitch, yaw, roll) at unit amplitude gain.
const BASE_SHAKE_DEGREES: Vec3 = Vec3::new(0.6, 0.4, 0.3);

/// Shake frequency in Hz at unit frequency gain.
const BASE_SHAKE_HZ: f64 = 1.5;

/// Sample-space offsets that decorrelate the three axes.
const AXIS_OFFSETS: [f64; 3] = [0.17, 31.71, 73.33];

fn shake_source() -> &'static Perlin {
    static SOURCE: OnceLock<Perlin> = OnceLock::new();
    SOURCE.get_or_init(|| Perlin::new(SHAKE_SEED))
}

/// Amplitude and frequency gains of the procedural camera shake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseGains {
    /// Multiplier on the base shake angles.
    pub amplitude: f32,
    /// Multiplier on the base shake frequency.
    pub frequency: f32,
}

impl NoiseGains {
    /// Shake angles in degrees (pitch, yaw, roll) at `time` seconds.
    ///
    /// Each axis is bounded by `amplitude * BASE_SHAKE_DEGREES`.
    #[must_use]
    pub fn sample(&self, time: f32) -> Vec3 {
        if self.amplitude == 0.0 {
            return Vec3::ZERO;
        }
        let perlin = shake_source();
        let t = f64::from(time) * f64::from(self.frequency) * BASE_SHAKE_HZ;
        let axis = |offset: f64| perlin.get([t + offset, offset, 0.5]).clamp(-1.0, 1.0) as f32;
        Vec3::new(
            axis(AXIS_OFFSETS[0]),
            axis(AXIS_OFFSETS[1]),
            axis(AXIS_OFFSETS[2]),
        ) * BASE_SHAKE_DEGREES
            * self.amplitude
    }
}

/// Per-frame camera parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    /// Camera position relative to the camera root: default plus bob, strafe, and peek.
    pub offset: Vec3,
    /// Offset captured at construction.
    pub default_offset: Vec3,
    /// Lens roll in degrees.
    pub dutch_degrees: f32,
    /// Local rotation of the camera root: look pitch composed with effect yaw.
    pub root_rotation: Quat,
    /// Current shake gains.
    pub noise: NoiseGains,
}

impl CameraRig {
    /// A rig at rest around `default_offset` with the given shake gains.
    #[must_use]
    pub fn new(default_offset: Vec3, noise: NoiseGains) -> Self {
        Self {
            offset: default_offset,
            default_offset,
            dutch_degrees: 0.0,
            root_rotation: Quat::IDENTITY,
            noise,
        }
    }

    /// Lens orientation relative to the camera root at `time`: dutch roll plus shake.
    #[must_use]
    pub fn lens_rotation(&self, time: f32) -> Quat {
        let shake = self.noise.sample(time);
        Quat::from_rotation_z((self.dutch_degrees + shake.z).to_radians())
            * Quat::from_rotation_x(shake.x.to_radians())
            * Quat::from_rotation_y(-shake.y.to_radians())
    }
}
