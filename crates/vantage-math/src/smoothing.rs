//! Frame-rate-independent smoothing.
//!
//! Every camera and look filter in Vantage uses the same exponential form:
//!
//! ```text
//! current = lerp(current, target, 1 - exp(-rate * dt))
//! ```
//!
//! Two frames of `dt / 2` land on the same value as one frame of `dt`, which a
//! fixed-fraction lerp cannot guarantee. [`SmoothDamp`] is the second-order
//! variant used to drag held objects toward their anchor with a speed cap.

use glam::Vec3;

/// Blend factor for one exponential smoothing step.
///
/// Returns `0.0` for non-positive `rate` or `dt`, so the filter holds its value.
#[inline]
#[must_use]
pub fn exp_smoothing(rate: f32, dt: f32) -> f32 {
    if rate <= 0.0 || dt <= 0.0 {
        return 0.0;
    }
    1.0 - (-rate * dt).exp()
}

/// Move `current` toward `target` by one exponential smoothing step.
#[inline]
#[must_use]
pub fn damp(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let s = exp_smoothing(rate, dt);
    current + (target - current) * s
}

/// Vector form of [`damp`].
#[inline]
#[must_use]
pub fn damp_vec3(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    current.lerp(target, exp_smoothing(rate, dt))
}

/// Critically-damped spring toward a moving target with a maximum speed.
///
/// Holds the velocity between steps; call [`reset`](Self::reset) when the
/// tracked object changes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SmoothDamp {
    /// Velocity carried from the previous step, in units per second.
    pub velocity: Vec3,
}

impl SmoothDamp {
    /// Smallest accepted smoothing time, in seconds.
    pub const MIN_SMOOTH_TIME: f32 = 1e-4;

    /// Creates a filter at rest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes the carried velocity.
    pub fn reset(&mut self) {
        self.velocity = Vec3::ZERO;
    }

    /// Advances one step and returns the new position.
    ///
    /// `smooth_time` is roughly the time to reach the target. The change
    /// applied in one call is clamped to `max_speed * smooth_time`, and the
    /// result never passes the target.
    pub fn step(
        &mut self,
        current: Vec3,
        target: Vec3,
        smooth_time: f32,
        max_speed: f32,
        dt: f32,
    ) -> Vec3 {
        if dt <= 0.0 {
            return current;
        }
        let smooth_time = smooth_time.max(Self::MIN_SMOOTH_TIME);
        let omega = 2.0 / smooth_time;
        let x = omega * dt;
        // Polynomial approximation of exp(-x), accurate over typical step sizes.
        let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

        let max_change = max_speed.max(0.0) * smooth_time;
        let change = (current - target).clamp_length_max(max_change);
        let clamped_target = current - change;

        let temp = (self.velocity + omega * change) * dt;
        self.velocity = (self.velocity - omega * temp) * decay;
        let mut output = clamped_target + (change + temp) * decay;

        if (target - current).dot(output - target) > 0.0 {
            output = target;
            self.velocity = (output - target) / dt;
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_exp_smoothing_in_unit_range() {
        for rate in [0.5, 8.0, 12.0, 100.0] {
            let s = exp_smoothing(rate, DT);
            assert!(s > 0.0 && s < 1.0, "rate={rate} s={s}");
        }
    }

    #[test]
    fn test_exp_smoothing_zero_rate_holds() {
        assert_eq!(exp_smoothing(0.0, DT), 0.0);
        assert_eq!(exp_smoothing(10.0, 0.0), 0.0);
        assert_eq!(damp(3.0, 10.0, 0.0, DT), 3.0);
    }

    #[test]
    fn test_damp_idempotent_at_target() {
        let mut v = 4.0_f32;
        for _ in 0..100 {
            v = damp(v, 4.0, 12.0, DT);
        }
        assert_eq!(v, 4.0);

        let mut p = Vec3::new(1.0, 2.0, 3.0);
        for _ in 0..100 {
            p = damp_vec3(p, Vec3::new(1.0, 2.0, 3.0), 10.0, DT);
        }
        assert_eq!(p, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_damp_frame_rate_independent() {
        let one = damp(0.0, 1.0, 10.0, 0.1);
        let mut two = 0.0;
        for _ in 0..2 {
            two = damp(two, 1.0, 10.0, 0.05);
        }
        assert!((one - two).abs() < 1e-5, "one={one} two={two}");
    }

    #[test]
    fn test_damp_converges_monotonically() {
        let mut v = 0.0_f32;
        let mut prev = v;
        for _ in 0..120 {
            v = damp(v, 1.0, 8.0, DT);
            assert!(v >= prev && v <= 1.0);
            prev = v;
        }
        assert!((1.0 - v).abs() < 1e-3);
    }

    #[test]
    fn test_smooth_damp_reaches_target_without_overshoot() {
        let mut filter = SmoothDamp::new();
        let target = Vec3::new(0.0, 0.0, -2.0);
        let mut pos = Vec3::ZERO;
        for _ in 0..240 {
            pos = filter.step(pos, target, 0.06, 10.0, DT);
            assert!(pos.z >= target.z - 1e-5, "overshot: {pos:?}");
        }
        assert!(pos.distance(target) < 1e-3, "pos={pos:?}");
    }

    #[test]
    fn test_smooth_damp_respects_max_speed() {
        let mut filter = SmoothDamp::new();
        let target = Vec3::new(100.0, 0.0, 0.0);
        let mut pos = Vec3::ZERO;
        for _ in 0..60 {
            let next = filter.step(pos, target, 0.06, 10.0, DT);
            let speed = next.distance(pos) / DT;
            assert!(speed <= 10.0 + 1e-3, "speed={speed}");
            pos = next;
        }
    }

    #[test]
    fn test_smooth_damp_reset_clears_velocity() {
        let mut filter = SmoothDamp::new();
        filter.step(Vec3::ZERO, Vec3::X, 0.1, 10.0, DT);
        assert!(filter.velocity.length() > 0.0);
        filter.reset();
        assert_eq!(filter.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_smooth_damp_zero_dt_is_noop() {
        let mut filter = SmoothDamp::new();
        let out = filter.step(Vec3::ONE, Vec3::ZERO, 0.1, 10.0, 0.0);
        assert_eq!(out, Vec3::ONE);
        assert_eq!(filter.velocity, Vec3::ZERO);
    }
}
