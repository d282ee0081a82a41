//! Frame-rate independent exponential smoothing.
//!
//! Every blended quantity in the drive (speed, heading, steering, camera
//! position, FOV, light intensity) moves toward its target with
//!
//!   `value += (target - value) * (1 - exp(-rate * dt))`
//!
//! so convergence is asymptotic and does not depend on how the host slices time.

use std::f32::consts::{PI, TAU};

use bevy::prelude::*;

/// Fraction of the remaining distance covered in `dt` seconds at `rate`.
///
/// Always in `[0, 1)`; a non-positive `dt` yields 0.
#[inline]
pub fn blend_factor(rate: f32, dt: f32) -> f32 {
    if dt <= 0.0 || !dt.is_finite() {
        return 0.0;
    }
    1.0 - (-rate * dt).exp()
}

#[inline]
pub fn damp(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    current + (target - current) * blend_factor(rate, dt)
}

#[inline]
pub fn damp_vec3(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    current + (target - current) * blend_factor(rate, dt)
}

/// Smooths an angle in radians along the shortest arc.
pub fn damp_angle(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let delta = wrap_angle(target - current);
    wrap_angle(current + delta * blend_factor(rate, dt))
}

/// Wraps an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_factor_is_bounded() {
        assert_eq!(blend_factor(2.5, 0.0), 0.0);
        assert_eq!(blend_factor(2.5, -1.0), 0.0);
        assert_eq!(blend_factor(2.5, f32::NAN), 0.0);
        let f = blend_factor(2.5, 0.1);
        assert!(f > 0.0 && f < 1.0);
        assert!(blend_factor(2.5, 100.0) <= 1.0);
    }

    #[test]
    fn damping_is_frame_rate_independent() {
        let mut coarse = 0.0;
        for _ in 0..10 {
            coarse = damp(coarse, 1.0, 3.0, 0.1);
        }
        let mut fine = 0.0;
        for _ in 0..100 {
            fine = damp(fine, 1.0, 3.0, 0.01);
        }
        assert!((coarse - fine).abs() < 1e-4);
        assert!(coarse < 1.0);
    }

    #[test]
    fn angle_damping_takes_short_way_round() {
        let start = 3.0;
        let target = -3.0;
        let next = damp_angle(start, target, 5.0, 0.05);
        // Crossing PI, so the value grows or wraps negative, never heads back through 0.
        assert!(next > 3.0 || next < -3.0);
    }

    #[test]
    fn wrap_angle_stays_in_range() {
        for raw in [-10.0_f32, -PI, 0.0, PI, 7.0, 100.0] {
            let w = wrap_angle(raw);
            assert!(w > -PI - 1e-5 && w <= PI + 1e-5, "{raw} -> {w}");
        }
    }
}
