//! Path-following motion model.
//!
//! Speed eases toward its target (max speed while driving, zero otherwise),
//! progress advances by `speed * dt` and wraps to 0 at the end of the route.
//! The car is placed on the route at its progress, pushed sideways by the
//! steering offset, turned to face along the road and banked into turns.
//! Pitch is always zero, whatever the road slope.

use bevy::prelude::*;

use super::mode::Mode;
use super::smoothing::{damp, damp_angle};
use super::vehicle::VehicleBody;
use crate::route::RoutePath;

#[derive(Resource, Clone, Copy, Debug)]
pub struct MotionConfig {
    /// Top speed in progress units per second.
    pub max_speed: f32,
    /// Rate at which speed follows its target (1/s).
    pub acceleration_rate: f32,
    /// Rate at which heading follows the road direction (1/s).
    pub heading_rate: f32,
    /// Lateral offset per unit of steering input.
    pub steer_gain: f32,
    /// Maximum lateral offset from the route centre line.
    pub max_lateral_offset: f32,
    /// Rate at which the lateral offset follows steering (1/s).
    pub lateral_rate: f32,
    /// Roll in radians per unit of lateral offset.
    pub bank_factor: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_speed: 0.05,
            acceleration_rate: 2.5,
            heading_rate: 5.0,
            steer_gain: 10.0,
            max_lateral_offset: 12.0,
            lateral_rate: 3.0,
            bank_factor: 0.04,
        }
    }
}

/// Result of one motion step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionSample {
    pub progress: f32,
    pub position: Vec3,
    pub heading: f32,
    pub lateral_offset: f32,
    /// True when this step completed a lap.
    pub wrapped: bool,
}

#[derive(Clone, Debug)]
pub struct MotionModel {
    config: MotionConfig,
    progress: f32,
    speed: f32,
    heading: f32,
    lateral_offset: f32,
}

impl MotionModel {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            progress: 0.0,
            speed: 0.0,
            heading: 0.0,
            lateral_offset: 0.0,
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn lateral_offset(&self) -> f32 {
        self.lateral_offset
    }

    /// Speed the model is currently easing toward under `mode`.
    pub fn target_speed(&self, mode: Mode) -> f32 {
        if mode == Mode::Driving {
            self.config.max_speed
        } else {
            0.0
        }
    }

    /// Puts the vehicle at the current progress with its heading snapped to the road.
    pub fn place(&mut self, path: &impl RoutePath, vehicle: &mut impl VehicleBody) {
        self.heading = road_heading(path.tangent_at(self.progress));
        self.apply_pose(path, vehicle);
    }

    /// Advances one frame.
    ///
    /// `steering` is the already-smoothed input value in `[-1, 1]`.
    pub fn advance(
        &mut self,
        dt: f32,
        mode: Mode,
        steering: f32,
        path: &impl RoutePath,
        vehicle: &mut impl VehicleBody,
    ) -> MotionSample {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let config = self.config;

        let target = self.target_speed(mode);
        self.speed = damp(self.speed, target, config.acceleration_rate, dt).clamp(0.0, config.max_speed);

        self.progress += self.speed * dt;
        let wrapped = self.progress >= 1.0;
        if wrapped {
            self.progress = 0.0;
            debug!("Lap complete, route restarts");
        }

        let raw_heading = road_heading(path.tangent_at(self.progress));
        self.heading = damp_angle(self.heading, raw_heading, config.heading_rate, dt);

        let lateral_target = (steering * config.steer_gain)
            .clamp(-config.max_lateral_offset, config.max_lateral_offset);
        self.lateral_offset = damp(self.lateral_offset, lateral_target, config.lateral_rate, dt);

        let position = self.apply_pose(path, vehicle);

        MotionSample {
            progress: self.progress,
            position,
            heading: self.heading,
            lateral_offset: self.lateral_offset,
            wrapped,
        }
    }

    fn apply_pose(&self, path: &impl RoutePath, vehicle: &mut impl VehicleBody) -> Vec3 {
        let ground_clearance = vehicle.ground_clearance();
        let yaw = Quat::from_rotation_y(self.heading);
        // Bank follows the smoothed offset, so it trails the steering slightly.
        let roll = Quat::from_rotation_z(-self.lateral_offset * self.config.bank_factor);

        let side = yaw * Vec3::X;
        let position = path.point_at(self.progress)
            + Vec3::Y * ground_clearance
            + side * self.lateral_offset;

        vehicle.set_pose(position, yaw * roll);
        position
    }
}

/// Heading of the road from its horizontal direction; slope is ignored.
pub fn road_heading(tangent: Vec3) -> f32 {
    tangent.x.atan2(tangent.z)
}
