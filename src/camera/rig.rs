//! Cinematic camera behaviours, one per drive mode.
//!
//! - Orbit (Start): circles the origin as a pure function of wall time.
//! - Follow (Driving): trails behind and above the car, widening the FOV with
//!   speed and shaking slightly at speed.
//! - Dolly-in (Stopped): eases round to the side of the car and narrows the FOV.
//!
//! Position follows faster than FOV in Follow so the FOV swell lags the
//! motion; Dolly-in is the slowest blend of all.

use bevy::prelude::*;
use rand::Rng;

use crate::drive::mode::Mode;
use crate::drive::smoothing::{damp, damp_vec3};

#[derive(Resource, Clone, Copy, Debug)]
pub struct CameraRigConfig {
    /// Orbit radius around the origin.
    pub orbit_radius: f32,
    /// Orbit angular speed (rad/s).
    pub orbit_speed: f32,
    pub orbit_height: f32,
    /// Vertical bob amplitude while orbiting.
    pub orbit_bob: f32,
    pub orbit_bob_speed: f32,
    pub orbit_look_at: Vec3,

    /// FOV at rest, in degrees.
    pub base_fov: f32,
    /// Extra degrees of FOV per unit of speed.
    pub fov_per_speed: f32,
    pub follow_fov_rate: f32,
    /// Camera offset in the car's local frame.
    pub follow_offset: Vec3,
    pub follow_rate: f32,
    /// Look-at point in the car's local frame.
    pub look_ahead: Vec3,
    /// Speed below which there is no shake.
    pub shake_threshold: f32,
    /// Shake amplitude per unit of speed.
    pub shake_factor: f32,

    pub dolly_offset: Vec3,
    pub dolly_rate: f32,
    pub dolly_fov: f32,
    pub dolly_fov_rate: f32,
    /// Visual centre of the car relative to its origin.
    pub vehicle_center: Vec3,

    pub near: f32,
    pub far: f32,
}

impl Default for CameraRigConfig {
    fn default() -> Self {
        Self {
            orbit_radius: 35.0,
            orbit_speed: 0.3,
            orbit_height: 12.0,
            orbit_bob: 5.0,
            orbit_bob_speed: 0.5,
            orbit_look_at: Vec3::new(0.0, 2.0, 0.0),

            base_fov: 60.0,
            fov_per_speed: 400.0,
            follow_fov_rate: 2.0,
            follow_offset: Vec3::new(0.0, 6.0, -14.0),
            follow_rate: 3.5,
            look_ahead: Vec3::new(0.0, 2.0, 25.0),
            shake_threshold: 0.01,
            shake_factor: 0.15,

            dolly_offset: Vec3::new(12.0, 4.0, -5.0),
            dolly_rate: 1.5,
            dolly_fov: 50.0,
            dolly_fov_rate: 2.0,
            vehicle_center: Vec3::new(0.0, 2.0, 0.0),

            near: 0.1,
            far: 3000.0,
        }
    }
}

/// What the renderer needs to place the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Width over height of the viewport.
    pub aspect: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraBehavior {
    Orbit,
    Follow,
    DollyIn,
}

impl CameraBehavior {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Start => Self::Orbit,
            Mode::Driving => Self::Follow,
            Mode::Stopped => Self::DollyIn,
        }
    }
}

/// Pose source for the behaviours that track the car.
#[derive(Clone, Copy, Debug)]
pub struct Subject {
    pub translation: Vec3,
    pub rotation: Quat,
    pub speed: f32,
}

#[derive(Clone, Debug)]
pub struct CameraController {
    config: CameraRigConfig,
    /// Smoothed position, never includes shake.
    position: Vec3,
    fov: f32,
    aspect: f32,
    pose: CameraPose,
    behavior: CameraBehavior,
}

impl CameraController {
    pub fn new(config: CameraRigConfig) -> Self {
        let position = Vec3::new(0.0, 15.0, -40.0);
        let aspect = 16.0 / 9.0;
        Self {
            config,
            position,
            fov: config.base_fov,
            aspect,
            pose: CameraPose {
                position,
                look_at: config.orbit_look_at,
                fov: config.base_fov,
                aspect,
            },
            behavior: CameraBehavior::Orbit,
        }
    }

    pub fn config(&self) -> &CameraRigConfig {
        &self.config
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// Behaviour used by the most recent update.
    pub fn behavior(&self) -> CameraBehavior {
        self.behavior
    }

    /// Updates the projection aspect ratio. Only touches intrinsics.
    pub fn resize(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.aspect = width / height;
        self.pose.aspect = self.aspect;
    }

    /// FOV Follow mode blends toward at `speed`.
    pub fn follow_fov_target(&self, speed: f32) -> f32 {
        self.config.base_fov + speed * self.config.fov_per_speed
    }

    pub fn update(
        &mut self,
        mode: Mode,
        dt: f32,
        elapsed: f32,
        subject: Subject,
        rng: &mut impl Rng,
    ) -> CameraPose {
        self.behavior = CameraBehavior::for_mode(mode);
        self.pose = match self.behavior {
            CameraBehavior::Orbit => self.orbit(elapsed),
            CameraBehavior::Follow => self.follow(dt, subject, rng),
            CameraBehavior::DollyIn => self.dolly_in(dt, subject),
        };
        self.pose
    }

    fn orbit(&mut self, elapsed: f32) -> CameraPose {
        let c = &self.config;
        let angle = elapsed * c.orbit_speed;
        self.position = Vec3::new(
            angle.sin() * c.orbit_radius,
            c.orbit_height + (elapsed * c.orbit_bob_speed).sin() * c.orbit_bob,
            angle.cos() * c.orbit_radius,
        );

        CameraPose {
            position: self.position,
            look_at: c.orbit_look_at,
            fov: self.fov,
            aspect: self.aspect,
        }
    }

    fn follow(&mut self, dt: f32, subject: Subject, rng: &mut impl Rng) -> CameraPose {
        let c = self.config;

        self.fov = damp(self.fov, self.follow_fov_target(subject.speed), c.follow_fov_rate, dt);

        let target = subject.translation + subject.rotation * c.follow_offset;
        self.position = damp_vec3(self.position, target, c.follow_rate, dt);

        // Shake is applied on top of the smoothed position and not carried over.
        let mut shaken = self.position;
        if subject.speed > c.shake_threshold {
            let amplitude = subject.speed * c.shake_factor;
            shaken.x += (rng.gen::<f32>() - 0.5) * amplitude;
            shaken.y += (rng.gen::<f32>() - 0.5) * amplitude;
        }

        CameraPose {
            position: shaken,
            look_at: subject.translation + subject.rotation * c.look_ahead,
            fov: self.fov,
            aspect: self.aspect,
        }
    }

    fn dolly_in(&mut self, dt: f32, subject: Subject) -> CameraPose {
        let c = self.config;

        let target = subject.translation + subject.rotation * c.dolly_offset;
        self.position = damp_vec3(self.position, target, c.dolly_rate, dt);
        self.fov = damp(self.fov, c.dolly_fov, c.dolly_fov_rate, dt);

        CameraPose {
            position: self.position,
            look_at: subject.translation + c.vehicle_center,
            fov: self.fov,
            aspect: self.aspect,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn subject(speed: f32) -> Subject {
        Subject {
            translation: Vec3::new(0.0, 0.5, 100.0),
            rotation: Quat::IDENTITY,
            speed,
        }
    }

    #[test]
    fn orbit_is_a_function_of_time() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut a = CameraController::new(CameraRigConfig::default());
        let mut b = CameraController::new(CameraRigConfig::default());

        a.update(Mode::Start, DT, 1.0, subject(0.0), &mut rng);
        let pose_a = a.update(Mode::Start, DT, 4.2, subject(0.0), &mut rng);
        let pose_b = b.update(Mode::Start, 0.5, 4.2, subject(0.0), &mut rng);
        assert_eq!(pose_a, pose_b);

        let horizontal = Vec2::new(pose_a.position.x, pose_a.position.z).length();
        assert!((horizontal - 35.0).abs() < 1e-3);
        assert_eq!(pose_a.look_at, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn follow_fov_settles_at_base_when_idle() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut rig = CameraController::new(CameraRigConfig::default());
        rig.fov = 80.0;

        for _ in 0..600 {
            rig.update(Mode::Driving, DT, 0.0, subject(0.0), &mut rng);
        }
        assert!((rig.pose().fov - 60.0).abs() < 0.01);
    }

    #[test]
    fn follow_fov_climbs_toward_speed_target_without_overshoot() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut rig = CameraController::new(CameraRigConfig::default());
        let target = rig.follow_fov_target(0.05);
        assert!((target - 80.0).abs() < 1e-4);

        let mut last = rig.pose().fov;
        for _ in 0..600 {
            let fov = rig.update(Mode::Driving, DT, 0.0, subject(0.05), &mut rng).fov;
            assert!(fov >= last && fov <= target);
            last = fov;
        }
        assert!((target - last) < 0.01);
    }

    #[test]
    fn follow_position_lags_behind_and_above() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut rig = CameraController::new(CameraRigConfig::default());
        for _ in 0..900 {
            rig.update(Mode::Driving, DT, 0.0, subject(0.0), &mut rng);
        }
        let pose = rig.pose();
        let expected = Vec3::new(0.0, 6.5, 86.0);
        assert!(pose.position.distance(expected) < 1e-2);
        assert!(pose.look_at.distance(Vec3::new(0.0, 2.5, 125.0)) < 1e-4);
    }

    #[test]
    fn shake_is_not_persisted() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut rig = CameraController::new(CameraRigConfig::default());
        for _ in 0..900 {
            rig.update(Mode::Driving, DT, 0.0, subject(0.05), &mut rng);
        }
        let pose = rig.pose();
        let settled = Vec3::new(0.0, 6.5, 86.0);
        // Shaken output wanders, the smoothed state does not.
        assert!(rig.position.distance(settled) < 1e-2);
        assert!(pose.position.distance(rig.position) <= 0.05 * 0.15);
    }

    #[test]
    fn dolly_in_is_slower_and_narrows_fov() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut follow = CameraController::new(CameraRigConfig::default());
        let mut dolly = CameraController::new(CameraRigConfig::default());

        let f = follow.update(Mode::Driving, DT, 0.0, subject(0.0), &mut rng);
        let d = dolly.update(Mode::Stopped, DT, 0.0, subject(0.0), &mut rng);
        let start = Vec3::new(0.0, 15.0, -40.0);
        let follow_target = Vec3::new(0.0, 6.5, 86.0);
        let dolly_target = Vec3::new(12.0, 4.5, 95.0);
        let follow_fraction = f.position.distance(start) / start.distance(follow_target);
        let dolly_fraction = d.position.distance(start) / start.distance(dolly_target);
        assert!(dolly_fraction < follow_fraction);

        for _ in 0..900 {
            dolly.update(Mode::Stopped, DT, 0.0, subject(0.0), &mut rng);
        }
        let pose = dolly.pose();
        assert!((pose.fov - 50.0).abs() < 0.01);
        assert!(pose.position.distance(dolly_target) < 1e-2);
        assert_eq!(pose.look_at, Vec3::new(0.0, 2.5, 100.0));
    }

    #[test]
    fn resize_is_idempotent() {
        let mut rig = CameraController::new(CameraRigConfig::default());
        rig.resize(1280.0, 720.0);
        let once = rig.pose();
        rig.resize(1280.0, 720.0);
        assert_eq!(rig.pose(), once);
        assert!((once.aspect - 1280.0 / 720.0).abs() < 1e-6);

        rig.resize(0.0, 720.0);
        assert_eq!(rig.pose(), once);
    }
}
