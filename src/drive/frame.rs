//! Simulation context and the per-frame entry point.
//!
//! `DriveContext::run_frame` is the whole drive for one display refresh. The
//! host calls it once per frame with its clock readings; nothing here knows
//! about Bevy's schedules. Within a frame the order is fixed:
//!
//! 1. input is drained and steering smoothed,
//! 2. the mode machine applies journey requests and runs the motion model,
//!    stopping at any waypoint that fires,
//! 3. the camera picks its behaviour from the (possibly new) mode,
//! 4. the HUD receives the current speed.

use bevy::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use super::boundary::UiBoundary;
use super::input::{InputAggregator, InputConfig, InputQueue};
use super::mode::{Mode, ModeMachine, Transition};
use super::motion::{MotionConfig, MotionModel, MotionSample};
use super::vehicle::VehicleBody;
use crate::camera::rig::{CameraController, CameraPose, CameraRigConfig, Subject};
use crate::route::waypoints::WaypointDetector;
use crate::route::RoutePath;

#[derive(Resource, Clone, Copy, Debug)]
pub struct FrameConfig {
    /// Longest step a single frame may simulate, in seconds.
    pub max_frame_step: f32,
    /// Seed for camera shake.
    pub seed: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_step: 0.1,
            seed: 24680,
        }
    }
}

/// Host clock readings for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameClock {
    /// Seconds since the previous frame, already clamped.
    pub delta: f32,
    /// Seconds since the host started.
    pub elapsed: f32,
}

impl FrameClock {
    /// Clamps the raw delta to `[0, max_step]`. A backgrounded tab or a
    /// debugger pause must not turn into one giant step.
    pub fn new(raw_delta: f32, elapsed: f32, max_step: f32) -> Self {
        let delta = if raw_delta.is_finite() {
            raw_delta.clamp(0.0, max_step)
        } else {
            0.0
        };
        Self { delta, elapsed }
    }
}

/// What happened during one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub transitions: Vec<Transition>,
    pub motion: Option<MotionSample>,
    pub camera: Option<CameraPose>,
}

/// Everything the drive needs, passed explicitly into each component.
pub struct DriveContext<P, V> {
    pub route: P,
    pub vehicle: V,
    pub input: InputAggregator,
    pub motion: MotionModel,
    pub waypoints: WaypointDetector,
    pub camera: CameraController,
    pub modes: ModeMachine,
    config: FrameConfig,
    rng: StdRng,
}

impl<P: RoutePath, V: VehicleBody> DriveContext<P, V> {
    pub fn new(
        route: P,
        mut vehicle: V,
        waypoints: WaypointDetector,
        motion: MotionConfig,
        input: InputConfig,
        camera: CameraRigConfig,
        config: FrameConfig,
    ) -> Self {
        let mut motion = MotionModel::new(motion);
        motion.place(&route, &mut vehicle);
        if let Some(lights) = vehicle.illumination() {
            lights.set_braking(true);
        }

        Self {
            route,
            vehicle,
            input: InputAggregator::new(input),
            motion,
            waypoints,
            camera: CameraController::new(camera),
            modes: ModeMachine::default(),
            config,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    pub fn frame_config(&self) -> &FrameConfig {
        &self.config
    }

    /// Builds a clamped clock from raw host readings.
    pub fn clock(&self, raw_delta: f32, elapsed: f32) -> FrameClock {
        FrameClock::new(raw_delta, elapsed, self.config.max_frame_step)
    }

    /// Runs one frame.
    pub fn run_frame(
        &mut self,
        queue: &mut InputQueue,
        clock: FrameClock,
        ui: &mut impl UiBoundary,
    ) -> FrameReport {
        let dt = clock.delta.clamp(0.0, self.config.max_frame_step);
        let mut report = FrameReport::default();

        if let Some(request) = self.input.update(queue, self.modes.mode(), dt) {
            if let Some(transition) = self.modes.request(request, &mut self.vehicle, ui) {
                report.transitions.push(transition);
            }
        }

        match self.modes.mode() {
            Mode::Start => {}
            Mode::Driving => {
                let sample = self.advance(dt);
                if let Some(waypoint) = self.waypoints.check(sample.progress) {
                    if let Some(transition) = self.modes.arrive(waypoint, ui) {
                        report.transitions.push(transition);
                    }
                }
                report.motion = Some(sample);
            }
            Mode::Stopped => {
                report.motion = Some(self.advance(dt));
            }
        }

        let mode = self.modes.mode();
        if let Some(lights) = self.vehicle.illumination() {
            lights.set_braking(mode != Mode::Driving);
            lights.update_lights(dt);
        }

        let subject = Subject {
            translation: self.vehicle.translation(),
            rotation: self.vehicle.rotation(),
            speed: self.motion.speed(),
        };
        report.camera = Some(self.camera.update(mode, dt, clock.elapsed, subject, &mut self.rng));

        ui.update_hud(self.motion.speed());
        report
    }

    fn advance(&mut self, dt: f32) -> MotionSample {
        let sample = self.motion.advance(
            dt,
            self.modes.mode(),
            self.input.steering(),
            &self.route,
            &mut self.vehicle,
        );
        if sample.wrapped {
            self.waypoints.reset();
        }
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::rig::CameraBehavior;
    use crate::drive::boundary::{UiCommand, UiOutbox};
    use crate::drive::input::{DriveKey, InputEvent};
    use crate::drive::vehicle::{Car, CarLights, VehicleConfig};
    use crate::route::waypoints::{WaypointConfig, WaypointKind, WaypointEntry};

    struct Straight;

    impl RoutePath for Straight {
        fn point_at(&self, t: f32) -> Vec3 {
            Vec3::Z * t * 2000.0
        }

        fn tangent_at(&self, _t: f32) -> Vec3 {
            Vec3::Z
        }
    }

    fn context(entries: &[WaypointEntry]) -> DriveContext<Straight, Car> {
        DriveContext::new(
            Straight,
            Car::new(0.6, Some(CarLights::new(&VehicleConfig::default()))),
            WaypointDetector::from_entries(entries, WaypointConfig::default()),
            MotionConfig::default(),
            InputConfig::default(),
            CameraRigConfig::default(),
            FrameConfig::default(),
        )
    }

    #[test]
    fn clock_clamps_large_and_bogus_deltas() {
        assert_eq!(FrameClock::new(5.0, 10.0, 0.1).delta, 0.1);
        assert_eq!(FrameClock::new(-1.0, 10.0, 0.1).delta, 0.0);
        assert_eq!(FrameClock::new(f32::INFINITY, 10.0, 0.1).delta, 0.0);
        assert_eq!(FrameClock::new(0.016, 10.0, 0.1).delta, 0.016);
    }

    #[test]
    fn begin_event_takes_effect_on_the_frame_that_drains_it() {
        let mut drive = context(&[]);
        let mut queue = InputQueue::default();
        let mut ui = UiOutbox::default();

        queue.push(InputEvent::Activate);
        assert_eq!(drive.mode(), Mode::Start);

        let report = drive.run_frame(&mut queue, FrameClock::new(0.016, 1.0, 0.1), &mut ui);
        assert_eq!(drive.mode(), Mode::Driving);
        assert_eq!(report.transitions.len(), 1);
        // The camera saw the new mode in the same frame.
        assert_eq!(drive.camera.behavior(), CameraBehavior::Follow);
        assert_eq!(ui.commands()[0], UiCommand::HideStartScreen);
        assert!(drive.vehicle.lights.as_ref().is_some_and(|l| l.ignited()));
    }

    #[test]
    fn start_mode_keeps_car_parked_and_orbits() {
        let mut drive = context(&[]);
        let mut queue = InputQueue::default();
        let mut ui = UiOutbox::default();
        queue.push(InputEvent::KeyDown(DriveKey::Left));

        for i in 0..120 {
            drive.run_frame(&mut queue, FrameClock::new(1.0 / 60.0, i as f32 / 60.0, 0.1), &mut ui);
        }
        assert_eq!(drive.motion.progress(), 0.0);
        assert_eq!(drive.camera.behavior(), CameraBehavior::Orbit);
        assert!(ui
            .commands()
            .iter()
            .all(|c| matches!(c, UiCommand::UpdateHud { speed } if *speed == 0.0)));
    }

    #[test]
    fn brake_light_tracks_mode() {
        let mut drive = context(&[]);
        let mut queue = InputQueue::default();
        let mut ui = UiOutbox::default();

        for _ in 0..60 {
            drive.run_frame(&mut queue, FrameClock::new(1.0 / 30.0, 0.0, 0.1), &mut ui);
        }
        let parked = drive.vehicle.lights.as_ref().map_or(0.0, |l| l.brake);
        assert!(parked > 0.0);

        queue.push(InputEvent::Activate);
        for _ in 0..60 {
            drive.run_frame(&mut queue, FrameClock::new(1.0 / 30.0, 0.0, 0.1), &mut ui);
        }
        let driving = drive.vehicle.lights.as_ref().map_or(1.0, |l| l.brake);
        assert!(driving < parked * 0.01);
    }

    fn early_stop() -> [WaypointEntry; 1] {
        [WaypointEntry {
            trigger: 0.02,
            name: Some("EARLY"),
            description: None,
            kind: WaypointKind::Hero,
            link: None,
        }]
    }

    #[test]
    fn steering_is_smoothed_twice_and_bank_trails_it() {
        let mut drive = context(&[]);
        let mut queue = InputQueue::default();
        let mut ui = UiOutbox::default();
        let motion = MotionConfig::default();

        queue.push(InputEvent::Activate);
        for _ in 0..30 {
            drive.run_frame(&mut queue, FrameClock::new(1.0 / 60.0, 0.0, 0.1), &mut ui);
        }
        assert_eq!(drive.mode(), Mode::Driving);
        assert_eq!(drive.motion.lateral_offset(), 0.0);

        queue.push(InputEvent::KeyDown(DriveKey::Left));
        drive.run_frame(&mut queue, FrameClock::new(1.0 / 60.0, 0.5, 0.1), &mut ui);

        let steering = drive.input.steering();
        assert!(steering > 0.0 && steering < 0.2);

        let lateral = drive.motion.lateral_offset();
        assert!(lateral > 0.0 && lateral < steering * motion.steer_gain);

        let (_, _, roll) = drive.vehicle.rotation().to_euler(EulerRot::YXZ);
        assert!((roll + lateral * motion.bank_factor).abs() < 1e-5);
        assert!(roll.abs() < steering * motion.steer_gain * motion.bank_factor);
    }

    #[test]
    fn resume_tap_does_not_steer() {
        let entries = early_stop();
        let mut drive = context(&entries);
        let mut queue = InputQueue::default();
        let mut ui = UiOutbox::default();

        queue.push(InputEvent::Activate);
        for _ in 0..2_000 {
            drive.run_frame(&mut queue, FrameClock::new(1.0 / 30.0, 0.0, 0.1), &mut ui);
            if drive.mode() == Mode::Stopped {
                break;
            }
        }
        assert_eq!(drive.mode(), Mode::Stopped);

        // A tap on CONTINUE, wherever it lands, is only an ignition edge.
        queue.push(InputEvent::Activate);
        for _ in 0..12 {
            drive.run_frame(&mut queue, FrameClock::new(1.0 / 60.0, 0.0, 0.1), &mut ui);
            assert_eq!(drive.input.steering_target(), 0.0);
            assert_eq!(drive.motion.lateral_offset(), 0.0);
        }
        assert_eq!(drive.mode(), Mode::Driving);
    }

    #[test]
    fn lap_wrap_rearms_waypoints() {
        let entries = early_stop();
        let mut drive = context(&entries);
        let mut queue = InputQueue::default();
        let mut ui = UiOutbox::default();

        let mut stops = 0;
        let mut laps = 0;
        for _ in 0..20_000 {
            queue.push(InputEvent::Activate);
            let report = drive.run_frame(&mut queue, FrameClock::new(0.1, 0.0, 0.1), &mut ui);
            stops += report
                .transitions
                .iter()
                .filter(|t| t.to == Mode::Stopped)
                .count();
            if report.motion.is_some_and(|m| m.wrapped) {
                laps += 1;
            }
            if laps == 2 {
                break;
            }
        }
        assert_eq!(laps, 2);
        // Fired once per lap, re-armed by the wrap.
        assert_eq!(stops, 2);
    }
}
