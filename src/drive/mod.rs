//! Real-time drive: input, motion, lights and the mode machine.
//!
//! The submodules are plain Rust with no ECS access. `DrivePlugin` is the thin
//! host layer: it turns Bevy input events into `InputEvent`s, runs one
//! `DriveContext` frame per `Update` and mirrors the result back onto
//! entities. Systems run in three chained sets so a frame always reads input
//! before simulating and simulates before presenting.

use bevy::{
    input::{
        keyboard::KeyboardInput,
        touch::{TouchInput, TouchPhase},
        ButtonState,
    },
    prelude::*,
};

pub mod boundary;
pub mod frame;
pub mod input;
pub mod mode;
pub mod motion;
pub mod smoothing;
pub mod vehicle;

use boundary::{UiCommand, UiOutbox};
use frame::{DriveContext, FrameConfig};
use input::{DriveKey, InputConfig, InputEvent, InputQueue};
use motion::MotionConfig;
use vehicle::{Car, VehicleBody, VehicleConfig};

use crate::game_state::AppState;
use crate::route::waypoints::WaypointConfig;
use crate::route::CatmullRomRoute;

pub struct DrivePlugin;

impl Plugin for DrivePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InputQueue>()
            .init_resource::<MotionConfig>()
            .init_resource::<InputConfig>()
            .init_resource::<WaypointConfig>()
            .init_resource::<FrameConfig>()
            .init_resource::<VehicleConfig>()
            .add_event::<UiCommand>()
            .configure_sets(
                Update,
                (DriveSet::Input, DriveSet::Simulate, DriveSet::Present).chain(),
            )
            // Nothing may queue input until the drive exists to consume it.
            .configure_sets(Update, DriveSet::Input.run_if(in_state(AppState::Running)))
            .add_systems(
                Update,
                (collect_keyboard, collect_touches).in_set(DriveSet::Input),
            )
            .add_systems(
                Update,
                run_drive_frame
                    .in_set(DriveSet::Simulate)
                    .run_if(resource_exists::<PortfolioDrive>),
            )
            .add_systems(
                Update,
                (sync_car_pose, sync_car_lights)
                    .in_set(DriveSet::Present)
                    .run_if(resource_exists::<PortfolioDrive>),
            );
    }
}

/// Per-frame ordering of the drive systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum DriveSet {
    /// Host input is queued. Runs only in `AppState::Running`.
    Input,
    /// One `DriveContext` frame.
    Simulate,
    /// Entities, camera and UI catch up with the simulation.
    Present,
}

/// The running drive. Inserted by the loader once the car is ready.
#[derive(Resource, Deref, DerefMut)]
pub struct PortfolioDrive(pub DriveContext<CatmullRomRoute, Car>);

/// Root entity of the car. Its transform is owned by the motion model.
#[derive(Component)]
pub struct CarBody;

#[derive(Component)]
pub struct Headlight;

#[derive(Component)]
pub struct BrakeLight;

/// Maps a physical key to a drive control.
pub fn drive_key(key: KeyCode) -> Option<DriveKey> {
    match key {
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(DriveKey::Left),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(DriveKey::Right),
        KeyCode::KeyW | KeyCode::ArrowUp | KeyCode::Space => Some(DriveKey::Accelerate),
        _ => None,
    }
}

fn collect_keyboard(mut keys: EventReader<KeyboardInput>, mut queue: ResMut<InputQueue>) {
    for key in keys.read() {
        let Some(control) = drive_key(key.key_code) else {
            continue;
        };
        match key.state {
            ButtonState::Pressed => queue.push(InputEvent::KeyDown(control)),
            ButtonState::Released => queue.push(InputEvent::KeyUp(control)),
        }
    }
}

/// Any tap starts or resumes the journey. Steering comes only from the
/// on-screen pads in `ui::controls`.
fn collect_touches(mut touches: EventReader<TouchInput>, mut queue: ResMut<InputQueue>) {
    for touch in touches.read() {
        if touch.phase == TouchPhase::Started {
            queue.push(InputEvent::Activate);
        }
    }
}

fn run_drive_frame(
    time: Res<Time>,
    mut drive: ResMut<PortfolioDrive>,
    mut queue: ResMut<InputQueue>,
    mut ui_commands: EventWriter<UiCommand>,
) {
    let clock = drive.clock(time.delta_secs(), time.elapsed_secs());
    let mut outbox = UiOutbox::default();
    let report = drive.run_frame(&mut queue, clock, &mut outbox);

    for transition in &report.transitions {
        debug!("Mode {:?} -> {:?}", transition.from, transition.to);
    }
    ui_commands.send_batch(outbox.take());
}

fn sync_car_pose(drive: Res<PortfolioDrive>, mut cars: Query<&mut Transform, With<CarBody>>) {
    for mut transform in &mut cars {
        transform.translation = drive.vehicle.translation();
        transform.rotation = drive.vehicle.rotation();
    }
}

fn sync_car_lights(
    drive: Res<PortfolioDrive>,
    mut headlights: Query<&mut SpotLight, With<Headlight>>,
    mut brake_lights: Query<&mut PointLight, With<BrakeLight>>,
) {
    let Some(lights) = drive.vehicle.lights.as_ref() else {
        return;
    };
    for mut spot in &mut headlights {
        spot.intensity = lights.headlight;
    }
    for mut point in &mut brake_lights {
        point.intensity = lights.brake;
    }
}
