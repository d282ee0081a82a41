//! Perspective chase camera.
//!
//! The pose itself comes from `rig::CameraController` inside the running
//! drive; this plugin owns the camera entity, its post-processing stack and
//! the hand-off of pose and viewport size between the two.

use bevy::{
    core_pipeline::{
        bloom::{Bloom, BloomCompositeMode, BloomPrefilter},
        tonemapping::Tonemapping,
    },
    pbr::{DistanceFog, FogFalloff},
    prelude::*,
    window::WindowResized,
};

pub mod rig;

use crate::drive::{DriveSet, PortfolioDrive};
use rig::{CameraPose, CameraRigConfig};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraRigConfig>()
            .init_resource::<BloomConfig>()
            .init_resource::<AtmosphereConfig>()
            .add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                (resize_rig, apply_camera_pose)
                    .chain()
                    .in_set(DriveSet::Present)
                    .run_if(resource_exists::<PortfolioDrive>),
            );
    }
}

/// Marker for the chase camera.
#[derive(Component)]
pub struct DriveCamera;

/// Configuration for bloom on emissive buildings and lights.
#[derive(Resource)]
pub struct BloomConfig {
    pub intensity: f32,
    /// Luminance above which pixels glow.
    pub threshold: f32,
    pub threshold_softness: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            intensity: 0.35,
            threshold: 0.6,
            threshold_softness: 0.3,
        }
    }
}

/// Night fog. Dense enough to hide the far end of the road.
#[derive(Resource)]
pub struct AtmosphereConfig {
    pub fog_color: Color,
    pub fog_density: f32,
}

impl Default for AtmosphereConfig {
    fn default() -> Self {
        Self {
            fog_color: Color::srgb(0.02, 0.02, 0.06),
            fog_density: 0.0015,
        }
    }
}

/// Projection for a pose, in Bevy's units (radians).
pub fn projection_for(pose: &CameraPose, config: &CameraRigConfig) -> PerspectiveProjection {
    PerspectiveProjection {
        fov: pose.fov.to_radians(),
        aspect_ratio: pose.aspect,
        near: config.near,
        far: config.far,
    }
}

fn setup_camera(
    mut commands: Commands,
    rig: Res<CameraRigConfig>,
    bloom: Res<BloomConfig>,
    atmosphere: Res<AtmosphereConfig>,
) {
    commands.spawn((
        Camera3d::default(),
        Camera {
            hdr: true, // Required for bloom
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: rig.base_fov.to_radians(),
            near: rig.near,
            far: rig.far,
            ..default()
        }),
        Transform::from_xyz(0.0, 15.0, -40.0).looking_at(rig.orbit_look_at, Vec3::Y),
        DistanceFog {
            color: atmosphere.fog_color,
            falloff: FogFalloff::Exponential {
                density: atmosphere.fog_density,
            },
            ..default()
        },
        Bloom {
            intensity: bloom.intensity,
            prefilter: BloomPrefilter {
                threshold: bloom.threshold,
                threshold_softness: bloom.threshold_softness,
            },
            composite_mode: BloomCompositeMode::Additive,
            ..default()
        },
        Tonemapping::AgX,
        DriveCamera,
    ));
}

fn resize_rig(mut resized: EventReader<WindowResized>, mut drive: ResMut<PortfolioDrive>) {
    for event in resized.read() {
        drive.camera.resize(event.width, event.height);
    }
}

fn apply_camera_pose(
    drive: Res<PortfolioDrive>,
    mut cameras: Query<(&mut Transform, &mut Projection), With<DriveCamera>>,
) {
    let pose = drive.camera.pose();
    for (mut transform, mut projection) in &mut cameras {
        *transform = Transform::from_translation(pose.position).looking_at(pose.look_at, Vec3::Y);
        *projection = Projection::Perspective(projection_for(&pose, drive.camera.config()));
    }
}
