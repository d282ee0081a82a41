//! Car asset loading and construction of the running drive.
//!
//! The car model is the only asset the drive waits for. Once it is in, its
//! lowest point fixes the ground clearance, the drive context is built and
//! the car entity (model, headlights, brake light) is spawned. A failed load
//! is final: the app moves to `LoadFailed` and the UI is told why.

use bevy::{
    asset::LoadState,
    ecs::system::SystemParam,
    gltf::{Gltf, GltfMesh, GltfNode},
    prelude::*,
    render::mesh::MeshAabb,
    utils::HashSet,
};

use crate::camera::rig::CameraRigConfig;
use crate::drive::boundary::UiCommand;
use crate::drive::frame::{DriveContext, FrameConfig};
use crate::drive::input::{InputConfig, InputQueue};
use crate::drive::motion::MotionConfig;
use crate::drive::vehicle::{Car, CarLights, VehicleBody, VehicleConfig};
use crate::drive::{BrakeLight, CarBody, Headlight, PortfolioDrive};
use crate::game_state::AppState;
use crate::route::waypoints::{WaypointConfig, WaypointDetector, PORTFOLIO_SECTIONS};
use crate::world::WorldConfig;

pub struct LoadingPlugin;

impl Plugin for LoadingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, request_car_model)
            .add_systems(Update, finish_loading.run_if(in_state(AppState::Loading)));
    }
}

/// Handle to the car model while it loads. `None` means the procedural body.
#[derive(Resource, Default)]
pub struct CarModel(pub Option<Handle<Gltf>>);

/// Where the lights sit on the car, in its unscaled local frame.
const HEADLIGHT_OFFSETS: [Vec3; 2] = [Vec3::new(-0.75, 0.85, 2.5), Vec3::new(0.75, 0.85, 2.5)];
const HEADLIGHT_AIM: Vec3 = Vec3::new(0.0, 0.2, 25.0);
const BRAKE_LIGHT_OFFSET: Vec3 = Vec3::new(0.0, 0.8, -2.9);

/// Body and cabin of the fallback car, as `(size, centre)`.
const PROCEDURAL_PARTS: [(Vec3, Vec3); 2] = [
    (Vec3::new(1.9, 0.7, 4.6), Vec3::new(0.0, 0.0, 0.0)),
    (Vec3::new(1.6, 0.55, 2.2), Vec3::new(0.0, 0.62, -0.3)),
];

/// Everything that shapes the drive context.
#[derive(SystemParam)]
pub struct DriveConfigs<'w> {
    pub vehicle: Res<'w, VehicleConfig>,
    pub motion: Res<'w, MotionConfig>,
    pub input: Res<'w, InputConfig>,
    pub waypoints: Res<'w, WaypointConfig>,
    pub camera: Res<'w, CameraRigConfig>,
    pub frame: Res<'w, FrameConfig>,
    pub world: Res<'w, WorldConfig>,
}

fn request_car_model(mut commands: Commands, asset_server: Res<AssetServer>, config: Res<VehicleConfig>) {
    let handle = config.model_path.as_ref().map(|path| {
        info!("Loading car model {}", path);
        asset_server.load::<Gltf>(path.clone())
    });
    if handle.is_none() {
        info!("No car model configured, using procedural body");
    }
    commands.insert_resource(CarModel(handle));
}

/// Ground clearance for a model whose lowest point is `min_y` before scaling.
pub fn ground_clearance(min_y: f32, scale: f32) -> f32 {
    -min_y * scale
}

#[allow(clippy::too_many_arguments)]
fn finish_loading(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    model: Res<CarModel>,
    gltfs: Res<Assets<Gltf>>,
    gltf_nodes: Res<Assets<GltfNode>>,
    gltf_meshes: Res<Assets<GltfMesh>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    configs: DriveConfigs,
    mut queue: ResMut<InputQueue>,
    mut ui: EventWriter<UiCommand>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let body = match &model.0 {
        Some(handle) => match asset_server.load_state(handle.id()) {
            LoadState::Loaded => {
                let Some(gltf) = gltfs.get(handle) else {
                    return;
                };
                let min_y = lowest_point(gltf, &gltf_nodes, &gltf_meshes, &meshes);
                let Some(scene) = gltf.default_scene.clone().or_else(|| gltf.scenes.first().cloned()) else {
                    fail("car model has no scenes".to_string(), &mut ui, &mut next_state);
                    return;
                };
                CarVisual::Scene(scene, min_y)
            }
            LoadState::Failed(err) => {
                fail(err.to_string(), &mut ui, &mut next_state);
                return;
            }
            _ => return,
        },
        None => CarVisual::Procedural,
    };

    let Some(route) = configs.world.route() else {
        fail("route needs at least two control points".to_string(), &mut ui, &mut next_state);
        return;
    };

    let vehicle = &*configs.vehicle;
    let (clearance, scale) = match &body {
        CarVisual::Scene(_, min_y) => (ground_clearance(*min_y, vehicle.model_scale), vehicle.model_scale),
        CarVisual::Procedural => {
            let min_y = PROCEDURAL_PARTS
                .iter()
                .map(|(size, centre)| centre.y - size.y / 2.0)
                .fold(f32::INFINITY, f32::min);
            (ground_clearance(min_y, 1.0), 1.0)
        }
    };

    let drive = DriveContext::new(
        route,
        Car::new(clearance, Some(CarLights::new(vehicle))),
        WaypointDetector::from_entries(PORTFOLIO_SECTIONS, *configs.waypoints),
        *configs.motion,
        *configs.input,
        *configs.camera,
        *configs.frame,
    );

    let root = Transform::from_translation(drive.vehicle.translation()).with_rotation(drive.vehicle.rotation());
    commands
        .spawn((CarBody, root, Visibility::default()))
        .with_children(|car| {
            match body {
                CarVisual::Scene(scene, _) => {
                    car.spawn((SceneRoot(scene), Transform::from_scale(Vec3::splat(scale))));
                }
                CarVisual::Procedural => {
                    let paint = materials.add(StandardMaterial {
                        base_color: Color::srgb(0.85, 0.05, 0.2),
                        metallic: 0.8,
                        perceptual_roughness: 0.25,
                        ..default()
                    });
                    for (size, centre) in PROCEDURAL_PARTS {
                        car.spawn((
                            Mesh3d(meshes.add(Cuboid::from_size(size))),
                            MeshMaterial3d(paint.clone()),
                            Transform::from_translation(centre),
                        ));
                    }
                }
            }

            for offset in HEADLIGHT_OFFSETS {
                let aim = Vec3::new(offset.x, HEADLIGHT_AIM.y, HEADLIGHT_AIM.z);
                car.spawn((
                    Headlight,
                    SpotLight {
                        color: Color::srgb(1.0, 0.96, 0.88),
                        intensity: 0.0,
                        range: 200.0,
                        outer_angle: 0.5,
                        inner_angle: 0.3,
                        shadows_enabled: false,
                        ..default()
                    },
                    Transform::from_translation(offset).looking_at(aim, Vec3::Y),
                ));
            }

            car.spawn((
                BrakeLight,
                PointLight {
                    color: Color::srgb(1.0, 0.0, 0.1),
                    intensity: 0.0,
                    range: 12.0,
                    shadows_enabled: false,
                    ..default()
                },
                Transform::from_translation(BRAKE_LIGHT_OFFSET),
            ));
        });

    info!("Car ready, ground clearance {:.2}", clearance);
    queue.clear();
    commands.insert_resource(PortfolioDrive(drive));
    commands.remove_resource::<CarModel>();
    ui.send(UiCommand::Ready);
    next_state.set(AppState::Running);
}

enum CarVisual {
    Scene(Handle<Scene>, f32),
    Procedural,
}

/// Lowest Y of the box `min..max` once `transform` is applied.
pub fn transformed_min_y(min: Vec3, max: Vec3, transform: &Mat4) -> f32 {
    (0..8)
        .map(|corner| {
            let x = if corner & 1 == 0 { min.x } else { max.x };
            let y = if corner & 2 == 0 { min.y } else { max.y };
            let z = if corner & 4 == 0 { min.z } else { max.z };
            transform.transform_point3(Vec3::new(x, y, z)).y
        })
        .fold(f32::INFINITY, f32::min)
}

/// Lowest point of the model in its own frame, node transforms included.
fn lowest_point(
    gltf: &Gltf,
    gltf_nodes: &Assets<GltfNode>,
    gltf_meshes: &Assets<GltfMesh>,
    meshes: &Assets<Mesh>,
) -> f32 {
    let children: HashSet<_> = gltf
        .nodes
        .iter()
        .filter_map(|handle| gltf_nodes.get(handle))
        .flat_map(|node| node.children.iter().map(Handle::id))
        .collect();
    let mut pending: Vec<_> = gltf
        .nodes
        .iter()
        .filter(|handle| !children.contains(&handle.id()))
        .map(|handle| (handle, Mat4::IDENTITY))
        .collect();

    let mut min_y = f32::INFINITY;
    while let Some((handle, parent)) = pending.pop() {
        let Some(node) = gltf_nodes.get(handle) else {
            continue;
        };
        let transform = parent * node.transform.compute_matrix();
        if let Some(mesh) = node.mesh.as_ref().and_then(|mesh| gltf_meshes.get(mesh)) {
            for aabb in mesh
                .primitives
                .iter()
                .filter_map(|primitive| meshes.get(&primitive.mesh))
                .filter_map(Mesh::compute_aabb)
            {
                let node_min = transformed_min_y(aabb.min().into(), aabb.max().into(), &transform);
                min_y = min_y.min(node_min);
            }
        }
        pending.extend(node.children.iter().map(|child| (child, transform)));
    }

    if min_y.is_finite() {
        min_y
    } else {
        warn!("Car model has no measurable geometry, assuming it sits on its origin");
        0.0
    }
}

fn fail(message: String, ui: &mut EventWriter<UiCommand>, next_state: &mut NextState<AppState>) {
    error!("Failed to load car: {}", message);
    ui.send(UiCommand::LoadFailed(message));
    next_state.set(AppState::LoadFailed);
}
