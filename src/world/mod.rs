//! Static scene dressing along the route.
//!
//! Everything here is spawned once at startup and never touched again: the
//! road surface and its markings, a gantry over each waypoint, clusters of
//! glowing towers around each section and lamps down both verges.

use bevy::prelude::*;
use noise::Perlin;
use rand::{rngs::StdRng, SeedableRng};

pub mod layout;

use crate::drive::motion::road_heading;
use crate::route::waypoints::PORTFOLIO_SECTIONS;
use crate::route::{CatmullRomRoute, RoutePath};
use layout::{building_lots, lamp_posts};

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldConfig>()
            .insert_resource(ClearColor(Color::srgb(0.01, 0.01, 0.03)))
            .add_systems(Startup, (spawn_lighting, spawn_road, spawn_sections, spawn_lamps));
    }
}

#[derive(Resource, Clone, Debug)]
pub struct WorldConfig {
    /// Control points of the drive route.
    pub route_points: Vec<Vec3>,
    pub road_width: f32,
    pub road_length: f32,
    /// Z of the road plane's centre.
    pub road_center_z: f32,
    /// Width of the glossy strip down the middle of the road.
    pub wet_strip_width: f32,
    pub shoulder_width: f32,
    pub edge_width: f32,
    pub line_width: f32,
    /// Distance of each centre line from the middle of the road.
    pub line_offset: f32,
    pub gantry_height: f32,
    pub gantry_span: f32,
    pub buildings_per_section: usize,
    pub lamp_spacing: f32,
    /// Distance of the lamp posts from the route's centre line.
    pub lamp_offset: f32,
    pub lamp_height: f32,
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            route_points: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(40.0, 0.0, 600.0),
                Vec3::new(-40.0, 0.0, 1200.0),
                Vec3::new(20.0, 0.0, 1800.0),
                Vec3::new(0.0, 0.0, 2500.0),
            ],
            road_width: 65.0,
            road_length: 2600.0,
            road_center_z: 1250.0,
            wet_strip_width: 18.0,
            shoulder_width: 140.0,
            edge_width: 180.0,
            line_width: 0.8,
            line_offset: 0.7,
            gantry_height: 32.0,
            gantry_span: 28.0,
            buildings_per_section: 18,
            lamp_spacing: 250.0,
            lamp_offset: 42.0,
            lamp_height: 18.0,
            seed: 1337,
        }
    }
}

impl WorldConfig {
    /// The drive route, if the control points describe one.
    pub fn route(&self) -> Option<CatmullRomRoute> {
        CatmullRomRoute::new(self.route_points.clone())
    }
}

#[derive(Component)]
pub struct Gantry;

#[derive(Component)]
pub struct Tower;

#[derive(Component)]
pub struct RoadLamp;

fn spawn_lighting(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.35, 0.35, 0.6),
        brightness: 120.0,
    });

    // Moonlight
    commands.spawn((
        DirectionalLight {
            color: Color::srgb(0.6, 0.7, 1.0),
            illuminance: 800.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(-200.0, 400.0, -300.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn spawn_road(
    mut commands: Commands,
    config: Res<WorldConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let centre = Vec3::new(0.0, 0.0, config.road_center_z);
    let length = config.road_length;

    // Widest first; each layer sits a hair above the one below to avoid z-fighting.
    let layers = [
        (config.edge_width, -0.06, Color::srgb(0.01, 0.01, 0.015), 1.0),
        (config.shoulder_width, -0.04, Color::srgb(0.03, 0.03, 0.04), 0.95),
        (config.road_width, 0.0, Color::srgb(0.06, 0.06, 0.07), 0.7),
        (config.wet_strip_width, 0.02, Color::srgb(0.04, 0.04, 0.06), 0.15),
    ];
    for (width, lift, color, roughness) in layers {
        commands.spawn((
            Mesh3d(meshes.add(Plane3d::default().mesh().size(width, length))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: color,
                perceptual_roughness: roughness,
                metallic: 0.1,
                ..default()
            })),
            Transform::from_translation(centre + Vec3::Y * lift),
        ));
    }

    let line_material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.8, 0.0),
        emissive: LinearRgba::new(1.0, 0.7, 0.0, 1.0),
        ..default()
    });
    let line_mesh = meshes.add(Plane3d::default().mesh().size(config.line_width, length));
    for side in [-1.0, 1.0] {
        commands.spawn((
            Mesh3d(line_mesh.clone()),
            MeshMaterial3d(line_material.clone()),
            Transform::from_xyz(side * config.line_offset, 0.04, config.road_center_z),
        ));
    }
}

fn spawn_sections(
    mut commands: Commands,
    config: Res<WorldConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(route) = config.route() else {
        warn!("Route has too few control points, skipping gantries and towers");
        return;
    };

    let board_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.02, 0.02, 0.05),
        emissive: LinearRgba::new(0.0, 0.6, 0.8, 1.0),
        ..default()
    });
    let pole_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.2, 0.2, 0.22),
        perceptual_roughness: 0.6,
        metallic: 0.4,
        ..default()
    });
    let tower_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.02, 0.05, 0.08),
        emissive: LinearRgba::new(0.0, 0.35, 0.45, 1.0),
        perceptual_roughness: 0.3,
        ..default()
    });

    let board_mesh = meshes.add(Cuboid::new(55.0, 14.0, 1.0));
    let pole_height = config.gantry_height + 8.0;
    let pole_mesh = meshes.add(Cuboid::new(2.5, pole_height, 2.5));

    let mut rng = StdRng::seed_from_u64(config.seed);
    let perlin = Perlin::new(config.seed as u32);
    let mut towers = 0;

    for section in PORTFOLIO_SECTIONS.iter() {
        let t = section.trigger.clamp(0.0, 1.0);
        let point = route.point_at(t);
        let facing = Quat::from_rotation_y(road_heading(route.tangent_at(t)));

        commands
            .spawn((
                Gantry,
                Transform::from_translation(point).with_rotation(facing),
                Visibility::default(),
            ))
            .with_children(|gantry| {
                gantry.spawn((
                    Mesh3d(board_mesh.clone()),
                    MeshMaterial3d(board_material.clone()),
                    Transform::from_xyz(0.0, config.gantry_height, 0.0),
                ));
                for side in [-1.0, 1.0] {
                    gantry.spawn((
                        Mesh3d(pole_mesh.clone()),
                        MeshMaterial3d(pole_material.clone()),
                        Transform::from_xyz(side * config.gantry_span, pole_height / 2.0, 0.0),
                    ));
                }
            });

        for lot in building_lots(point, config.buildings_per_section, &mut rng, &perlin) {
            commands.spawn((
                Tower,
                Mesh3d(meshes.add(Cuboid::new(lot.width, lot.height, lot.depth))),
                MeshMaterial3d(tower_material.clone()),
                Transform::from_translation(lot.center),
            ));
            towers += 1;
        }
    }

    info!(
        "Spawned {} gantries and {} towers",
        PORTFOLIO_SECTIONS.len(),
        towers
    );
}

fn spawn_lamps(
    mut commands: Commands,
    config: Res<WorldConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let pole_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.2, 0.2, 0.22),
        perceptual_roughness: 0.6,
        metallic: 0.4,
        ..default()
    });
    let pole_height = config.lamp_height + 7.0;
    let pole_mesh = meshes.add(Cuboid::new(1.0, pole_height, 1.0));

    for base in lamp_posts(config.road_length, config.lamp_spacing, config.lamp_offset) {
        commands
            .spawn((
                RoadLamp,
                Mesh3d(pole_mesh.clone()),
                MeshMaterial3d(pole_material.clone()),
                Transform::from_translation(base + Vec3::Y * pole_height / 2.0),
            ))
            .with_children(|lamp| {
                lamp.spawn((
                    PointLight {
                        color: Color::srgb(1.0, 0.75, 0.45),
                        intensity: 2_000_000.0,
                        range: 120.0,
                        shadows_enabled: false,
                        ..default()
                    },
                    Transform::from_xyz(0.0, config.lamp_height - pole_height / 2.0, 0.0),
                ));
            });
    }
}
