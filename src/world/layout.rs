//! Placement of roadside props. Pure functions so the layout can be tested
//! without a renderer.

use bevy::math::Vec3;
use noise::{NoiseFn, Perlin};
use rand::Rng;

/// Footprint and height of one tower, with its centre already lifted so the
/// base sits on the ground.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildingLot {
    pub center: Vec3,
    pub width: f32,
    pub depth: f32,
    pub height: f32,
}

/// Scatters `count` towers either side of `anchor`, clear of the road.
///
/// Heights are 70..270 before a gentle Perlin swell so neighbouring sections
/// don't look stamped from the same mould.
pub fn building_lots(
    anchor: Vec3,
    count: usize,
    rng: &mut impl Rng,
    perlin: &Perlin,
) -> Vec<BuildingLot> {
    (0..count)
        .map(|_| {
            let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let x = anchor.x + side * (60.0 + rng.gen::<f32>() * 100.0);
            let z = anchor.z + (rng.gen::<f32>() - 0.5) * 500.0;

            let swell = perlin.get([x as f64 * 0.01, z as f64 * 0.01]) as f32;
            let height = (70.0 + rng.gen::<f32>() * 200.0) * (1.0 + swell * 0.25);
            let width = 25.0 + rng.gen::<f32>() * 15.0;
            let depth = 25.0 + rng.gen::<f32>() * 15.0;

            BuildingLot {
                center: Vec3::new(x, height / 2.0, z),
                width,
                depth,
                height,
            }
        })
        .collect()
}

/// Lamp bases from z = 0 to `length` every `spacing`. Every other lamp
/// switches verge.
pub fn lamp_posts(length: f32, spacing: f32, offset: f32) -> Vec<Vec3> {
    if spacing <= 0.0 || length < 0.0 {
        return Vec::new();
    }
    let count = (length / spacing).floor() as usize + 1;
    (0..count)
        .map(|i| {
            let side = if i % 2 == 0 { 1.0 } else { -1.0 };
            Vec3::new(offset * side, 0.0, i as f32 * spacing)
        })
        .collect()
}
