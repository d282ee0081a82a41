//! The vehicle as seen by the drive core: a pose it can be placed at and,
//! optionally, lights it can switch on.

use bevy::prelude::*;

use super::smoothing::damp;

/// Optional capability for vehicles with working lights.
pub trait Illuminable {
    /// Switches the headlights on. Repeated calls are harmless.
    fn ignite(&mut self);
    fn set_braking(&mut self, braking: bool);
    /// Blends light intensities toward their targets.
    fn update_lights(&mut self, dt: f32);
}

/// Visual boundary the motion model writes to.
pub trait VehicleBody {
    fn set_pose(&mut self, translation: Vec3, rotation: Quat);
    fn translation(&self) -> Vec3;
    fn rotation(&self) -> Quat;
    /// Height of the model origin above the road surface.
    fn ground_clearance(&self) -> f32;

    /// Light control, for vehicles that declare it.
    fn illumination(&mut self) -> Option<&mut dyn Illuminable> {
        None
    }
}

#[derive(Resource, Clone, Debug)]
pub struct VehicleConfig {
    /// glTF model to load, e.g. `models/car.glb` under `assets/`. `None`
    /// builds a box-bodied car instead.
    pub model_path: Option<String>,
    /// Uniform scale applied to the model.
    pub model_scale: f32,
    /// Headlight intensity once ignited (lumens).
    pub headlight_intensity: f32,
    /// Brake light intensity while not driving (lumens).
    pub brake_intensity: f32,
    /// Rate at which light intensities follow their targets (1/s).
    pub light_rate: f32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            model_scale: 4.0,
            headlight_intensity: 400_000.0,
            brake_intensity: 20_000.0,
            light_rate: 8.0,
        }
    }
}

/// Headlight and brake light intensities, blended every frame.
#[derive(Clone, Debug, PartialEq)]
pub struct CarLights {
    pub headlight: f32,
    pub brake: f32,
    headlight_target: f32,
    brake_target: f32,
    headlight_on: f32,
    brake_on: f32,
    rate: f32,
}

impl CarLights {
    pub fn new(config: &VehicleConfig) -> Self {
        Self {
            headlight: 0.0,
            brake: 0.0,
            headlight_target: 0.0,
            brake_target: 0.0,
            headlight_on: config.headlight_intensity,
            brake_on: config.brake_intensity,
            rate: config.light_rate,
        }
    }

    pub fn ignited(&self) -> bool {
        self.headlight_target > 0.0
    }
}

impl Illuminable for CarLights {
    fn ignite(&mut self) {
        if !self.ignited() {
            info!("Headlights on");
        }
        self.headlight_target = self.headlight_on;
    }

    fn set_braking(&mut self, braking: bool) {
        self.brake_target = if braking { self.brake_on } else { 0.0 };
    }

    fn update_lights(&mut self, dt: f32) {
        self.headlight = damp(self.headlight, self.headlight_target, self.rate, dt);
        self.brake = damp(self.brake, self.brake_target, self.rate, dt);
    }
}

/// The portfolio car.
#[derive(Clone, Debug)]
pub struct Car {
    translation: Vec3,
    rotation: Quat,
    /// Distance from the model origin down to its lowest point.
    pub ground_clearance: f32,
    pub lights: Option<CarLights>,
}

impl Car {
    pub fn new(ground_clearance: f32, lights: Option<CarLights>) -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            ground_clearance,
            lights,
        }
    }
}

impl VehicleBody for Car {
    fn set_pose(&mut self, translation: Vec3, rotation: Quat) {
        self.translation = translation;
        self.rotation = rotation;
    }

    fn translation(&self) -> Vec3 {
        self.translation
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn ground_clearance(&self) -> f32 {
        self.ground_clearance
    }

    fn illumination(&mut self) -> Option<&mut dyn Illuminable> {
        self.lights.as_mut().map(|lights| lights as &mut dyn Illuminable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lights_fade_rather_than_pop() {
        let mut lights = CarLights::new(&VehicleConfig::default());
        lights.ignite();
        lights.update_lights(1.0 / 60.0);
        assert!(lights.headlight > 0.0);
        assert!(lights.headlight < VehicleConfig::default().headlight_intensity * 0.5);

        for _ in 0..300 {
            lights.update_lights(1.0 / 60.0);
        }
        let on = VehicleConfig::default().headlight_intensity;
        assert!((lights.headlight - on).abs() / on < 1e-3);
    }

    #[test]
    fn unlit_car_has_no_illumination() {
        let mut car = Car::new(0.5, None);
        assert!(car.illumination().is_none());

        let mut lit = Car::new(0.5, Some(CarLights::new(&VehicleConfig::default())));
        assert!(lit.illumination().is_some());
    }
}
