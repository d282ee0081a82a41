//! Drive Portfolio - a night drive through a portfolio, one section per stop.
//!
//! The core (route, drive, camera rig) is plain Rust and runs headless; the
//! plugins wire it into a Bevy app.

use bevy::prelude::*;

pub mod camera;
pub mod drive;
pub mod game_state;
pub mod loading;
pub mod route;
pub mod ui;
pub mod world;

/// Everything the portfolio needs on top of `DefaultPlugins`.
pub struct PortfolioPlugin;

impl Plugin for PortfolioPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(game_state::GameStatePlugin)
            .add_plugins(drive::DrivePlugin)
            .add_plugins(camera::CameraPlugin)
            .add_plugins(world::WorldPlugin)
            .add_plugins(loading::LoadingPlugin)
            .add_plugins(ui::UiPlugin);
    }
}
