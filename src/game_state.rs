//! Application lifecycle.
//!
//! The drive only exists in `Running`. `LoadFailed` is terminal: the start
//! screen shows the error and nothing retries.

use bevy::prelude::*;

pub struct GameStatePlugin;

impl Plugin for GameStatePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppState>()
            .add_systems(OnEnter(AppState::Running), log_running)
            .add_systems(OnEnter(AppState::LoadFailed), log_load_failed);
    }
}

#[derive(States, Default, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum AppState {
    /// Car model and scene are loading; the start button is hidden.
    #[default]
    Loading,
    /// Drive context exists and the frame loop is running.
    Running,
    /// The car could not be loaded.
    LoadFailed,
}

fn log_running() {
    info!("Drive ready");
}

fn log_load_failed() {
    warn!("Drive will not start, assets failed to load");
}
