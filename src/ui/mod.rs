//! On-screen UI: start screen, waypoint content and HUD.
//!
//! The drive never reads UI state. It emits `UiCommand`s after simulating and
//! the systems here react to them; buttons feed back only through the input
//! queue, exactly like a key press.

use std::time::Duration;

use bevy::prelude::*;

pub mod controls;
pub mod hud;
pub mod panels;

use crate::drive::DriveSet;
use panels::ActiveContent;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UiConfig>()
            .init_resource::<ActiveContent>()
            .add_systems(Startup, setup_ui)
            .add_systems(
                Update,
                (panels::handle_buttons, controls::handle_steer_zones).in_set(DriveSet::Input),
            )
            .add_systems(Update, panels::close_modal_on_escape)
            .add_systems(
                Update,
                (
                    panels::update_start_screen,
                    panels::update_content_panel,
                    hud::update_hud,
                    panels::run_typewriter,
                    panels::refresh_button_visuals,
                )
                    .after(DriveSet::Simulate),
            );
    }
}

#[derive(Resource, Clone, Debug)]
pub struct UiConfig {
    /// Delay between characters of a revealed title.
    pub typewriter_interval: Duration,
    /// Multiplier from progress speed to the displayed number.
    pub hud_speed_scale: f32,
    /// Displayed speeds above this turn the readout red.
    pub hud_warning_threshold: u32,
    /// Base URL that relative links are resolved against.
    pub site_origin: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            typewriter_interval: Duration::from_millis(45),
            hud_speed_scale: 1200.0,
            hud_warning_threshold: 150,
            site_origin: "http://localhost:8000".to_string(),
        }
    }
}

const PANEL: Color = Color::srgba(0.01, 0.02, 0.05, 0.92);
const BORDER: Color = Color::srgb(0.0, 0.8, 0.9);
const PRIMARY_TEXT: Color = Color::srgb(0.85, 0.95, 1.0);
const ACCENT_TEXT: Color = Color::srgb(0.0, 1.0, 1.0);
const MUTED_TEXT: Color = Color::srgb(0.55, 0.7, 0.8);
const BUTTON_IDLE: Color = Color::srgba(0.02, 0.05, 0.08, 0.98);
const BUTTON_HOVER: Color = Color::srgba(0.05, 0.12, 0.16, 0.98);
const HUD_TEXT: Color = Color::srgb(0.0, 1.0, 1.0);
/// #ff0055
const HUD_WARNING: Color = Color::srgb(1.0, 0.0, 0.333);

fn setup_ui(mut commands: Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|root| {
            hud::spawn_hud(root);
            controls::spawn_steer_zones(root);
            panels::spawn_content_panel(root);
            panels::spawn_contact_modal(root);
            panels::spawn_start_screen(root);
        });
}
