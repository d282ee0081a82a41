//! One-way notifications from the drive core to the UI.
//!
//! The core never reads UI state back; every call is fire-and-forget.

use bevy::prelude::*;

use crate::route::waypoints::Waypoint;

pub trait UiBoundary {
    fn show_content(&mut self, waypoint: &Waypoint);
    fn hide_content(&mut self);
    fn hide_start_screen(&mut self);
    fn update_hud(&mut self, speed: f32);
}

/// Notification as delivered to the Bevy UI systems.
#[derive(Event, Clone, Debug, PartialEq)]
pub enum UiCommand {
    /// Assets are in, the start button can be offered.
    Ready,
    /// Assets failed to load; the drive will not start.
    LoadFailed(String),
    HideStartScreen,
    ShowContent(Waypoint),
    HideContent,
    UpdateHud { speed: f32 },
}

/// Collects notifications raised during one frame, in order.
#[derive(Default, Debug)]
pub struct UiOutbox {
    commands: Vec<UiCommand>,
}

impl UiOutbox {
    pub fn commands(&self) -> &[UiCommand] {
        &self.commands
    }

    pub fn take(&mut self) -> Vec<UiCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl UiBoundary for UiOutbox {
    fn show_content(&mut self, waypoint: &Waypoint) {
        self.commands.push(UiCommand::ShowContent(waypoint.clone()));
    }

    fn hide_content(&mut self) {
        self.commands.push(UiCommand::HideContent);
    }

    fn hide_start_screen(&mut self) {
        self.commands.push(UiCommand::HideStartScreen);
    }

    fn update_hud(&mut self, speed: f32) {
        self.commands.push(UiCommand::UpdateHud { speed });
    }
}
