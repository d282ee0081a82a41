//! Drive mode state machine.
//!
//! ```text
//! Start --begin--> Driving --waypoint--> Stopped --resume--> Driving ...
//! ```
//!
//! Transitions notify the UI boundary and never wait on it.

use bevy::prelude::*;

use super::boundary::UiBoundary;
use super::input::JourneyRequest;
use super::vehicle::VehicleBody;
use crate::route::waypoints::Waypoint;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Waiting for the journey to begin; the camera orbits the car.
    #[default]
    Start,
    /// Moving along the route.
    Driving,
    /// Paused at a waypoint with its content on screen.
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: Mode,
    pub to: Mode,
}

#[derive(Clone, Debug, Default)]
pub struct ModeMachine {
    mode: Mode,
    /// Name of the waypoint the car is stopped at.
    stopped_at: Option<String>,
}

impl ModeMachine {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Name of the waypoint whose content is showing.
    pub fn stopped_at(&self) -> Option<&str> {
        self.stopped_at.as_deref()
    }

    /// Applies a journey request from input. Requests that do not match the
    /// current mode are dropped.
    pub fn request(
        &mut self,
        request: JourneyRequest,
        vehicle: &mut impl VehicleBody,
        ui: &mut impl UiBoundary,
    ) -> Option<Transition> {
        match (self.mode, request) {
            (Mode::Start, JourneyRequest::Begin) => {
                if let Some(lights) = vehicle.illumination() {
                    lights.ignite();
                }
                ui.hide_start_screen();
                info!("Journey started");
                Some(self.enter(Mode::Driving))
            }
            (Mode::Stopped, JourneyRequest::Resume) => {
                ui.hide_content();
                info!(
                    "Journey resumed from {}",
                    self.stopped_at.as_deref().unwrap_or("waypoint")
                );
                self.stopped_at = None;
                Some(self.enter(Mode::Driving))
            }
            _ => None,
        }
    }

    /// Stops at a freshly fired waypoint. Only valid while driving.
    pub fn arrive(&mut self, waypoint: &Waypoint, ui: &mut impl UiBoundary) -> Option<Transition> {
        if self.mode != Mode::Driving {
            return None;
        }
        ui.show_content(waypoint);
        info!("Stopped at {}", waypoint.display_name);
        self.stopped_at = Some(waypoint.display_name.clone());
        Some(self.enter(Mode::Stopped))
    }

    fn enter(&mut self, to: Mode) -> Transition {
        let from = self.mode;
        self.mode = to;
        Transition { from, to }
    }
}
