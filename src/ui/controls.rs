//! On-screen steering pads for touch screens.
//!
//! Only a press that lands on a pad steers. Taps anywhere else still start
//! or resume the journey through `Activate`, but never move the car.

use bevy::prelude::*;

use super::{BORDER, BUTTON_HOVER, PRIMARY_TEXT};
use crate::drive::input::{InputEvent, InputQueue, TouchZone};

const PAD_IDLE: Color = Color::srgba(0.0, 0.8, 0.9, 0.08);

/// A steering pad and whether it is currently held down.
#[derive(Component, Debug)]
pub struct SteerZone {
    pub zone: TouchZone,
    held: bool,
}

impl SteerZone {
    pub fn new(zone: TouchZone) -> Self {
        Self { zone, held: false }
    }

    /// Records the pad's new interaction. Returns the steering event for a
    /// press or a release, and nothing while hovering or already held.
    pub fn transition(&mut self, interaction: Interaction) -> Option<InputEvent> {
        let pressed = interaction == Interaction::Pressed;
        if pressed == self.held {
            return None;
        }
        self.held = pressed;
        Some(if pressed {
            InputEvent::TouchStart(self.zone)
        } else {
            InputEvent::TouchEnd(self.zone)
        })
    }
}

pub(super) fn spawn_steer_zones(parent: &mut ChildBuilder) {
    for (zone, label) in [(TouchZone::Left, "<"), (TouchZone::Right, ">")] {
        let mut node = Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(24.0),
            width: Val::Px(96.0),
            height: Val::Px(96.0),
            border: UiRect::all(Val::Px(1.5)),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        };
        match zone {
            TouchZone::Left => node.left = Val::Px(180.0),
            TouchZone::Right => node.right = Val::Px(24.0),
        }

        parent
            .spawn((
                Button,
                node,
                BackgroundColor(PAD_IDLE),
                BorderColor(BORDER),
                BorderRadius::all(Val::Px(48.0)),
                SteerZone::new(zone),
            ))
            .with_children(|pad| {
                pad.spawn((
                    Text::new(label),
                    TextFont {
                        font_size: 36.0,
                        ..default()
                    },
                    TextColor(PRIMARY_TEXT),
                ));
            });
    }
}

pub(super) fn handle_steer_zones(
    mut pads: Query<(&Interaction, &mut SteerZone, &mut BackgroundColor), Changed<Interaction>>,
    mut queue: ResMut<InputQueue>,
) {
    for (interaction, mut pad, mut background) in &mut pads {
        if let Some(event) = pad.transition(*interaction) {
            queue.push(event);
        }
        background.0 = if pad.held { BUTTON_HOVER } else { PAD_IDLE };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release_steer_once_each() {
        let mut pad = SteerZone::new(TouchZone::Right);
        assert_eq!(pad.transition(Interaction::Hovered), None);
        assert_eq!(
            pad.transition(Interaction::Pressed),
            Some(InputEvent::TouchStart(TouchZone::Right))
        );
        assert_eq!(pad.transition(Interaction::Pressed), None);
        assert_eq!(
            pad.transition(Interaction::Hovered),
            Some(InputEvent::TouchEnd(TouchZone::Right))
        );
        assert_eq!(pad.transition(Interaction::None), None);
    }

    #[test]
    fn sliding_off_a_pad_releases_it() {
        let mut pad = SteerZone::new(TouchZone::Left);
        pad.transition(Interaction::Pressed);
        assert_eq!(
            pad.transition(Interaction::None),
            Some(InputEvent::TouchEnd(TouchZone::Left))
        );
    }
}
