//! Speedometer and section readout.

use bevy::prelude::*;

use super::{UiConfig, HUD_TEXT, HUD_WARNING};
use crate::drive::boundary::UiCommand;
use crate::route::waypoints::Waypoint;

#[derive(Component)]
pub struct HudRoot;

#[derive(Component)]
pub struct SpeedReadout;

#[derive(Component)]
pub struct SectionLabel;

/// Displayed speed for a raw progress speed.
pub fn speed_value(speed: f32, scale: f32) -> u32 {
    (speed * scale).floor().max(0.0) as u32
}

/// Zero-padded to three digits.
pub fn format_speed(value: u32) -> String {
    format!("{:03}", value)
}

pub fn is_speeding(value: u32, threshold: u32) -> bool {
    value > threshold
}

/// Readout for the section the car last stopped at.
pub fn section_label(waypoint: &Waypoint) -> String {
    format!(" {}", waypoint.slug())
}

pub(super) fn spawn_hud(parent: &mut ChildBuilder) {
    parent
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(24.0),
                bottom: Val::Px(24.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(4.0),
                display: Display::None,
                ..default()
            },
            HudRoot,
        ))
        .with_children(|hud| {
            hud.spawn((
                Text::new("000"),
                TextFont {
                    font_size: 48.0,
                    ..default()
                },
                TextColor(HUD_TEXT),
                SpeedReadout,
            ));
            hud.spawn((
                Text::new(""),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(HUD_TEXT),
                SectionLabel,
            ));
        });
}

pub(super) fn update_hud(
    mut commands: EventReader<UiCommand>,
    config: Res<UiConfig>,
    mut roots: Query<&mut Node, With<HudRoot>>,
    mut speed: Query<(&mut Text, &mut TextColor), With<SpeedReadout>>,
    mut section: Query<&mut Text, (With<SectionLabel>, Without<SpeedReadout>)>,
) {
    for command in commands.read() {
        match command {
            UiCommand::HideStartScreen => {
                for mut node in &mut roots {
                    node.display = Display::Flex;
                }
            }
            UiCommand::ShowContent(waypoint) => {
                for mut text in &mut section {
                    **text = section_label(waypoint);
                }
            }
            UiCommand::UpdateHud { speed: raw } => {
                let value = speed_value(*raw, config.hud_speed_scale);
                for (mut text, mut color) in &mut speed {
                    **text = format_speed(value);
                    color.0 = if is_speeding(value, config.hud_warning_threshold) {
                        HUD_WARNING
                    } else {
                        HUD_TEXT
                    };
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::waypoints::{WaypointEntry, WaypointKind};

    #[test]
    fn speed_is_floored_and_padded() {
        assert_eq!(speed_value(0.0, 1200.0), 0);
        assert_eq!(speed_value(0.0049, 1200.0), 5);
        assert_eq!(format_speed(5), "005");
        assert_eq!(format_speed(60), "060");
        assert_eq!(format_speed(speed_value(0.05, 1200.0)), "060");
    }

    #[test]
    fn section_label_is_the_padded_slug() {
        let waypoint = Waypoint::from_entry(&WaypointEntry {
            trigger: 0.35,
            name: Some("ABOUT ME"),
            description: None,
            kind: WaypointKind::Experience,
            link: None,
        });
        assert_eq!(section_label(&waypoint), " about-me");
    }

    #[test]
    fn warning_only_above_threshold() {
        assert!(!is_speeding(150, 150));
        assert!(is_speeding(151, 150));
    }
}
