//! Start screen, waypoint content panel and contact modal.

use std::time::Duration;

use bevy::prelude::*;

use super::{UiConfig, ACCENT_TEXT, BORDER, BUTTON_HOVER, BUTTON_IDLE, MUTED_TEXT, PANEL, PRIMARY_TEXT};
use crate::drive::boundary::UiCommand;
use crate::drive::input::{InputEvent, InputQueue};
use crate::route::waypoints::{LinkTarget, Waypoint, WaypointKind};

#[derive(Component)]
pub struct StartScreen;

#[derive(Component)]
pub struct StartStatus;

/// Holds the start button until the car is ready.
#[derive(Component)]
pub struct StartSlot;

#[derive(Component)]
pub struct ContentPanel;

#[derive(Component)]
pub struct ContentTitle;

#[derive(Component)]
pub struct ContentDescription;

#[derive(Component)]
pub struct HeroPhoto;

#[derive(Component)]
pub struct LinkButton;

#[derive(Component)]
pub struct LinkLabel;

#[derive(Component)]
pub struct ContactModal;

/// What a button does when pressed.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiAction {
    StartDrive,
    Continue,
    FollowLink,
    CloseModal,
}

/// Reveals a title one character at a time.
#[derive(Debug)]
pub struct Typewriter {
    text: String,
    shown: usize,
    timer: Timer,
}

impl Typewriter {
    pub fn new(interval: Duration) -> Self {
        Self {
            text: String::new(),
            shown: 0,
            timer: Timer::new(interval, TimerMode::Repeating),
        }
    }

    pub fn start(&mut self, text: &str) {
        self.text = text.to_string();
        self.shown = 0;
        self.timer.reset();
    }

    pub fn finished(&self) -> bool {
        self.shown >= self.text.chars().count()
    }

    /// Advances the reveal. Returns true when more text became visible.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if self.finished() {
            return false;
        }
        self.timer.tick(delta);
        let steps = self.timer.times_finished_this_tick() as usize;
        if steps == 0 {
            return false;
        }
        self.shown = (self.shown + steps).min(self.text.chars().count());
        true
    }

    pub fn visible(&self) -> &str {
        match self.text.char_indices().nth(self.shown) {
            Some((end, _)) => &self.text[..end],
            None => &self.text,
        }
    }
}

/// Waypoint whose content is on screen.
#[derive(Resource)]
pub struct ActiveContent {
    pub waypoint: Option<Waypoint>,
    pub title: Typewriter,
}

impl FromWorld for ActiveContent {
    fn from_world(world: &mut World) -> Self {
        let interval = world
            .get_resource::<UiConfig>()
            .map_or(Duration::from_millis(45), |config| config.typewriter_interval);
        Self {
            waypoint: None,
            title: Typewriter::new(interval),
        }
    }
}

/// Absolute http(s) URLs are kept; anything else is joined to `origin`.
pub fn resolve_link(target: &str, origin: &str) -> String {
    if target.starts_with("http://") || target.starts_with("https://") {
        return target.to_string();
    }
    format!(
        "{}/{}",
        origin.trim_end_matches('/'),
        target.trim_start_matches('/')
    )
}

fn overlay_node(display: Display) -> Node {
    Node {
        width: Val::Percent(100.0),
        height: Val::Percent(100.0),
        position_type: PositionType::Absolute,
        justify_content: JustifyContent::Center,
        align_items: AlignItems::Center,
        display,
        ..default()
    }
}

fn spawn_button(parent: &mut ChildBuilder, label: &str, action: UiAction) {
    parent
        .spawn((
            Button,
            Node {
                padding: UiRect::axes(Val::Px(18.0), Val::Px(10.0)),
                border: UiRect::all(Val::Px(1.5)),
                justify_content: JustifyContent::Center,
                ..default()
            },
            BackgroundColor(BUTTON_IDLE),
            BorderColor(BORDER),
            action,
        ))
        .with_children(|button| {
            button.spawn((
                Text::new(label),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(PRIMARY_TEXT),
            ));
        });
}

fn panel_node() -> Node {
    Node {
        width: Val::Px(560.0),
        padding: UiRect::all(Val::Px(20.0)),
        border: UiRect::all(Val::Px(1.5)),
        row_gap: Val::Px(14.0),
        flex_direction: FlexDirection::Column,
        ..default()
    }
}

pub(super) fn spawn_start_screen(parent: &mut ChildBuilder) {
    parent
        .spawn((
            overlay_node(Display::Flex),
            BackgroundColor(Color::srgba(0.0, 0.0, 0.02, 0.6)),
            StartScreen,
        ))
        .with_children(|root| {
            root.spawn((panel_node(), BackgroundColor(PANEL), BorderColor(BORDER)))
                .with_children(|panel| {
                    panel.spawn((
                        Text::new("NIGHT DRIVE // PORTFOLIO"),
                        TextFont {
                            font_size: 26.0,
                            ..default()
                        },
                        TextColor(ACCENT_TEXT),
                    ));
                    panel.spawn((
                        Text::new("LOADING..."),
                        TextFont {
                            font_size: 14.0,
                            ..default()
                        },
                        TextColor(MUTED_TEXT),
                        StartStatus,
                    ));
                    panel
                        .spawn((
                            Node {
                                display: Display::None,
                                ..default()
                            },
                            StartSlot,
                        ))
                        .with_children(|slot| spawn_button(slot, "START DRIVE", UiAction::StartDrive));
                });
        });
}

pub(super) fn spawn_content_panel(parent: &mut ChildBuilder) {
    parent
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                right: Val::Px(32.0),
                top: Val::Px(32.0),
                display: Display::None,
                ..panel_node()
            },
            BackgroundColor(PANEL),
            BorderColor(BORDER),
            ContentPanel,
        ))
        .with_children(|panel| {
            panel.spawn((
                Node {
                    width: Val::Px(96.0),
                    height: Val::Px(96.0),
                    border: UiRect::all(Val::Px(1.5)),
                    display: Display::None,
                    ..default()
                },
                BackgroundColor(Color::srgb(0.1, 0.12, 0.2)),
                BorderColor(ACCENT_TEXT),
                HeroPhoto,
            ));
            panel.spawn((
                Text::new(""),
                TextFont {
                    font_size: 28.0,
                    ..default()
                },
                TextColor(ACCENT_TEXT),
                ContentTitle,
            ));
            panel.spawn((
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(MUTED_TEXT),
                ContentDescription,
            ));
            panel
                .spawn(Node {
                    flex_direction: FlexDirection::Row,
                    column_gap: Val::Px(12.0),
                    ..default()
                })
                .with_children(|actions| {
                    actions
                        .spawn((
                            Button,
                            Node {
                                padding: UiRect::axes(Val::Px(18.0), Val::Px(10.0)),
                                border: UiRect::all(Val::Px(1.5)),
                                display: Display::None,
                                ..default()
                            },
                            BackgroundColor(BUTTON_IDLE),
                            BorderColor(ACCENT_TEXT),
                            UiAction::FollowLink,
                            LinkButton,
                        ))
                        .with_children(|button| {
                            button.spawn((
                                Text::new(""),
                                TextFont {
                                    font_size: 18.0,
                                    ..default()
                                },
                                TextColor(PRIMARY_TEXT),
                                LinkLabel,
                            ));
                        });
                    spawn_button(actions, "CONTINUE", UiAction::Continue);
                });
        });
}

pub(super) fn spawn_contact_modal(parent: &mut ChildBuilder) {
    parent
        .spawn((
            overlay_node(Display::None),
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.8)),
            ContactModal,
        ))
        .with_children(|root| {
            root.spawn((panel_node(), BackgroundColor(PANEL), BorderColor(ACCENT_TEXT)))
                .with_children(|panel| {
                    panel.spawn((
                        Text::new("GET IN TOUCH"),
                        TextFont {
                            font_size: 22.0,
                            ..default()
                        },
                        TextColor(ACCENT_TEXT),
                    ));
                    panel.spawn((
                        Text::new("Send a line about your project and I'll get back to you."),
                        TextFont {
                            font_size: 16.0,
                            ..default()
                        },
                        TextColor(MUTED_TEXT),
                    ));
                    spawn_button(panel, "CLOSE", UiAction::CloseModal);
                });
        });
}

/// Shows the start button once assets are in, or the reason they are not.
pub(super) fn update_start_screen(
    mut commands: EventReader<UiCommand>,
    mut screens: Query<&mut Node, With<StartScreen>>,
    mut slots: Query<&mut Node, (With<StartSlot>, Without<StartScreen>)>,
    mut status: Query<&mut Text, With<StartStatus>>,
) {
    for command in commands.read() {
        match command {
            UiCommand::Ready => {
                for mut slot in &mut slots {
                    slot.display = Display::Flex;
                }
                for mut text in &mut status {
                    **text = "READY".to_string();
                }
            }
            UiCommand::LoadFailed(reason) => {
                for mut text in &mut status {
                    **text = format!("FAILED TO LOAD: {}", reason);
                }
            }
            UiCommand::HideStartScreen => {
                for mut node in &mut screens {
                    node.display = Display::None;
                }
            }
            _ => {}
        }
    }
}

pub(super) fn update_content_panel(
    mut commands: EventReader<UiCommand>,
    mut active: ResMut<ActiveContent>,
    mut panels: Query<&mut Node, With<ContentPanel>>,
    mut photos: Query<&mut Node, (With<HeroPhoto>, Without<ContentPanel>)>,
    mut links: Query<&mut Node, (With<LinkButton>, Without<ContentPanel>, Without<HeroPhoto>)>,
    mut modals: Query<
        &mut Node,
        (With<ContactModal>, Without<ContentPanel>, Without<HeroPhoto>, Without<LinkButton>),
    >,
    mut descriptions: Query<&mut Text, With<ContentDescription>>,
    mut labels: Query<&mut Text, (With<LinkLabel>, Without<ContentDescription>)>,
    mut titles: Query<
        &mut Text,
        (With<ContentTitle>, Without<ContentDescription>, Without<LinkLabel>),
    >,
) {
    for command in commands.read() {
        match command {
            UiCommand::ShowContent(waypoint) => {
                active.title.start(&waypoint.display_name);
                active.waypoint = Some(waypoint.clone());
                for mut text in &mut titles {
                    text.clear();
                }

                for mut node in &mut panels {
                    node.display = Display::Flex;
                }
                for mut node in &mut photos {
                    node.display = if waypoint.kind == WaypointKind::Hero {
                        Display::Flex
                    } else {
                        Display::None
                    };
                }
                for mut text in &mut descriptions {
                    **text = waypoint.description.clone();
                }
                for mut node in &mut links {
                    node.display = if waypoint.link.is_some() {
                        Display::Flex
                    } else {
                        Display::None
                    };
                }
                if let Some(link) = &waypoint.link {
                    for mut text in &mut labels {
                        **text = link.label.clone();
                    }
                }
            }
            UiCommand::HideContent => {
                active.waypoint = None;
                for mut node in panels.iter_mut().chain(modals.iter_mut()) {
                    node.display = Display::None;
                }
            }
            _ => {}
        }
    }
}

pub(super) fn run_typewriter(
    time: Res<Time>,
    mut active: ResMut<ActiveContent>,
    mut titles: Query<&mut Text, With<ContentTitle>>,
) {
    if !active.title.tick(time.delta()) {
        return;
    }
    for mut text in &mut titles {
        **text = active.title.visible().to_string();
    }
}

pub(super) fn handle_buttons(
    buttons: Query<(&Interaction, &UiAction), Changed<Interaction>>,
    active: Res<ActiveContent>,
    config: Res<UiConfig>,
    mut queue: ResMut<InputQueue>,
    mut modals: Query<&mut Node, With<ContactModal>>,
) {
    for (interaction, action) in &buttons {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match action {
            UiAction::StartDrive | UiAction::Continue => queue.push(InputEvent::Activate),
            UiAction::FollowLink => {
                let Some(link) = active.waypoint.as_ref().and_then(|w| w.link.as_ref()) else {
                    continue;
                };
                match &link.target {
                    LinkTarget::Url(url) => {
                        let resolved = resolve_link(url, &config.site_origin);
                        info!("Opening {}", resolved);
                        if let Err(err) = open::that(&resolved) {
                            warn!("Could not open {}: {}", resolved, err);
                        }
                    }
                    LinkTarget::ContactForm => {
                        for mut node in &mut modals {
                            node.display = Display::Flex;
                        }
                    }
                }
            }
            UiAction::CloseModal => {
                for mut node in &mut modals {
                    node.display = Display::None;
                }
            }
        }
    }
}

pub(super) fn close_modal_on_escape(
    keys: Res<ButtonInput<KeyCode>>,
    mut modals: Query<&mut Node, With<ContactModal>>,
) {
    if !keys.just_pressed(KeyCode::Escape) {
        return;
    }
    for mut node in &mut modals {
        node.display = Display::None;
    }
}

pub(super) fn refresh_button_visuals(
    mut buttons: Query<(&Interaction, &mut BackgroundColor), (Changed<Interaction>, With<UiAction>)>,
) {
    for (interaction, mut background) in &mut buttons {
        background.0 = match interaction {
            Interaction::Hovered | Interaction::Pressed => BUTTON_HOVER,
            Interaction::None => BUTTON_IDLE,
        };
    }
}
