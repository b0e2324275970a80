// src/ui/info_panel/systems.rs
//
// Systems rebuilding the info panel when the pick changes and handling its buttons.

use bevy::prelude::*;

use super::components::{InfoPanel, InfoPanelAction, InfoPanelSettings, InfoPanelTracker};
use crate::{
    building_view::BuildingViewRequest,
    picking::{InfoContent, InfoPane, PickRequest},
};

// Visual constants
const BACKGROUND_COLOR: Color = Color::srgba(0.1, 0.1, 0.1, 0.9);
const BORDER_COLOR: Color = Color::srgb(0.3, 0.3, 0.3);
const TEXT_COLOR: Color = Color::WHITE;
const TITLE_COLOR: Color = Color::srgb(1.0, 0.92, 0.0);
const MUTED_COLOR: Color = Color::srgb(0.65, 0.65, 0.65);
const BUTTON_COLOR: Color = Color::srgb(0.22, 0.22, 0.22);
const BUTTON_HOVER_COLOR: Color = Color::srgb(0.32, 0.32, 0.32);

/// Despawn the old panel and build one for the current pick, if any.
pub fn refresh_info_panel(
    mut commands: Commands,
    pane: Res<InfoPane>,
    settings: Res<InfoPanelSettings>,
    mut tracker: ResMut<InfoPanelTracker>,
    panels: Query<&InfoPanel>,
) {
    if !pane.is_changed() {
        return;
    }
    let shown = tracker
        .active_panel
        .and_then(|panel| panels.get(panel).ok())
        .map(InfoPanel::key);
    if shown.is_some() && shown == pane.content().map(|content| content.key.as_str()) {
        return;
    }
    if let Some(old_panel) = tracker.active_panel.take() {
        commands.entity(old_panel).despawn();
    }
    let Some(content) = pane.content() else {
        return;
    };

    debug!(target: "ui", "Info panel for {}", content.key);
    let panel = spawn_panel(&mut commands, &settings, content);
    tracker.active_panel = Some(panel);
}

fn spawn_panel(commands: &mut Commands, settings: &InfoPanelSettings, content: &InfoContent) -> Entity {
    let text_font = TextFont {
        font_size: settings.text_font_size,
        ..default()
    };

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(settings.bottom_offset),
                right: Val::Px(settings.right_offset),
                width: Val::Px(settings.panel_width),
                max_height: Val::Px(settings.panel_max_height),
                padding: UiRect::all(Val::Px(settings.padding)),
                border: UiRect::all(Val::Px(settings.border_width)),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(4.0),
                overflow: Overflow::clip_y(),
                ..default()
            },
            BackgroundColor(BACKGROUND_COLOR),
            BorderColor::from(BORDER_COLOR),
            InfoPanel::new(&content.key),
        ))
        .with_children(|parent| {
            // Header row (title + close)
            parent
                .spawn(Node {
                    flex_direction: FlexDirection::Row,
                    justify_content: JustifyContent::SpaceBetween,
                    align_items: AlignItems::Center,
                    margin: UiRect::bottom(Val::Px(6.0)),
                    ..default()
                })
                .with_children(|header| {
                    header.spawn((
                        Text::new(content.title.clone()),
                        TextFont {
                            font_size: settings.title_font_size,
                            ..default()
                        },
                        TextColor(TITLE_COLOR),
                    ));
                    spawn_button(header, "x", InfoPanelAction::Close, &text_font);
                });

            parent.spawn((
                Text::new(format!("{} · {}", content.kind, content.key)),
                text_font.clone(),
                TextColor(MUTED_COLOR),
            ));

            for (name, value) in &content.attributes {
                parent.spawn((
                    Text::new(format!("{name}: {value}")),
                    text_font.clone(),
                    TextColor(TEXT_COLOR),
                    Node {
                        max_width: Val::Px(settings.panel_width - settings.padding * 2.0),
                        ..default()
                    },
                ));
            }

            if content.building_view_hint {
                spawn_button(
                    parent,
                    "Building view (B)",
                    InfoPanelAction::EnterBuildingView,
                    &text_font,
                );
            }
        })
        .id()
}

fn spawn_button(
    parent: &mut ChildSpawnerCommands,
    label: &str,
    action: InfoPanelAction,
    font: &TextFont,
) {
    parent
        .spawn((
            Button,
            Node {
                padding: UiRect::axes(Val::Px(8.0), Val::Px(4.0)),
                margin: UiRect::top(Val::Px(4.0)),
                justify_content: JustifyContent::Center,
                ..default()
            },
            BackgroundColor(BUTTON_COLOR),
            action,
        ))
        .with_children(|button| {
            button.spawn((Text::new(label), font.clone(), TextColor(TEXT_COLOR)));
        });
}

pub fn handle_info_panel_buttons(
    mut buttons: Query<
        (&Interaction, &InfoPanelAction, &mut BackgroundColor),
        Changed<Interaction>,
    >,
    mut view_requests: MessageWriter<BuildingViewRequest>,
    mut pick_requests: MessageWriter<PickRequest>,
) {
    for (interaction, action, mut background) in &mut buttons {
        match interaction {
            Interaction::Pressed => match action {
                InfoPanelAction::EnterBuildingView => {
                    view_requests.write(BuildingViewRequest::Enter);
                }
                InfoPanelAction::Close => {
                    pick_requests.write(PickRequest::Clear);
                }
            },
            Interaction::Hovered => background.0 = BUTTON_HOVER_COLOR,
            Interaction::None => background.0 = BUTTON_COLOR,
        }
    }
}
