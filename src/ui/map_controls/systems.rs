// src/ui/map_controls/systems.rs
//
// HUD, camera buttons, storey switcher and layer list.

use std::f32::consts::TAU;

use bevy::prelude::*;

use super::components::{
    ControlAction, LayerButton, LayerGroupCaret, LayerGroupItems, LayerGroupLabel, MapHud,
    StoreyButtons, StoreyLabel, StoreyPanel,
};
use crate::{
    building_view::{BuildingViewChanged, BuildingViewRequest, BuildingViewStatus},
    camera::CameraRig,
    layers::{GroupState, LayerManager, SetLayerGroup, ToggleLayer},
    picking::{PickChanged, PickRequest},
};

// Visual constants
const PANEL_COLOR: Color = Color::srgba(0.1, 0.1, 0.1, 0.85);
const TEXT_COLOR: Color = Color::WHITE;
const BUTTON_COLOR: Color = Color::srgb(0.22, 0.22, 0.22);
const BUTTON_HOVER_COLOR: Color = Color::srgb(0.32, 0.32, 0.32);
const LAYER_ACTIVE_COLOR: Color = Color::srgb(0.45, 0.37, 0.1);
const FONT_SIZE: f32 = 14.0;

const CARET_COLLAPSED: &str = "v";
const CARET_EXPANDED: &str = "^";

/// Checkbox text of a layer group.
pub fn group_checkbox_label(state: GroupState, name: &str) -> String {
    let mark = match state {
        GroupState::Off => "[ ]",
        GroupState::Partial => "[-]",
        GroupState::On => "[x]",
    };
    format!("{mark} {name}")
}

/// Clockwise compass bearing in degrees for a camera heading in radians.
pub fn compass_bearing(heading: f32) -> f32 {
    let bearing = (-heading).rem_euclid(TAU).to_degrees();
    if bearing >= 359.95 {
        0.0
    } else {
        bearing
    }
}

pub fn spawn_map_controls(mut commands: Commands, layers: Res<LayerManager>) {
    // Camera panel, top left
    commands
        .spawn((panel_node(Val::Px(12.0), Val::Px(12.0)), BackgroundColor(PANEL_COLOR)))
        .with_children(|panel| {
            panel.spawn((Text::new(""), font(), TextColor(TEXT_COLOR), MapHud));
            panel
                .spawn(Node {
                    flex_direction: FlexDirection::Row,
                    column_gap: Val::Px(4.0),
                    ..default()
                })
                .with_children(|row| {
                    spawn_button(row, "2D/3D", ControlAction::ToggleProjection);
                    spawn_button(row, "N", ControlAction::ResetNorth);
                    spawn_button(row, "Home", ControlAction::ResetView);
                    spawn_button(row, "+", ControlAction::ZoomIn);
                    spawn_button(row, "-", ControlAction::ZoomOut);
                });
        });

    // Storey switcher, below the camera panel
    commands
        .spawn((
            Node {
                display: Display::None,
                ..panel_node(Val::Px(12.0), Val::Px(96.0))
            },
            BackgroundColor(PANEL_COLOR),
            StoreyPanel,
        ))
        .with_children(|panel| {
            panel.spawn((Text::new(""), font(), TextColor(TEXT_COLOR), StoreyLabel));
            panel
                .spawn(Node {
                    flex_direction: FlexDirection::Row,
                    column_gap: Val::Px(4.0),
                    ..default()
                })
                .with_children(|row| {
                    spawn_button(row, "Up", ControlAction::StoreyUp);
                    spawn_button(row, "Down", ControlAction::StoreyDown);
                    spawn_button(row, "Exit", ControlAction::ExitBuildingView);
                });
            panel.spawn((
                Node {
                    flex_direction: FlexDirection::Row,
                    flex_wrap: FlexWrap::Wrap,
                    column_gap: Val::Px(4.0),
                    row_gap: Val::Px(4.0),
                    ..default()
                },
                StoreyButtons::default(),
            ));
        });

    // Layer list, top right
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(12.0),
                right: Val::Px(12.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(2.0),
                padding: UiRect::all(Val::Px(8.0)),
                ..default()
            },
            BackgroundColor(PANEL_COLOR),
        ))
        .with_children(|panel| {
            for group in layers.groups().groups() {
                let state = layers.group_state(&group.name).unwrap_or(GroupState::Off);
                panel
                    .spawn(Node {
                        flex_direction: FlexDirection::Row,
                        column_gap: Val::Px(4.0),
                        ..default()
                    })
                    .with_children(|header| {
                        header
                            .spawn((
                                Button,
                                button_node(),
                                BackgroundColor(BUTTON_COLOR),
                                ControlAction::ToggleLayerGroup(group.name.clone()),
                            ))
                            .with_children(|button| {
                                button.spawn((
                                    Text::new(group_checkbox_label(state, &group.name)),
                                    font(),
                                    TextColor(TEXT_COLOR),
                                    LayerGroupLabel {
                                        group: group.name.clone(),
                                    },
                                ));
                            });
                        header
                            .spawn((
                                Button,
                                button_node(),
                                BackgroundColor(BUTTON_COLOR),
                                ControlAction::CollapseLayerGroup(group.name.clone()),
                            ))
                            .with_children(|button| {
                                button.spawn((
                                    Text::new(CARET_COLLAPSED),
                                    font(),
                                    TextColor(TEXT_COLOR),
                                    LayerGroupCaret {
                                        group: group.name.clone(),
                                    },
                                ));
                            });
                    });

                // Groups start collapsed
                panel
                    .spawn((
                        Node {
                            display: Display::None,
                            flex_direction: FlexDirection::Column,
                            row_gap: Val::Px(2.0),
                            padding: UiRect::left(Val::Px(12.0)),
                            ..default()
                        },
                        LayerGroupItems {
                            group: group.name.clone(),
                        },
                    ))
                    .with_children(|items| {
                        for layer in group.codes.iter().filter_map(|code| layers.catalog().get(code)) {
                            items
                                .spawn((
                                    Button,
                                    button_node(),
                                    BackgroundColor(BUTTON_COLOR),
                                    ControlAction::ToggleLayer(layer.code.clone()),
                                    LayerButton {
                                        code: layer.code.clone(),
                                    },
                                ))
                                .with_children(|button| {
                                    button.spawn((
                                        Text::new(layer.name.clone()),
                                        font(),
                                        TextColor(TEXT_COLOR),
                                    ));
                                });
                        }
                    });
            }
        });
    info!(
        target: "ui",
        "Map controls spawned with {} layers in {} groups",
        layers.catalog().len(),
        layers.groups().len()
    );
}

fn panel_node(left: Val, top: Val) -> Node {
    Node {
        position_type: PositionType::Absolute,
        left,
        top,
        flex_direction: FlexDirection::Column,
        row_gap: Val::Px(6.0),
        padding: UiRect::all(Val::Px(8.0)),
        ..default()
    }
}

fn button_node() -> Node {
    Node {
        padding: UiRect::axes(Val::Px(8.0), Val::Px(4.0)),
        justify_content: JustifyContent::Center,
        ..default()
    }
}

fn font() -> TextFont {
    TextFont {
        font_size: FONT_SIZE,
        ..default()
    }
}

fn spawn_button(parent: &mut ChildSpawnerCommands, label: &str, action: ControlAction) {
    parent
        .spawn((Button, button_node(), BackgroundColor(BUTTON_COLOR), action))
        .with_children(|button| {
            button.spawn((Text::new(label), font(), TextColor(TEXT_COLOR)));
        });
}

pub fn handle_control_buttons(
    buttons: Query<(&Interaction, &ControlAction), Changed<Interaction>>,
    mut rig: ResMut<CameraRig>,
    layers: Res<LayerManager>,
    mut pick_requests: MessageWriter<PickRequest>,
    mut view_requests: MessageWriter<BuildingViewRequest>,
    mut toggles: MessageWriter<ToggleLayer>,
    mut group_switches: MessageWriter<SetLayerGroup>,
) {
    for (interaction, action) in &buttons {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match action {
            ControlAction::ToggleProjection => {
                pick_requests.write(PickRequest::ToggleProjection);
            }
            ControlAction::ResetNorth => {
                rig.reset_north();
            }
            ControlAction::ResetView => rig.reset_view(),
            ControlAction::ZoomIn => {
                if let Err(err) = rig.zoom_in() {
                    warn!(target: "camera", "{}", err);
                }
            }
            ControlAction::ZoomOut => {
                if let Err(err) = rig.zoom_out() {
                    warn!(target: "camera", "{}", err);
                }
            }
            ControlAction::StoreyUp => {
                view_requests.write(BuildingViewRequest::StoreyUp);
            }
            ControlAction::StoreyDown => {
                view_requests.write(BuildingViewRequest::StoreyDown);
            }
            ControlAction::ExitBuildingView => {
                view_requests.write(BuildingViewRequest::Exit);
            }
            ControlAction::SetStorey(code) => {
                view_requests.write(BuildingViewRequest::SetStorey(code.clone()));
            }
            ControlAction::ToggleLayer(code) => {
                toggles.write(ToggleLayer { code: code.clone() });
            }
            ControlAction::ToggleLayerGroup(group) => {
                let state = layers.group_state(group).unwrap_or(GroupState::Off);
                group_switches.write(SetLayerGroup {
                    group: group.clone(),
                    active: state != GroupState::On,
                });
            }
            // Handled by `toggle_layer_group_items`
            ControlAction::CollapseLayerGroup(_) => {}
        }
    }
}

pub fn toggle_layer_group_items(
    buttons: Query<(&Interaction, &ControlAction), Changed<Interaction>>,
    mut items: Query<(&LayerGroupItems, &mut Node)>,
    mut carets: Query<(&LayerGroupCaret, &mut Text)>,
) {
    for (interaction, action) in &buttons {
        let ControlAction::CollapseLayerGroup(group) = action else {
            continue;
        };
        if *interaction != Interaction::Pressed {
            continue;
        }
        let mut expanded = false;
        for (owner, mut node) in &mut items {
            if &owner.group == group {
                expanded = node.display == Display::None;
                node.display = if expanded { Display::Flex } else { Display::None };
            }
        }
        for (owner, mut text) in &mut carets {
            if &owner.group == group {
                let caret = if expanded { CARET_EXPANDED } else { CARET_COLLAPSED };
                text.0 = caret.to_string();
            }
        }
    }
}

/// Hover feedback for plain buttons; layer buttons are coloured by `update_layer_buttons`.
pub fn button_hover_feedback(
    mut buttons: Query<
        (&Interaction, &mut BackgroundColor),
        (Changed<Interaction>, With<ControlAction>, Without<LayerButton>),
    >,
) {
    for (interaction, mut background) in &mut buttons {
        background.0 = match interaction {
            Interaction::Hovered | Interaction::Pressed => BUTTON_HOVER_COLOR,
            Interaction::None => BUTTON_COLOR,
        };
    }
}

/// Mode, bearing and the current pick.
pub fn update_hud(
    rig: Res<CameraRig>,
    mut picks: MessageReader<PickChanged>,
    mut picked: Local<Option<String>>,
    mut hud: Query<&mut Text, With<MapHud>>,
) {
    let pick_changed = match picks.read().last() {
        Some(change) => {
            *picked = change.key.clone();
            true
        }
        None => false,
    };
    if !rig.is_changed() && !pick_changed {
        return;
    }
    let mut line = format!(
        "{} · {:>3.0}°",
        rig.active_mode().label(),
        compass_bearing(rig.heading())
    );
    if let Some(key) = picked.as_deref() {
        line.push_str(" · ");
        line.push_str(key);
    }
    for mut text in &mut hud {
        if text.0 != line {
            text.0 = line.clone();
        }
    }
}

pub fn update_storey_panel(
    mut commands: Commands,
    mut changes: MessageReader<BuildingViewChanged>,
    mut panels: Query<&mut Node, With<StoreyPanel>>,
    mut labels: Query<&mut Text, With<StoreyLabel>>,
    mut rows: Query<(Entity, &mut StoreyButtons)>,
) {
    let Some(change) = changes.read().last() else {
        return;
    };
    let active = change.status == BuildingViewStatus::Activated;
    for mut node in &mut panels {
        node.display = if active { Display::Flex } else { Display::None };
    }
    let label = match (&change.building, &change.storey) {
        (Some(building), Some(storey)) => format!("{building} · storey {storey}"),
        _ => String::new(),
    };
    for mut text in &mut labels {
        text.0 = label.clone();
    }

    for (row, mut buttons) in &mut rows {
        if buttons.storeys == change.storeys {
            continue;
        }
        for old in buttons.spawned.drain(..) {
            commands.entity(old).despawn();
        }
        commands.entity(row).with_children(|row| {
            for code in &change.storeys {
                let id = row
                    .spawn((
                        Button,
                        button_node(),
                        BackgroundColor(BUTTON_COLOR),
                        ControlAction::SetStorey(code.clone()),
                    ))
                    .with_children(|button| {
                        button.spawn((Text::new(code.clone()), font(), TextColor(TEXT_COLOR)));
                    })
                    .id();
                buttons.spawned.push(id);
            }
        });
        buttons.storeys = change.storeys.clone();
    }
}

pub fn update_layer_buttons(
    layers: Res<LayerManager>,
    mut buttons: Query<(&LayerButton, &Interaction, &mut BackgroundColor)>,
    mut group_labels: Query<(&LayerGroupLabel, &mut Text)>,
) {
    if layers.is_changed() {
        for (label, mut text) in &mut group_labels {
            let state = layers.group_state(&label.group).unwrap_or(GroupState::Off);
            let line = group_checkbox_label(state, &label.group);
            if text.0 != line {
                text.0 = line;
            }
        }
    }
    for (button, interaction, mut background) in &mut buttons {
        let color = if layers.is_active(&button.code) {
            LAYER_ACTIVE_COLOR
        } else if *interaction == Interaction::Hovered {
            BUTTON_HOVER_COLOR
        } else {
            BUTTON_COLOR
        };
        if background.0 != color {
            background.0 = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn group_checkbox_shows_partial_state() {
        assert_eq!(group_checkbox_label(GroupState::Off, "Food"), "[ ] Food");
        assert_eq!(group_checkbox_label(GroupState::Partial, "Food"), "[-] Food");
        assert_eq!(group_checkbox_label(GroupState::On, "Food"), "[x] Food");
    }

    #[test]
    fn bearing_is_clockwise_from_north() {
        assert_eq!(compass_bearing(0.0), 0.0);
        // Camera east of its target looks west.
        assert!((compass_bearing(FRAC_PI_2) - 270.0).abs() < 1e-3);
        assert!((compass_bearing(-FRAC_PI_2) - 90.0).abs() < 1e-3);
        assert!((compass_bearing(PI) - 180.0).abs() < 1e-3);
    }
}
