// src/ui/icon_overlay/systems.rs
//
// Systems mirroring the layer manager's icon registry as UI nodes.

use bevy::prelude::*;

use super::components::{IconOverlay, IconOverlayRoot, IconOverlaySettings, IconOverlayTracker};
use crate::{
    camera::MapCamera,
    layers::{IconSet, LayerManager},
    picking::PickRequest,
};

// Visual constants
const LABEL_BACKGROUND: Color = Color::srgba(0.1, 0.1, 0.1, 0.75);
const LABEL_COLOR: Color = Color::WHITE;
const CHIP_TEXT_COLOR: Color = Color::srgb(0.1, 0.1, 0.1);
const PADDING_PX: f32 = 4.0;

/// Extensions the asset server can decode; other icons fall back to a coloured chip.
const RASTER_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".jpeg"];

pub fn setup_icon_overlay_root(mut commands: Commands) {
    let root = commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                ..default()
            },
            BackgroundColor(Color::NONE),
            ZIndex(100),
        ))
        .id();

    commands.insert_resource(IconOverlayRoot(root));
    info!(target: "ui", "Icon overlay root created");
}

/// Rebuild overlays whenever the icon registry changed.
pub fn sync_icon_overlays(
    mut commands: Commands,
    layers: Res<LayerManager>,
    settings: Res<IconOverlaySettings>,
    root: Res<IconOverlayRoot>,
    asset_server: Res<AssetServer>,
    mut tracker: ResMut<IconOverlayTracker>,
) {
    if !layers.is_changed() {
        return;
    }
    for (_, overlay) in tracker.by_key.drain() {
        commands.entity(overlay).despawn();
    }
    for set in layers.icons().sets() {
        let overlay = spawn_overlay(&mut commands, &settings, &asset_server, set);
        commands.entity(root.0).add_child(overlay);
        tracker.by_key.insert(set.key.clone(), overlay);
    }
    debug!(target: "ui", "{} icon overlays", tracker.by_key.len());
}

fn spawn_overlay(
    commands: &mut Commands,
    settings: &IconOverlaySettings,
    asset_server: &AssetServer,
    set: &IconSet,
) -> Entity {
    commands
        .spawn((
            Button,
            Node {
                position_type: PositionType::Absolute,
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                padding: UiRect::all(Val::Px(PADDING_PX)),
                display: Display::None, // positioned by the update system
                ..default()
            },
            BackgroundColor(if set.has_text() {
                LABEL_BACKGROUND
            } else {
                Color::NONE
            }),
            ZIndex(101),
            IconOverlay::new(&set.key, set.position),
        ))
        .with_children(|parent| {
            if let Some(label) = &set.label {
                parent.spawn((
                    Text::new(label.clone()),
                    TextFont {
                        font_size: settings.label_font_size,
                        ..default()
                    },
                    TextColor(LABEL_COLOR),
                ));
            }
            if set.icons.is_empty() {
                return;
            }
            parent
                .spawn(Node {
                    flex_direction: FlexDirection::Row,
                    column_gap: Val::Px(2.0),
                    ..default()
                })
                .with_children(|row| {
                    for (code, icon) in &set.icons {
                        let size = Node {
                            width: Val::Px(settings.icon_size),
                            height: Val::Px(settings.icon_size),
                            justify_content: JustifyContent::Center,
                            align_items: AlignItems::Center,
                            ..default()
                        };
                        if is_raster(&icon.path) {
                            row.spawn((
                                ImageNode::new(asset_server.load(icon.path.clone()))
                                    .with_color(icon.color.to_color()),
                                size,
                            ));
                        } else {
                            row.spawn((size, BackgroundColor(icon.color.to_color())))
                                .with_children(|chip| {
                                    chip.spawn((
                                        Text::new(chip_label(code)),
                                        TextFont {
                                            font_size: settings.chip_font_size,
                                            ..default()
                                        },
                                        TextColor(CHIP_TEXT_COLOR),
                                    ));
                                });
                        }
                    }
                });
        })
        .id()
}

fn is_raster(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    RASTER_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Last segment of a layer code, e.g. `Fo-Co` → `Co`.
fn chip_label(code: &str) -> &str {
    code.rsplit('-').next().unwrap_or(code)
}

/// Keep overlays over their anchors; hide those behind the camera.
pub fn position_icon_overlays(
    camera_query: Query<(&Camera, &GlobalTransform), With<MapCamera>>,
    mut overlays: Query<(&IconOverlay, &mut Node)>,
) {
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    for (overlay, mut style) in overlays.iter_mut() {
        let Ok(viewport_position) = camera.world_to_viewport(camera_transform, overlay.anchor())
        else {
            style.display = Display::None;
            continue;
        };
        style.display = Display::Flex;
        style.left = Val::Px(viewport_position.x);
        style.top = Val::Px(viewport_position.y);
    }
}

/// Clicking an overlay picks the object it belongs to.
pub fn icon_overlay_clicks(
    overlays: Query<(&Interaction, &IconOverlay), Changed<Interaction>>,
    mut requests: MessageWriter<PickRequest>,
) {
    for (interaction, overlay) in &overlays {
        if *interaction == Interaction::Pressed {
            requests.write(PickRequest::Key(overlay.key().to_string()));
        }
    }
}
