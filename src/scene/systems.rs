//! Systems that spawn the campus scene and prepare it for navigation.
use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;

use super::{
    components::{CampusSceneRoot, ScenePrepared, SceneStatus},
    styling::{apply_base_colors, apply_geometry_colors, buildings_present},
    world::{SceneNameIndex, WorldScene},
};
use crate::{core::MapSettings, dataset::CityDataset, layers::LayerManager};

/// Spawns the sun and the campus glTF, rotated from Z-up into Y-up.
pub fn spawn_campus_scene(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<MapSettings>,
) {
    commands.spawn((
        DirectionalLight {
            illuminance: 12_000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(1.0, 2.0, 1.5).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let scene = asset_server.load(GltfAssetLabel::Scene(0).from_asset(settings.scene_path.clone()));
    commands.spawn((
        SceneRoot(scene),
        Transform::from_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
        Name::new("world"),
        CampusSceneRoot,
    ));
    info!(target: "scene", "Loading campus scene from {}", settings.scene_path);
}

pub fn scene_pending(status: Res<SceneStatus>) -> bool {
    !status.prepared
}

/// Applies base and layer colours once every building mesh is present in the
/// name index.
pub fn prepare_scene(
    mut status: ResMut<SceneStatus>,
    dataset: Res<CityDataset>,
    settings: Res<MapSettings>,
    layers: Option<Res<LayerManager>>,
    index: Res<SceneNameIndex>,
    mut scene: WorldScene,
    mut prepared: MessageWriter<ScenePrepared>,
) {
    if dataset.is_empty() || !buildings_present(&scene, &dataset) {
        return;
    }

    let mut painted = apply_base_colors(&mut scene, &dataset, &settings);
    if let Some(layers) = layers {
        painted += apply_geometry_colors(&mut scene, &dataset, layers.catalog());
    }
    status.prepared = true;
    info!(
        target: "scene",
        "Scene prepared: {} named nodes, {} meshes styled",
        index.len(),
        painted
    );
    prepared.write(ScenePrepared {
        indexed_nodes: index.len(),
    });
}
