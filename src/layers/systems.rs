//! Systems applying layer changes to the scene.
use bevy::prelude::*;

use super::{
    components::{SetImportanceBaseline, SetLayerGroup, ToggleLayer},
    manager::LayerManager,
};
use crate::{
    dataset::CityDataset,
    scene::{ScenePrepared, WorldScene},
};

pub fn initialise_layers(
    mut prepared: MessageReader<ScenePrepared>,
    mut manager: ResMut<LayerManager>,
    dataset: Res<CityDataset>,
    mut scene: WorldScene,
) {
    if prepared.read().last().is_none() {
        return;
    }
    let hidden = manager.initialise(&mut scene, &dataset);
    info!(
        target: "layers",
        "{} layers available, {} unit meshes hidden, {} icon sets placed",
        manager.catalog().len(),
        hidden,
        manager.icons().len()
    );
}

pub fn apply_layer_toggles(
    mut toggles: MessageReader<ToggleLayer>,
    mut manager: ResMut<LayerManager>,
    dataset: Res<CityDataset>,
    mut scene: WorldScene,
) {
    for toggle in toggles.read() {
        if let Err(err) = manager.toggle_layer(&mut scene, &dataset, &toggle.code) {
            warn!(target: "layers", "{}", err);
        }
    }
}

pub fn apply_group_switches(
    mut switches: MessageReader<SetLayerGroup>,
    mut manager: ResMut<LayerManager>,
    dataset: Res<CityDataset>,
    mut scene: WorldScene,
) {
    for switch in switches.read() {
        match manager.set_group_active(&mut scene, &dataset, &switch.group, switch.active) {
            Ok(changes) => debug!(
                target: "layers",
                "Group {} switched {}: {} toggles",
                switch.group,
                if switch.active { "on" } else { "off" },
                changes.len()
            ),
            Err(err) => warn!(target: "layers", "{}", err),
        }
    }
}

pub fn apply_importance_baseline(
    mut changes: MessageReader<SetImportanceBaseline>,
    mut manager: ResMut<LayerManager>,
    dataset: Res<CityDataset>,
) {
    if let Some(SetImportanceBaseline(baseline)) = changes.read().last().copied() {
        manager.update_importance_baseline(&dataset, baseline);
    }
}
