//! LayersPlugin loads the layer definitions and wires toggling.
use bevy::prelude::*;

use super::{
    components::{SetImportanceBaseline, SetLayerGroup, ToggleLayer},
    definitions::LayerCatalog,
    groups::LayerGroups,
    manager::LayerManager,
    systems::{
        apply_group_switches, apply_importance_baseline, apply_layer_toggles, initialise_layers,
    },
};
use crate::{core::MapSettings, dataset::CityDataset};

pub struct LayersPlugin;

impl Plugin for LayersPlugin {
    fn build(&self, app: &mut App) {
        let settings = app
            .world()
            .get_resource::<MapSettings>()
            .cloned()
            .unwrap_or_default();

        let catalog = match LayerCatalog::load(&settings.layer_definitions_path) {
            Ok(catalog) => {
                info!(
                    target: "layers",
                    "Loaded {} layer definitions from {}",
                    catalog.len(),
                    settings.layer_definitions_path
                );
                catalog
            }
            Err(err) => {
                warn!(target: "layers", "{}. No thematic layers available.", err);
                LayerCatalog::default()
            }
        };

        let groups = match LayerGroups::load(&settings.layer_hierarchy_path, &catalog) {
            Ok(groups) => groups,
            Err(err) => {
                info!(target: "layers", "{}. Grouping layers by code prefix.", err);
                LayerGroups::by_prefix(&catalog)
            }
        };

        let mut manager = match app.world().get_resource::<CityDataset>() {
            Some(dataset) => LayerManager::new(catalog, dataset, &settings),
            None => LayerManager::new(catalog, &CityDataset::default(), &settings),
        };
        manager.set_groups(groups);

        app.insert_resource(manager)
            .add_message::<ToggleLayer>()
            .add_message::<SetLayerGroup>()
            .add_message::<SetImportanceBaseline>()
            .add_systems(
                Update,
                (
                    initialise_layers,
                    apply_layer_toggles.after(initialise_layers),
                    apply_group_switches.after(apply_layer_toggles),
                    apply_importance_baseline.after(initialise_layers),
                ),
            );
    }
}
