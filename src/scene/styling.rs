//! Base colours for buildings and rooms, applied once the scene is available.
use super::graph::SceneGraph;
use crate::{core::MapSettings, dataset::CityDataset, layers::LayerCatalog};

/// Colours building shells by importance and rooms with the standard room colour.
///
/// Returns the number of meshes recoloured.
pub fn apply_base_colors<S: SceneGraph + ?Sized>(
    scene: &mut S,
    dataset: &CityDataset,
    settings: &MapSettings,
) -> usize {
    let mut painted = 0;
    for building_key in dataset.building_keys() {
        let Some(building) = dataset.get(building_key) else {
            continue;
        };
        let Ok(mesh_key) = dataset.mesh_key(building_key) else {
            continue;
        };
        let Some(mesh) = scene.find(&mesh_key) else {
            continue;
        };
        if building.importance().is_none() {
            bevy::log::debug!(
                target: "scene",
                "{} has no valid importance; using the neutral building colour",
                building_key
            );
        }
        scene.set_base_color(mesh, settings.importance_color(building.importance()));
        painted += 1;

        for storey_keys in dataset.storey_index(building_key).values() {
            for room in dataset.rooms_of_storeys(storey_keys) {
                let room_mesh = dataset
                    .mesh_key(room)
                    .ok()
                    .and_then(|mesh_key| scene.find(&mesh_key));
                if let Some(room_mesh) = room_mesh {
                    scene.set_base_color(room_mesh, settings.room_color);
                    painted += 1;
                }
            }
        }
    }
    painted
}

/// Paints the units of every layer that has a geometry colour. Units spanning
/// rooms colour those rooms, other units colour their own mesh. Runs after
/// [`apply_base_colors`] so layer colours win over the room colour.
pub fn apply_geometry_colors<S: SceneGraph + ?Sized>(
    scene: &mut S,
    dataset: &CityDataset,
    catalog: &LayerCatalog,
) -> usize {
    let mut painted = 0;
    for (code, color) in catalog.geometry_colors() {
        for building_key in dataset.building_keys() {
            let containers = dataset.building_unit_containers(building_key);
            let Some(container_key) = containers.get(code) else {
                continue;
            };
            for unit in dataset.container_units(container_key) {
                let spaces = unit.unit_spaces();
                let targets = if spaces.is_empty() {
                    vec![unit.key.clone()]
                } else {
                    spaces
                };
                for target in targets {
                    let mesh = dataset
                        .mesh_key(&target)
                        .ok()
                        .and_then(|mesh_key| scene.find(&mesh_key));
                    if let Some(mesh) = mesh {
                        scene.set_base_color(mesh, color);
                        painted += 1;
                    }
                }
            }
        }
    }
    painted
}

/// Whether every building's shell mesh can be found.
pub fn buildings_present<S: SceneGraph + ?Sized>(scene: &S, dataset: &CityDataset) -> bool {
    dataset.building_keys().iter().all(|key| {
        dataset
            .mesh_key(key)
            .ok()
            .and_then(|mesh_key| scene.find(&mesh_key))
            .is_some()
    })
}
