//! LayerManager keeps unit geometry and icon sets in step with the active layers.
use std::collections::BTreeMap;

use bevy::prelude::*;

use super::{
    activation::{LayerActivation, LayerChange},
    definitions::LayerCatalog,
    groups::{GroupState, LayerGroups},
    icons::{IconContext, IconRegistry, IconSet, LayerIcon},
};
use crate::{
    core::{HexColor, MapError, MapSettings},
    dataset::{keys::mesh_name, CityDataset, CityObject, Importance},
    scene::SceneGraph,
};

#[derive(Resource, Debug, Clone)]
pub struct LayerManager {
    catalog: LayerCatalog,
    groups: LayerGroups,
    activation: LayerActivation,
    icons: IconRegistry,
    baseline: Importance,
    icon_color: HexColor,
    icon_directory: String,
    /// Building key → layer code → unit container key.
    building_containers: BTreeMap<String, BTreeMap<String, String>>,
    outdoor_containers: BTreeMap<String, String>,
    active_building: Option<String>,
    active_storey: Option<String>,
}

impl LayerManager {
    pub fn new(catalog: LayerCatalog, dataset: &CityDataset, settings: &MapSettings) -> Self {
        let building_containers = dataset
            .building_keys()
            .iter()
            .map(|key| (key.clone(), dataset.building_unit_containers(key)))
            .collect();
        Self {
            groups: LayerGroups::by_prefix(&catalog),
            catalog,
            activation: LayerActivation::default(),
            icons: IconRegistry::default(),
            baseline: settings.importance_baseline,
            icon_color: settings.icon_color,
            icon_directory: settings.icon_directory.clone(),
            building_containers,
            outdoor_containers: dataset.outdoor_unit_containers(),
            active_building: None,
            active_storey: None,
        }
    }

    /// Hide every unit mesh and place the starting building labels.
    /// Returns the number of unit meshes hidden.
    pub fn initialise<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &mut S,
        dataset: &CityDataset,
    ) -> usize {
        let containers: Vec<String> = self
            .building_containers
            .values()
            .flat_map(|by_code| by_code.values().cloned())
            .chain(self.outdoor_containers.values().cloned())
            .collect();
        let mut hidden = 0;
        for container in &containers {
            for unit in dataset.container_units(container) {
                if let Some(node) = scene.find(&mesh_name(&unit.key, 0)) {
                    scene.set_visible(node, false);
                    hidden += 1;
                }
            }
        }

        let buildings: Vec<String> = dataset.building_keys().to_vec();
        for building in &buildings {
            self.add_building_iconset(dataset, building);
        }
        let active: Vec<String> = self.active_layers().map(str::to_string).collect();
        for code in &active {
            if self.catalog.is_icon(code) {
                self.add_outdoor_iconsets(dataset, code);
            }
        }
        hidden
    }

    pub fn catalog(&self) -> &LayerCatalog {
        &self.catalog
    }

    pub fn groups(&self) -> &LayerGroups {
        &self.groups
    }

    pub fn set_groups(&mut self, groups: LayerGroups) {
        self.groups = groups;
    }

    pub fn group_state(&self, name: &str) -> Option<GroupState> {
        let group = self.groups.get(name)?;
        Some(group.state(|code| self.is_active(code)))
    }

    pub fn icons(&self) -> &IconRegistry {
        &self.icons
    }

    pub fn is_active(&self, code: &str) -> bool {
        self.activation.is_active(code)
    }

    pub fn is_explicit(&self, code: &str) -> bool {
        self.activation.is_explicit(code)
    }

    pub fn active_layers(&self) -> impl Iterator<Item = &str> {
        self.activation.active()
    }

    pub fn baseline(&self) -> Importance {
        self.baseline
    }

    pub fn active_building(&self) -> Option<&str> {
        self.active_building.as_deref()
    }

    pub fn active_storey(&self) -> Option<&str> {
        self.active_storey.as_deref()
    }

    pub fn toggle_layer<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &mut S,
        dataset: &CityDataset,
        code: &str,
    ) -> Result<LayerChange, MapError> {
        let change = self.activation.toggle(&self.catalog, code)?;
        for layer in &change.deactivated {
            self.remove_layer(scene, dataset, layer);
        }
        for layer in &change.activated {
            self.add_layer(scene, dataset, layer);
        }
        info!(
            target: "layers",
            "Toggled {}: +{:?} -{:?}",
            code, change.activated, change.deactivated
        );
        Ok(change)
    }

    /// Switch every layer of a group on or off, toggling only the members not
    /// already in the requested state.
    pub fn set_group_active<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &mut S,
        dataset: &CityDataset,
        name: &str,
        active: bool,
    ) -> Result<Vec<LayerChange>, MapError> {
        let codes = self
            .groups
            .get(name)
            .map(|group| group.codes.clone())
            .ok_or_else(|| MapError::unknown_entity(format!("layer group {name}")))?;
        let mut changes = Vec::new();
        for code in &codes {
            if self.is_active(code) != active {
                changes.push(self.toggle_layer(scene, dataset, code)?);
            }
        }
        Ok(changes)
    }

    /// Re-label only the buildings whose label visibility flips.
    pub fn update_importance_baseline(&mut self, dataset: &CityDataset, baseline: Importance) {
        let previous = self.baseline;
        self.baseline = baseline;
        let buildings: Vec<String> = dataset.building_keys().to_vec();
        for key in &buildings {
            if self.active_building.as_deref() == Some(key.as_str()) {
                continue;
            }
            let Some(building) = dataset.get(key) else {
                continue;
            };
            let was = building.importance().is_some_and(|i| i.meets(previous));
            let now = building.importance().is_some_and(|i| i.meets(baseline));
            if was != now {
                self.icons.remove_set(key);
                self.add_building_iconset(dataset, key);
            }
        }
        debug!(target: "layers", "Importance baseline {} -> {}", previous, baseline);
    }

    /// Show the active layers inside `building` on `storey`, replacing the
    /// building's own label and any interior icons from a previous storey.
    pub fn add_interior_building_layers<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &mut S,
        dataset: &CityDataset,
        building: &str,
        storey: &str,
    ) {
        self.remove_interior_building_layers(scene, dataset, false);
        self.icons.remove_set(building);
        self.active_building = Some(building.to_string());
        self.active_storey = Some(storey.to_string());

        let active: Vec<String> = self.active_layers().map(str::to_string).collect();
        for code in &active {
            if !self.building_has_layer(building, code) {
                continue;
            }
            if self.catalog.is_geometry(code) {
                self.set_interior_geometry(scene, dataset, code, true);
            }
            if self.catalog.is_icon(code) {
                self.add_interior_icons(dataset, code);
            }
        }
    }

    /// Clear interior icons and geometry. With `clear` the building view has
    /// ended: the building gets its label back and the context is forgotten.
    pub fn remove_interior_building_layers<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &mut S,
        dataset: &CityDataset,
        clear: bool,
    ) {
        let Some(building) = self.active_building.clone() else {
            return;
        };
        self.icons
            .remove_where(|set| set.context == IconContext::Interior);

        let active: Vec<String> = self.active_layers().map(str::to_string).collect();
        for code in &active {
            if self.catalog.is_geometry(code) && self.building_has_layer(&building, code) {
                self.set_building_geometry(scene, dataset, &building, code, |_| Some(false));
            }
        }

        if clear {
            self.active_building = None;
            self.active_storey = None;
            self.add_building_iconset(dataset, &building);
        }
    }

    fn add_layer<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &mut S,
        dataset: &CityDataset,
        code: &str,
    ) {
        if self.catalog.is_geometry(code) {
            self.set_outdoor_geometry(scene, dataset, code, true);
            if self.active_layer_building(code) {
                self.set_interior_geometry(scene, dataset, code, true);
            }
        }
        if self.catalog.is_icon(code) {
            self.add_icon_layer(dataset, code);
        }
    }

    fn remove_layer<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &mut S,
        dataset: &CityDataset,
        code: &str,
    ) {
        if self.catalog.is_geometry(code) {
            self.set_outdoor_geometry(scene, dataset, code, false);
            if self.active_layer_building(code) {
                self.set_interior_geometry(scene, dataset, code, false);
            }
        }
        if self.catalog.is_icon(code) {
            self.icons.remove_layer(code);
        }
    }

    fn add_icon_layer(&mut self, dataset: &CityDataset, code: &str) {
        let Some(icon) = self.layer_icon(code) else {
            return;
        };
        let buildings: Vec<String> = self
            .building_containers
            .iter()
            .filter(|(_, by_code)| by_code.contains_key(code))
            .map(|(key, _)| key.clone())
            .collect();
        for building in &buildings {
            if self.active_building.as_deref() == Some(building.as_str()) {
                continue;
            }
            if !self.icons.add_icon(building, code, icon.clone()) {
                self.add_building_iconset(dataset, building);
            }
        }
        self.add_outdoor_iconsets(dataset, code);
        if self.active_layer_building(code) {
            self.add_interior_icons(dataset, code);
        }
    }

    fn add_building_iconset(&mut self, dataset: &CityDataset, key: &str) {
        let Some(building) = dataset.get(key) else {
            return;
        };
        let label = self.building_label(building);
        let icons: BTreeMap<String, LayerIcon> = self
            .active_layers()
            .filter(|code| self.building_has_layer(key, code))
            .filter_map(|code| self.layer_icon(code).map(|icon| (code.to_string(), icon)))
            .collect();
        if label.is_none() && icons.is_empty() {
            return;
        }
        let Some(position) = building.icon_position() else {
            debug!(target: "layers", "{} has no icon_position; no label placed", key);
            return;
        };
        self.icons.insert(IconSet {
            key: key.to_string(),
            context: IconContext::Building,
            label,
            position,
            icons,
        });
    }

    fn add_outdoor_iconsets(&mut self, dataset: &CityDataset, code: &str) {
        let Some(container) = self.outdoor_containers.get(code).cloned() else {
            return;
        };
        self.add_unit_icons(dataset, &container, code, IconContext::Outdoor, |_| true);
    }

    fn add_interior_icons(&mut self, dataset: &CityDataset, code: &str) {
        let (Some(building), Some(storey)) = (self.active_building.clone(), self.active_storey.clone())
        else {
            return;
        };
        let Some(container) = self.container_of(&building, code) else {
            return;
        };
        self.add_unit_icons(dataset, &container, code, IconContext::Interior, |unit| {
            unit.occupies_storey(&storey)
        });
    }

    fn add_unit_icons(
        &mut self,
        dataset: &CityDataset,
        container: &str,
        code: &str,
        context: IconContext,
        include: impl Fn(&CityObject) -> bool,
    ) {
        let Some(icon) = self.layer_icon(code) else {
            return;
        };
        for unit in dataset.container_units(container) {
            if !include(unit) {
                continue;
            }
            if self.icons.add_icon(&unit.key, code, icon.clone()) {
                continue;
            }
            let Some(position) = unit.icon_position() else {
                debug!(target: "layers", "{} has no icon_position", unit.key);
                continue;
            };
            self.icons.insert(IconSet {
                key: unit.key.clone(),
                context,
                label: None,
                position,
                icons: BTreeMap::from([(code.to_string(), icon.clone())]),
            });
        }
    }

    fn set_outdoor_geometry<S: SceneGraph + ?Sized>(
        &self,
        scene: &mut S,
        dataset: &CityDataset,
        code: &str,
        visible: bool,
    ) {
        let Some(container) = self.outdoor_containers.get(code) else {
            return;
        };
        for unit in dataset.container_units(container) {
            set_unit_visible(scene, &unit.key, visible);
        }
    }

    fn set_interior_geometry<S: SceneGraph + ?Sized>(
        &self,
        scene: &mut S,
        dataset: &CityDataset,
        code: &str,
        visible: bool,
    ) {
        let (Some(building), Some(storey)) = (self.active_building.as_deref(), self.active_storey.as_deref())
        else {
            return;
        };
        self.set_building_geometry(scene, dataset, building, code, |unit| {
            unit.occupies_storey(storey).then_some(visible)
        });
    }

    /// Apply `visibility` to each unit of one layer in one building; `None` leaves the unit alone.
    fn set_building_geometry<S: SceneGraph + ?Sized>(
        &self,
        scene: &mut S,
        dataset: &CityDataset,
        building: &str,
        code: &str,
        visibility: impl Fn(&CityObject) -> Option<bool>,
    ) {
        let Some(container) = self.container_of(building, code) else {
            return;
        };
        for unit in dataset.container_units(&container) {
            if let Some(visible) = visibility(unit) {
                set_unit_visible(scene, &unit.key, visible);
            }
        }
    }

    fn building_label(&self, building: &CityObject) -> Option<String> {
        let important = building.importance().is_some_and(|i| i.meets(self.baseline));
        if !important {
            return None;
        }
        let space_id = building.space_id().unwrap_or(&building.key);
        Some(match building.short_name() {
            Some(short) => format!("{space_id} | {short}"),
            None => space_id.to_string(),
        })
    }

    fn layer_icon(&self, code: &str) -> Option<LayerIcon> {
        self.catalog
            .icon_path(&self.icon_directory, code)
            .map(|path| LayerIcon {
                path,
                color: self.icon_color,
            })
    }

    fn container_of(&self, building: &str, code: &str) -> Option<String> {
        self.building_containers.get(building)?.get(code).cloned()
    }

    fn building_has_layer(&self, building: &str, code: &str) -> bool {
        self.building_containers
            .get(building)
            .is_some_and(|by_code| by_code.contains_key(code))
    }

    fn active_layer_building(&self, code: &str) -> bool {
        self.active_building
            .as_deref()
            .is_some_and(|building| self.building_has_layer(building, code))
    }
}

fn set_unit_visible<S: SceneGraph + ?Sized>(scene: &mut S, unit_key: &str, visible: bool) {
    match scene.find(&mesh_name(unit_key, 0)) {
        Some(node) => scene.set_visible(node, visible),
        None => debug!(target: "layers", "No mesh for unit {}", unit_key),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::LayerManager;
    use crate::{
        core::MapSettings, dataset::store::fixtures::campus,
        layers::definitions::fixtures::catalog, scene::memory::fixtures::campus_scene,
        scene::MemoryScene,
    };

    /// Manager over the campus fixtures, already initialised against the returned scene.
    pub fn initialised() -> (LayerManager, MemoryScene) {
        let dataset = campus();
        let mut scene = campus_scene();
        let mut manager = LayerManager::new(catalog(), &dataset, &MapSettings::default());
        manager.initialise(&mut scene, &dataset);
        (manager, scene)
    }
}
