//! In-memory arena of city objects with parent/child and unit→room indices.
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fs,
    path::Path,
};

use bevy::prelude::*;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::{
    keys::{mesh_name, storey_code_from_identifier, strip_lod_suffix, truncate_to_object_key},
    types::{CityObject, CityObjectKind},
};
use crate::core::MapError;

/// Upper bound on parent hops when searching for an owning building.
pub const MAX_HIERARCHY_DEPTH: usize = 64;
/// Ground storey used when no storey is requested.
pub const DEFAULT_STOREY: &str = "00";

const UNIT_CONTAINER_MARKER: &str = "BuildingUnitObject";
pub const OUTDOOR_CONTAINER_KEY: &str = "Outdoor-CityObjectGroup-OutdoorObject";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(rename = "CityObjects")]
    city_objects: BTreeMap<String, RawCityObject>,
}

#[derive(Debug, Deserialize)]
struct RawCityObject {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    attributes: Map<String, Value>,
    #[serde(default)]
    children: Vec<String>,
    #[serde(default)]
    parents: Vec<String>,
}

/// Object key and type resolved from a scene or user supplied name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    pub object_key: String,
    pub kind: CityObjectKind,
}

/// Read-only city model, keyed by object key.
#[derive(Resource, Debug, Default)]
pub struct CityDataset {
    objects: HashMap<String, CityObject>,
    building_keys: Vec<String>,
    unit_rooms: HashMap<String, Vec<String>>,
}

impl CityDataset {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, DatasetError> {
        let raw: RawDocument = serde_json::from_str(data)?;
        let objects = raw.city_objects.into_iter().map(|(key, raw)| {
            if raw.parents.len() > 1 {
                warn!(
                    target: "dataset",
                    "{} has {} parents; only {} is used",
                    key,
                    raw.parents.len(),
                    raw.parents[0]
                );
            }
            CityObject {
                kind: CityObjectKind::parse(&raw.kind),
                attributes: raw.attributes,
                parent: raw.parents.into_iter().next(),
                children: raw.children,
                key,
            }
        });
        Ok(Self::from_objects(objects))
    }

    /// Builds the dataset and its derived indices from already parsed objects.
    pub fn from_objects(objects: impl IntoIterator<Item = CityObject>) -> Self {
        let objects: HashMap<String, CityObject> = objects
            .into_iter()
            .map(|object| (object.key.clone(), object))
            .collect();

        let mut building_keys: Vec<String> = objects
            .values()
            .filter(|object| object.kind == CityObjectKind::Building)
            .map(|object| object.key.clone())
            .collect();
        building_keys.sort();

        let unit_rooms = objects
            .values()
            .filter(|object| object.kind == CityObjectKind::BuildingUnit)
            .map(|unit| (unit.key.clone(), unit.unit_spaces()))
            .filter(|(_, rooms)| !rooms.is_empty())
            .collect();

        Self {
            objects,
            building_keys,
            unit_rooms,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&CityObject> {
        self.objects.get(key)
    }

    pub fn require(&self, key: &str) -> Result<&CityObject, MapError> {
        self.get(key).ok_or_else(|| MapError::unknown_entity(key))
    }

    pub fn objects(&self) -> impl Iterator<Item = &CityObject> {
        self.objects.values()
    }

    pub fn building_keys(&self) -> &[String] {
        &self.building_keys
    }

    /// Rooms a unit spans, as listed in its `unit_spaces`.
    pub fn unit_spaces(&self, unit_key: &str) -> &[String] {
        self.unit_rooms
            .get(unit_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Recovers the canonical object key from a scene node name.
    pub fn resolve_key(&self, name: &str) -> Result<ResolvedKey, MapError> {
        let stripped = strip_lod_suffix(name);
        let object = self
            .get(stripped)
            .or_else(|| truncate_to_object_key(stripped).and_then(|key| self.get(key)))
            .ok_or_else(|| MapError::unknown_entity(name))?;
        Ok(ResolvedKey {
            object_key: object.key.clone(),
            kind: object.kind.clone(),
        })
    }

    pub fn mesh_key(&self, key: &str) -> Result<String, MapError> {
        let object = self.require(key)?;
        Ok(mesh_name(&object.key, object.kind.mesh_lod()))
    }

    /// Walks the first-parent chain until an ancestor of `kind` is found.
    pub fn find_ancestor_of_kind(
        &self,
        key: &str,
        kind: &CityObjectKind,
    ) -> Result<&CityObject, MapError> {
        let mut visited = HashSet::new();
        let mut current = self.require(key)?;
        for _ in 0..=MAX_HIERARCHY_DEPTH {
            if &current.kind == kind {
                return Ok(current);
            }
            if !visited.insert(current.key.as_str()) {
                break;
            }
            let Some(parent) = current.parent.as_deref() else {
                break;
            };
            current = self.require(parent)?;
        }
        Err(MapError::MalformedHierarchy {
            key: key.to_string(),
            depth: MAX_HIERARCHY_DEPTH,
        })
    }

    pub fn find_parent_building(&self, key: &str) -> Result<&str, MapError> {
        self.find_ancestor_of_kind(key, &CityObjectKind::Building)
            .map(|building| building.key.as_str())
    }

    /// Code of the storey an object sits on.
    pub fn storey_code_of(&self, storey: &CityObject) -> String {
        let identifier = storey.space_id().unwrap_or(&storey.key);
        storey_code_from_identifier(identifier).to_string()
    }

    /// Storey code of a room: the parent storey's code, else the third `space_id` segment.
    pub fn room_storey_code(&self, room_key: &str) -> Result<String, MapError> {
        if let Ok(storey) = self.find_ancestor_of_kind(room_key, &CityObjectKind::BuildingStorey)
        {
            return Ok(self.storey_code_of(storey));
        }

        let room = self.require(room_key)?;
        room.space_id()
            .map(|space_id| space_id.split('.').collect::<Vec<_>>())
            .filter(|parts| parts.len() == 4)
            .map(|parts| parts[2].to_string())
            .ok_or_else(|| MapError::missing_attribute(room_key, "space_id"))
    }

    /// Whether the building has any floor-plan parts.
    pub fn has_floor_plan(&self, building_key: &str) -> bool {
        self.get(building_key).is_some_and(|building| {
            building.children.iter().any(|child| {
                self.get(child)
                    .is_some_and(|child| child.kind == CityObjectKind::BuildingPart)
            })
        })
    }

    /// Storey code → storey keys, walking Building → BuildingPart → BuildingStorey.
    pub fn storey_index(&self, building_key: &str) -> BTreeMap<String, Vec<String>> {
        let mut index: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let Some(building) = self.get(building_key) else {
            return index;
        };
        let storeys = building
            .children
            .iter()
            .filter_map(|key| self.get(key))
            .filter(|part| part.kind == CityObjectKind::BuildingPart)
            .flat_map(|part| part.children.iter().filter_map(|key| self.get(key)))
            .filter(|storey| storey.kind == CityObjectKind::BuildingStorey);
        for storey in storeys {
            index
                .entry(self.storey_code_of(storey))
                .or_default()
                .push(storey.key.clone());
        }
        index
    }

    /// Room keys on the given storeys.
    pub fn rooms_of_storeys<'a>(&'a self, storey_keys: &'a [String]) -> Vec<&'a str> {
        storey_keys
            .iter()
            .filter_map(|key| self.get(key))
            .flat_map(|storey| storey.children.iter())
            .filter(|key| {
                self.get(key)
                    .is_some_and(|room| room.kind == CityObjectKind::BuildingRoom)
            })
            .map(String::as_str)
            .collect()
    }

    /// Layer code → unit container key for a building's unit groupings.
    pub fn building_unit_containers(&self, building_key: &str) -> BTreeMap<String, String> {
        let Some(building) = self.get(building_key) else {
            return BTreeMap::new();
        };
        building
            .children
            .iter()
            .find(|key| key.contains(UNIT_CONTAINER_MARKER))
            .and_then(|key| self.get(key))
            .map(|group| self.containers_by_code(&group.children))
            .unwrap_or_default()
    }

    /// Layer code → unit container key for outdoor units.
    pub fn outdoor_unit_containers(&self) -> BTreeMap<String, String> {
        self.get(OUTDOOR_CONTAINER_KEY)
            .map(|group| self.containers_by_code(&group.children))
            .unwrap_or_default()
    }

    fn containers_by_code(&self, keys: &[String]) -> BTreeMap<String, String> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .filter_map(|container| {
                container
                    .code()
                    .map(|code| (code.to_string(), container.key.clone()))
            })
            .collect()
    }

    /// Children of a unit container that are present in the dataset.
    pub fn container_units(&self, container_key: &str) -> Vec<&CityObject> {
        self.get(container_key)
            .map(|container| {
                container
                    .children
                    .iter()
                    .filter_map(|key| self.get(key))
                    .collect()
            })
            .unwrap_or_default()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::campus;
    use super::*;

    #[test]
    fn resolves_mesh_names_to_objects() {
        let dataset = campus();
        let resolved = dataset.resolve_key("Room-A-lod_0").unwrap();
        assert_eq!(resolved.object_key, "Room-A");
        assert_eq!(resolved.kind, CityObjectKind::BuildingRoom);

        let err = dataset.resolve_key("Nowhere-lod_2").unwrap_err();
        assert_eq!(err, MapError::unknown_entity("Nowhere-lod_2"));
    }

    #[test]
    fn resolution_falls_back_to_object_key_prefix() {
        let dataset = campus();
        let resolved = dataset.resolve_key("Storey-02-00-extra").unwrap();
        assert_eq!(resolved.object_key, "Storey-02-00");
    }

    #[test]
    fn mesh_keys_follow_object_kind() {
        let dataset = campus();
        assert_eq!(dataset.mesh_key("Building-02").unwrap(), "Building-02-lod_2");
        assert_eq!(dataset.mesh_key("Room-A").unwrap(), "Room-A-lod_0");
    }

    #[test]
    fn parent_building_walk_reaches_building() {
        let dataset = campus();
        assert_eq!(dataset.find_parent_building("Room-C").unwrap(), "Building-02");
        assert_eq!(
            dataset.find_parent_building("Building-02").unwrap(),
            "Building-02"
        );
    }

    #[test]
    fn parent_walk_detects_cycles() {
        let mut first = CityObject::new("Loop-A", CityObjectKind::BuildingRoom);
        first.parent = Some("Loop-B".into());
        let mut second = CityObject::new("Loop-B", CityObjectKind::BuildingStorey);
        second.parent = Some("Loop-A".into());
        let dataset = CityDataset::from_objects([first, second]);

        let err = dataset.find_parent_building("Loop-A").unwrap_err();
        assert!(matches!(err, MapError::MalformedHierarchy { .. }));
    }

    #[test]
    fn orphan_rooms_have_no_building() {
        let dataset = CityDataset::from_objects([CityObject::new(
            "Room-Z",
            CityObjectKind::BuildingRoom,
        )]);
        assert!(matches!(
            dataset.find_parent_building("Room-Z"),
            Err(MapError::MalformedHierarchy { .. })
        ));
    }

    #[test]
    fn storey_index_groups_rooms_by_code() {
        let dataset = campus();
        let index = dataset.storey_index("Building-02");
        assert_eq!(index.keys().collect::<Vec<_>>(), vec!["00", "01"]);
        assert_eq!(
            dataset.rooms_of_storeys(&index["00"]),
            vec!["Room-A", "Room-B"]
        );
        assert_eq!(dataset.room_storey_code("Room-C").unwrap(), "01");
        assert!(dataset.storey_index("Building-01").is_empty());
    }

    #[test]
    fn floor_plan_requires_building_parts() {
        let dataset = campus();
        assert!(dataset.has_floor_plan("Building-02"));
        assert!(!dataset.has_floor_plan("Building-01"));
    }

    #[test]
    fn unit_index_lists_spaces() {
        let dataset = campus();
        assert_eq!(dataset.unit_spaces("Unit-Coffee"), ["Room-B".to_string()]);
        assert!(dataset.unit_spaces("Unit-Empty").is_empty());
    }

    #[test]
    fn containers_are_keyed_by_layer_code() {
        let dataset = campus();
        let building = dataset.building_unit_containers("Building-02");
        assert_eq!(building.get("Fo-Co").map(String::as_str), Some("Coffee-Container"));
        let outdoor = dataset.outdoor_unit_containers();
        assert_eq!(outdoor.len(), 2);
        assert_eq!(dataset.container_units("Outdoor-Bike-Container").len(), 1);
    }

    #[test]
    fn unknown_types_survive_loading() {
        let dataset = campus();
        assert_eq!(
            dataset.get("Tree-01").map(|object| object.kind.clone()),
            Some(CityObjectKind::Other("SolitaryVegetationObject".into()))
        );
    }
}
