//! Groups of the layer list, read from the codelist hierarchy document.
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::definitions::LayerCatalog;
use crate::dataset::DatasetError;

/// Name of the group collecting included layers the hierarchy does not mention.
pub const UNGROUPED: &str = "Other";

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawGroupEntry {
    Code(String),
    Nested(BTreeMap<String, String>),
}

/// Aggregate state shown by a group's checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    Off,
    Partial,
    On,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerGroup {
    pub name: String,
    pub codes: Vec<String>,
}

impl LayerGroup {
    pub fn state(&self, is_active: impl Fn(&str) -> bool) -> GroupState {
        let active = self.codes.iter().filter(|code| is_active(code)).count();
        match active {
            0 => GroupState::Off,
            n if n == self.codes.len() => GroupState::On,
            _ => GroupState::Partial,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerGroups {
    groups: Vec<LayerGroup>,
}

impl LayerGroups {
    pub fn load(path: impl AsRef<Path>, catalog: &LayerCatalog) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&data, catalog)
    }

    /// Group → layer name → code, where a code may itself be a map of sub-layers.
    /// Codes outside the catalog are skipped and empty groups dropped.
    pub fn from_json(data: &str, catalog: &LayerCatalog) -> Result<Self, DatasetError> {
        let raw: BTreeMap<String, BTreeMap<String, RawGroupEntry>> = serde_json::from_str(data)?;
        let mut placed: BTreeSet<String> = BTreeSet::new();
        let mut groups = Vec::new();
        for (name, entries) in raw {
            let mut codes: Vec<String> = Vec::new();
            let flattened = entries.into_values().flat_map(|entry| match entry {
                RawGroupEntry::Code(code) => vec![code],
                RawGroupEntry::Nested(sub_layers) => sub_layers.into_values().collect(),
            });
            for code in flattened {
                if !catalog.contains(&code) {
                    bevy::log::debug!(target: "layers", "Group {} lists unknown layer {}", name, code);
                    continue;
                }
                if !codes.contains(&code) {
                    placed.insert(code.clone());
                    codes.push(code);
                }
            }
            if !codes.is_empty() {
                groups.push(LayerGroup { name, codes });
            }
        }

        let rest: Vec<String> = catalog
            .layers()
            .map(|layer| layer.code.clone())
            .filter(|code| !placed.contains(code))
            .collect();
        if !rest.is_empty() {
            groups.push(LayerGroup {
                name: UNGROUPED.to_string(),
                codes: rest,
            });
        }
        Ok(Self { groups })
    }

    /// One group per code prefix (`Fo-Co` → `Fo`), used when no hierarchy is available.
    pub fn by_prefix(catalog: &LayerCatalog) -> Self {
        let mut by_prefix: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for layer in catalog.layers() {
            let prefix = layer
                .code
                .split('-')
                .next()
                .unwrap_or(layer.code.as_str());
            by_prefix
                .entry(prefix.to_string())
                .or_default()
                .push(layer.code.clone());
        }
        Self {
            groups: by_prefix
                .into_iter()
                .map(|(name, codes)| LayerGroup { name, codes })
                .collect(),
        }
    }

    pub fn groups(&self) -> &[LayerGroup] {
        &self.groups
    }

    pub fn get(&self, name: &str) -> Option<&LayerGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
