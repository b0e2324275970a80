//! Thematic layer definitions and their implication graph.
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::{core::HexColor, dataset::DatasetError};

#[derive(Debug, Clone, Deserialize, Default)]
struct RawLayerDefinition {
    #[serde(rename = "Include", default)]
    include: bool,
    #[serde(rename = "Geometry", default)]
    geometry: bool,
    #[serde(rename = "Icon name", default)]
    icon_name: Option<String>,
    #[serde(rename = "Implies", default)]
    implies: Vec<String>,
    #[serde(rename = "Implied by", default)]
    implied_by: Vec<String>,
    #[serde(rename = "Name (EN)", default)]
    name: Option<String>,
    #[serde(rename = "Geometry color", default)]
    geometry_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDefinition {
    pub code: String,
    pub name: String,
    pub geometry: bool,
    pub icon_name: Option<String>,
    /// Colour painted onto the layer's unit geometry, if any.
    pub geometry_color: Option<HexColor>,
}

impl LayerDefinition {
    pub fn has_icon(&self) -> bool {
        self.icon_name.is_some()
    }
}

/// Included layers keyed by code, plus the `Implies` graph.
#[derive(Debug, Clone, Default)]
pub struct LayerCatalog {
    layers: BTreeMap<String, LayerDefinition>,
    implies: BTreeMap<String, BTreeSet<String>>,
}

impl LayerCatalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, DatasetError> {
        let raw: BTreeMap<String, RawLayerDefinition> = serde_json::from_str(data)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: BTreeMap<String, RawLayerDefinition>) -> Self {
        let layers: BTreeMap<String, LayerDefinition> = raw
            .iter()
            .filter(|(_, definition)| definition.include)
            .map(|(code, definition)| {
                let layer = LayerDefinition {
                    code: code.clone(),
                    name: definition
                        .name
                        .clone()
                        .filter(|name| !name.trim().is_empty())
                        .unwrap_or_else(|| code.clone()),
                    geometry: definition.geometry,
                    icon_name: definition
                        .icon_name
                        .clone()
                        .filter(|icon| !icon.trim().is_empty()),
                    geometry_color: parse_geometry_color(code, definition.geometry_color.as_deref()),
                };
                (code.clone(), layer)
            })
            .collect();

        // Edges only between included layers; "Implied by" is the reverse direction.
        let mut implies: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (code, definition) in raw.iter().filter(|(code, _)| layers.contains_key(*code)) {
            for implied in definition.implies.iter().filter(|c| layers.contains_key(*c)) {
                if implied != code {
                    implies.entry(code.clone()).or_default().insert(implied.clone());
                }
            }
            for implier in definition.implied_by.iter().filter(|c| layers.contains_key(*c)) {
                if implier != code {
                    implies.entry(implier.clone()).or_default().insert(code.clone());
                }
            }
        }

        Self { layers, implies }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&LayerDefinition> {
        self.layers.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.layers.contains_key(code)
    }

    pub fn layers(&self) -> impl Iterator<Item = &LayerDefinition> {
        self.layers.values()
    }

    /// Layers directly implied by `code`.
    pub fn implications(&self, code: &str) -> impl Iterator<Item = &str> {
        self.implies
            .get(code)
            .into_iter()
            .flat_map(|implied| implied.iter().map(String::as_str))
    }

    pub fn is_geometry(&self, code: &str) -> bool {
        self.get(code).is_some_and(|layer| layer.geometry)
    }

    pub fn is_icon(&self, code: &str) -> bool {
        self.get(code).is_some_and(LayerDefinition::has_icon)
    }

    /// Layers carrying a geometry colour, with that colour.
    pub fn geometry_colors(&self) -> impl Iterator<Item = (&str, HexColor)> {
        self.layers
            .values()
            .filter_map(|layer| layer.geometry_color.map(|color| (layer.code.as_str(), color)))
    }

    /// Icon asset path below `directory`.
    pub fn icon_path(&self, directory: &str, code: &str) -> Option<String> {
        let icon = self.get(code)?.icon_name.as_deref()?;
        let directory = directory.trim_end_matches('/');
        Some(format!("{directory}/{icon}"))
    }
}

fn parse_geometry_color(code: &str, raw: Option<&str>) -> Option<HexColor> {
    let raw = raw.filter(|value| !value.trim().is_empty())?;
    let color = HexColor::parse(raw);
    if color.is_none() {
        bevy::log::warn!(target: "layers", "Ignoring geometry colour {:?} of layer {}", raw, code);
    }
    color
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::LayerCatalog;

    pub const LAYERS_JSON: &str = r##"{
      "Na-Fl-Ha": { "Include": true, "Geometry": true, "Geometry color": "#B0C4DE", "Icon name": null, "Implies": [], "Implied by": [], "Name (EN)": "Hallways" },
      "Fo-Co": { "Include": true, "Geometry": false, "Geometry color": "", "Icon name": "coffee.svg", "Implies": [], "Implied by": ["Fo-Al"], "Name (EN)": "Coffee" },
      "Fo-Al": { "Include": true, "Geometry": false, "Icon name": "food.svg", "Implies": ["Fo-Co"], "Implied by": [], "Name (EN)": "All food" },
      "Tr-Bi": { "Include": true, "Geometry": true, "Icon name": "bike.svg", "Implies": [], "Implied by": ["Tr-Al"], "Name (EN)": "Bike parking" },
      "Tr-Al": { "Include": true, "Geometry": false, "Geometry color": "teal", "Icon name": "", "Implies": [], "Name (EN)": "All transport" },
      "Xx-Hidden": { "Include": false, "Geometry": true, "Implies": ["Na-Fl-Ha"] }
    }"##;

    pub fn catalog() -> LayerCatalog {
        LayerCatalog::from_json(LAYERS_JSON).expect("layer fixture parses")
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::catalog;
    use super::*;

    #[test]
    fn only_included_layers_are_loaded() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 5);
        assert!(!catalog.contains("Xx-Hidden"));
        assert_eq!(catalog.get("Na-Fl-Ha").map(|l| l.name.as_str()), Some("Hallways"));
    }

    #[test]
    fn implied_by_edges_are_reversed() {
        let catalog = catalog();
        let tr: Vec<&str> = catalog.implications("Tr-Al").collect();
        assert_eq!(tr, vec!["Tr-Bi"]);
        let fo: Vec<&str> = catalog.implications("Fo-Al").collect();
        assert_eq!(fo, vec!["Fo-Co"]);
        assert_eq!(catalog.implications("Na-Fl-Ha").count(), 0);
    }

    #[test]
    fn blank_icon_names_mean_no_icon() {
        let catalog = catalog();
        assert!(!catalog.is_icon("Tr-Al"));
        assert!(!catalog.is_icon("Na-Fl-Ha"));
        assert_eq!(
            catalog.icon_path("icons/thematic-layers/", "Fo-Co").as_deref(),
            Some("icons/thematic-layers/coffee.svg")
        );
    }

    #[test]
    fn geometry_colors_are_parsed_per_layer() {
        let catalog = catalog();
        assert_eq!(
            catalog.get("Na-Fl-Ha").and_then(|l| l.geometry_color),
            Some(HexColor::new(0xb0c4de))
        );
        // Blank and unparseable colours are dropped.
        assert_eq!(catalog.get("Fo-Co").and_then(|l| l.geometry_color), None);
        assert_eq!(catalog.get("Tr-Al").and_then(|l| l.geometry_color), None);
        assert_eq!(catalog.get("Tr-Bi").and_then(|l| l.geometry_color), None);
        assert_eq!(
            catalog.geometry_colors().collect::<Vec<_>>(),
            vec![("Na-Fl-Ha", HexColor::new(0xb0c4de))]
        );
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(LayerCatalog::from_json("[1, 2]").is_err());
    }
}
