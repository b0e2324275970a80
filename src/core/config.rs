//! Map-wide settings loaded from `config/map.toml`, with environment overrides.
use std::{env, fs, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

use super::color::HexColor;
use crate::dataset::Importance;

const CONFIG_PATH: &str = "config/map.toml";

const DATASET_ENV: &str = "CAMPUSMAP_DATASET";
const SCENE_ENV: &str = "CAMPUSMAP_SCENE";
const LAYERS_ENV: &str = "CAMPUSMAP_LAYERS";
const FEEDBACK_LOG_ENV: &str = "CAMPUSMAP_FEEDBACK_LOG";

#[derive(Debug, Clone, Deserialize, Default)]
struct RawMapConfig {
    #[serde(default)]
    assets: RawAssetsSection,
    #[serde(default)]
    layers: RawLayersSection,
    #[serde(default)]
    highlight: RawHighlightSection,
    #[serde(default)]
    outline: RawOutlineSection,
    #[serde(default)]
    feedback: RawFeedbackSection,
    #[serde(default)]
    search: RawSearchSection,
    #[serde(default)]
    location: RawLocationSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawAssetsSection {
    dataset: String,
    scene: String,
    layer_definitions: String,
    layer_hierarchy: String,
}

impl Default for RawAssetsSection {
    fn default() -> Self {
        Self {
            dataset: "assets/campus/campus.city.json".into(),
            scene: "campus/campus.glb".into(),
            layer_definitions: "assets/campus/thematic_codelist-definition.json".into(),
            layer_hierarchy: "assets/campus/thematic_codelist-hierarchy.json".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawLayersSection {
    importance_baseline: String,
    icon_color: String,
    icon_directory: String,
}

impl Default for RawLayersSection {
    fn default() -> Self {
        Self {
            importance_baseline: "Tertiary".into(),
            icon_color: "#f7c286ff".into(),
            icon_directory: "icons/thematic-layers".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawHighlightSection {
    pick_color: String,
    building_color: String,
    room_color: String,
    importance_colors: Vec<String>,
}

impl Default for RawHighlightSection {
    fn default() -> Self {
        Self {
            pick_color: "#ffea00".into(),
            building_color: "#808080".into(),
            room_color: "#ede4d3".into(),
            importance_colors: vec![
                "#660e60".into(),
                "#893f71".into(),
                "#ab6092".into(),
                "#cf9bbd".into(),
                "#cfbec9".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawOutlineSection {
    default_color: String,
    single_color: String,
    hover_color: String,
    edge_strength: f32,
    edge_glow: f32,
    edge_thickness: f32,
}

impl Default for RawOutlineSection {
    fn default() -> Self {
        Self {
            default_color: "#ffffff".into(),
            single_color: "#d9ff00".into(),
            hover_color: "#0bff02".into(),
            edge_strength: 5.0,
            edge_glow: 0.25,
            edge_thickness: 0.3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawFeedbackSection {
    log_path: String,
}

impl Default for RawFeedbackSection {
    fn default() -> Self {
        Self {
            log_path: "feedback/feedback.log".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawSearchSection {
    result_count: usize,
    delay_ms: u64,
}

impl Default for RawSearchSection {
    fn default() -> Self {
        Self {
            result_count: 5,
            delay_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawLocationSection {
    bounds: [f64; 4],
}

impl Default for RawLocationSection {
    fn default() -> Self {
        Self {
            bounds: [84_000.0, 443_500.0, 87_000.0, 448_000.0],
        }
    }
}

/// Colours and edge parameters for one outline style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineStyleSettings {
    pub color: HexColor,
    pub edge_strength: f32,
    pub edge_glow: f32,
    pub edge_thickness: f32,
}

/// Resolved map settings.
#[derive(Resource, Debug, Clone)]
pub struct MapSettings {
    pub dataset_path: String,
    pub scene_path: String,
    pub layer_definitions_path: String,
    pub layer_hierarchy_path: String,
    pub importance_baseline: Importance,
    pub icon_color: HexColor,
    pub icon_directory: String,
    pub pick_color: HexColor,
    pub building_color: HexColor,
    pub room_color: HexColor,
    /// Indexed by importance rank, Primary first.
    pub importance_colors: [HexColor; 5],
    pub outline_default: OutlineStyleSettings,
    pub outline_single: OutlineStyleSettings,
    pub outline_hover: OutlineStyleSettings,
    pub feedback_log_path: String,
    /// Suggestions listed under the search box.
    pub search_result_count: usize,
    /// Typing pause before suggestions refresh.
    pub search_delay_ms: u64,
    /// `[min_x, min_y, max_x, max_y]` of the basemap in Dutch grid metres.
    pub location_bounds: [f64; 4],
}

impl MapSettings {
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_PATH);
        let raw = match fs::read_to_string(path) {
            Ok(data) => toml::from_str::<RawMapConfig>(&data).unwrap_or_else(|err| {
                warn!(
                    "Failed to parse {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                RawMapConfig::default()
            }),
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                RawMapConfig::default()
            }
        };

        let mut settings: Self = raw.into();
        settings.apply_env_overrides();
        settings
    }

    /// Replaces asset paths with non-empty `CAMPUSMAP_*` environment values.
    pub fn apply_env_overrides(&mut self) {
        let read = |name: &str| {
            env::var(name)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        if let Some(value) = read(DATASET_ENV) {
            self.dataset_path = value;
        }
        if let Some(value) = read(SCENE_ENV) {
            self.scene_path = value;
        }
        if let Some(value) = read(LAYERS_ENV) {
            self.layer_definitions_path = value;
        }
        if let Some(value) = read(FEEDBACK_LOG_ENV) {
            self.feedback_log_path = value;
        }
    }

    pub fn importance_color(&self, importance: Option<Importance>) -> HexColor {
        match importance {
            Some(level) => self.importance_colors[level as usize],
            None => self.building_color,
        }
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        RawMapConfig::default().into()
    }
}

fn color_or(raw: &str, fallback: u32, field: &str) -> HexColor {
    HexColor::parse(raw).unwrap_or_else(|| {
        warn!("Invalid colour {:?} for {}; using default.", raw, field);
        HexColor::new(fallback)
    })
}

impl From<RawMapConfig> for MapSettings {
    fn from(value: RawMapConfig) -> Self {
        let assets = value.assets;
        let layers = value.layers;
        let highlight = value.highlight;
        let outline = value.outline;

        let importance_baseline = Importance::parse(&layers.importance_baseline)
            .unwrap_or_else(|| {
                warn!(
                    "Unknown importance baseline {:?}; using Tertiary.",
                    layers.importance_baseline
                );
                Importance::Tertiary
            });

        let defaults = RawHighlightSection::default().importance_colors;
        let mut importance_colors = [HexColor::new(0x808080); 5];
        for (index, slot) in importance_colors.iter_mut().enumerate() {
            let raw = highlight
                .importance_colors
                .get(index)
                .unwrap_or(&defaults[index]);
            *slot = HexColor::parse(raw)
                .or_else(|| HexColor::parse(&defaults[index]))
                .unwrap_or(HexColor::new(0x808080));
        }

        let style = |raw: &str, fallback: u32, field: &str| OutlineStyleSettings {
            color: color_or(raw, fallback, field),
            edge_strength: outline.edge_strength.max(0.0),
            edge_glow: outline.edge_glow.max(0.0),
            edge_thickness: outline.edge_thickness.max(0.01),
        };

        Self {
            dataset_path: assets.dataset,
            scene_path: assets.scene,
            layer_definitions_path: assets.layer_definitions,
            layer_hierarchy_path: assets.layer_hierarchy,
            importance_baseline,
            icon_color: color_or(&layers.icon_color, 0xf7c286, "layers.icon_color"),
            icon_directory: layers.icon_directory,
            pick_color: color_or(&highlight.pick_color, 0xffea00, "highlight.pick_color"),
            building_color: color_or(&highlight.building_color, 0x808080, "highlight.building_color"),
            room_color: color_or(&highlight.room_color, 0xede4d3, "highlight.room_color"),
            importance_colors,
            outline_default: style(&outline.default_color, 0xffffff, "outline.default_color"),
            outline_single: style(&outline.single_color, 0xd9ff00, "outline.single_color"),
            outline_hover: style(&outline.hover_color, 0x0bff02, "outline.hover_color"),
            feedback_log_path: value.feedback.log_path,
            search_result_count: value.search.result_count.max(1),
            search_delay_ms: value.search.delay_ms,
            location_bounds: value.location.bounds,
        }
    }
}
