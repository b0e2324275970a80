//! Outline emphasis: which meshes are outlined, in which style, at which viewport size.
use bevy::prelude::*;

use crate::{
    core::{MapSettings, OutlineStyleSettings},
    dataset::{keys::with_lod, CityDataset},
    scene::{NodeId, SceneGraph},
};

const REFERENCE_VIEWPORT_HEIGHT: f32 = 1080.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutlineStyle {
    #[default]
    Default,
    Single,
    Hover,
}

/// Outlined mesh set plus a separate hover outline.
#[derive(Resource, Debug)]
pub struct OutlineManager {
    outlined: Vec<NodeId>,
    style: OutlineStyle,
    hovered: Option<NodeId>,
    styles: [OutlineStyleSettings; 3],
    viewport: UVec2,
}

impl OutlineManager {
    pub fn new(settings: &MapSettings) -> Self {
        Self {
            outlined: Vec::new(),
            style: OutlineStyle::Default,
            hovered: None,
            styles: [
                settings.outline_default,
                settings.outline_single,
                settings.outline_hover,
            ],
            viewport: UVec2::new(1280, 720),
        }
    }

    /// Replaces the outlined set.
    pub fn outline_objects(&mut self, meshes: Vec<NodeId>) {
        self.outlined = meshes;
    }

    /// Outlines the meshes named by `keys`, appending `-<lod>` where needed.
    pub fn set_outline<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &S,
        keys: &[String],
        lod: &str,
        style: OutlineStyle,
    ) {
        let meshes = keys
            .iter()
            .filter_map(|key| {
                let name = with_lod(key, lod);
                let node = scene.find(&name);
                if node.is_none() {
                    debug!(target: "highlight", "No outline target named {}", name);
                }
                node
            })
            .collect();
        self.style = style;
        self.outline_objects(meshes);
    }

    /// Default campus outline: every building shell.
    pub fn outline_buildings<S: SceneGraph + ?Sized>(&mut self, scene: &S, dataset: &CityDataset) {
        self.set_outline(scene, dataset.building_keys(), "lod_2", OutlineStyle::Default);
    }

    pub fn clear_outline(&mut self) {
        self.outlined.clear();
    }

    pub fn set_style(&mut self, style: OutlineStyle) {
        self.style = style;
    }

    pub fn set_hovered(&mut self, hovered: Option<NodeId>) {
        self.hovered = hovered;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = UVec2::new(width.max(1), height.max(1));
    }

    pub fn outlined(&self) -> &[NodeId] {
        &self.outlined
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn style(&self) -> OutlineStyle {
        self.style
    }

    pub fn style_settings(&self, style: OutlineStyle) -> OutlineStyleSettings {
        match style {
            OutlineStyle::Default => self.styles[0],
            OutlineStyle::Single => self.styles[1],
            OutlineStyle::Hover => self.styles[2],
        }
    }

    /// Gizmo line width in pixels for the current style and viewport.
    pub fn line_width(&self) -> f32 {
        let style = self.style_settings(self.style);
        let scale = self.viewport.y as f32 / REFERENCE_VIEWPORT_HEIGHT;
        (style.edge_strength * style.edge_thickness * scale).max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::memory::fixtures::campus_scene;

    #[test]
    fn set_outline_appends_lod_and_skips_missing() {
        let scene = campus_scene();
        let mut outlines = OutlineManager::new(&MapSettings::default());

        outlines.set_outline(
            &scene,
            &[
                "Building-01".to_string(),
                "Room-A-lod_0".to_string(),
                "Ghost".to_string(),
            ],
            "lod_2",
            OutlineStyle::Single,
        );

        assert_eq!(outlines.outlined().len(), 2);
        assert_eq!(outlines.style(), OutlineStyle::Single);
        outlines.clear_outline();
        assert!(outlines.outlined().is_empty());
    }

    #[test]
    fn building_outline_uses_default_style() {
        let scene = campus_scene();
        let dataset = crate::dataset::store::fixtures::campus();
        let mut outlines = OutlineManager::new(&MapSettings::default());
        outlines.set_style(OutlineStyle::Single);

        outlines.outline_buildings(&scene, &dataset);
        assert_eq!(outlines.outlined().len(), 3);
        assert_eq!(outlines.style(), OutlineStyle::Default);
    }

    #[test]
    fn line_width_tracks_viewport() {
        let mut outlines = OutlineManager::new(&MapSettings::default());
        outlines.resize(1920, 1080);
        let base = outlines.line_width();
        outlines.resize(3840, 2160);
        assert!(outlines.line_width() > base);
        assert_eq!(
            outlines.style_settings(OutlineStyle::Hover).color,
            crate::core::HexColor::new(0x0bff02)
        );
    }
}
