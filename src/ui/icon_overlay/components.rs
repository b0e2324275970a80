// src/ui/icon_overlay/components.rs
//
// Screen-space overlays for icon sets anchored in the 3D world.

use std::collections::HashMap;

use bevy::prelude::*;

/// One icon set on screen: a clickable label and icon row that tracks a world anchor.
#[derive(Component, Debug)]
pub struct IconOverlay {
    /// Object picked when the overlay is clicked.
    key: String,
    anchor: Vec3,
}

impl IconOverlay {
    pub fn new(key: impl Into<String>, anchor: Vec3) -> Self {
        Self {
            key: key.into(),
            anchor,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }
}

/// Full-screen node all overlays are parented to.
#[derive(Resource, Debug)]
pub struct IconOverlayRoot(pub Entity);

/// Overlay entity per icon-set key.
#[derive(Resource, Debug, Default)]
pub struct IconOverlayTracker {
    pub by_key: HashMap<String, Entity>,
}

#[derive(Resource, Debug)]
pub struct IconOverlaySettings {
    /// Icon edge length (pixels).
    pub icon_size: f32,

    /// Font size for building labels (points).
    pub label_font_size: f32,

    /// Font size for fallback icon chips (points).
    pub chip_font_size: f32,
}

impl Default for IconOverlaySettings {
    fn default() -> Self {
        Self {
            icon_size: 22.0,
            label_font_size: 13.0,
            chip_font_size: 10.0,
        }
    }
}
