// src/ui/info_panel/components.rs
//
// Components and resources for the info panel.

use bevy::prelude::*;

/// Root node of the info panel.
#[derive(Component, Debug)]
pub struct InfoPanel {
    key: String,
}

impl InfoPanel {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Object the panel describes.
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Buttons inside the info panel.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoPanelAction {
    EnterBuildingView,
    Close,
}

/// Tracks the panel currently on screen; at most one exists.
#[derive(Resource, Debug, Default)]
pub struct InfoPanelTracker {
    pub active_panel: Option<Entity>,
}

/// Layout of the info panel.
#[derive(Resource, Debug)]
pub struct InfoPanelSettings {
    /// Panel width (pixels).
    pub panel_width: f32,

    /// Maximum panel height (pixels).
    pub panel_max_height: f32,

    pub padding: f32,
    pub border_width: f32,

    /// Offset from the bottom edge of the window (pixels).
    pub bottom_offset: f32,

    /// Offset from the right edge of the window (pixels).
    pub right_offset: f32,

    pub title_font_size: f32,
    pub text_font_size: f32,
}

impl Default for InfoPanelSettings {
    fn default() -> Self {
        Self {
            panel_width: 350.0,
            panel_max_height: 420.0,
            padding: 12.0,
            border_width: 2.0,
            bottom_offset: 20.0,
            right_offset: 20.0,
            title_font_size: 18.0,
            text_font_size: 14.0,
        }
    }
}
