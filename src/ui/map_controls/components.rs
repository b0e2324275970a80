// src/ui/map_controls/components.rs
//
// Markers and actions for the map's control panels.

use bevy::prelude::*;

/// Buttons of the control panels.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub enum ControlAction {
    ToggleProjection,
    ResetNorth,
    ResetView,
    ZoomIn,
    ZoomOut,
    StoreyUp,
    StoreyDown,
    ExitBuildingView,
    SetStorey(String),
    ToggleLayer(String),
    /// Group checkbox: all members on, or all off when already fully on.
    ToggleLayerGroup(String),
    /// Caret that expands or collapses a group's layer list.
    CollapseLayerGroup(String),
}

/// Text node showing the camera mode and compass bearing.
#[derive(Component, Debug)]
pub struct MapHud;

/// Storey switcher, visible only inside a building.
#[derive(Component, Debug)]
pub struct StoreyPanel;

/// Text node naming the current storey.
#[derive(Component, Debug)]
pub struct StoreyLabel;

/// Row of per-storey buttons, rebuilt when the building's storeys change.
#[derive(Component, Debug, Default)]
pub struct StoreyButtons {
    pub spawned: Vec<Entity>,
    pub storeys: Vec<String>,
}

/// Text of a group checkbox.
#[derive(Component, Debug)]
pub struct LayerGroupLabel {
    pub group: String,
}

/// Text of a group's expand/collapse caret.
#[derive(Component, Debug)]
pub struct LayerGroupCaret {
    pub group: String,
}

/// Collapsible container of one group's layer buttons.
#[derive(Component, Debug)]
pub struct LayerGroupItems {
    pub group: String,
}

/// Layer list entry.
#[derive(Component, Debug)]
pub struct LayerButton {
    pub code: String,
}
