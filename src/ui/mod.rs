// src/ui/mod.rs
//
// Screen-space UI for the campus map.
//
// - Info panel (bottom-right details of the picked object)
// - Icon overlays (building labels and layer icons over the 3D view)
// - Map controls (HUD, camera buttons, storey switcher, layer list)
// - Search bar (space ids, names and nicknames)

pub mod icon_overlay;
pub mod info_panel;
pub mod map_controls;
pub mod search_bar;

use bevy::prelude::*;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        info!(target: "ui", "UiPlugin registered");
        app.add_plugins((
            info_panel::InfoPanelPlugin,
            icon_overlay::IconOverlayPlugin,
            map_controls::MapControlsPlugin,
            search_bar::SearchBarPlugin,
        ));
    }
}
