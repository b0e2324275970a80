// src/ui/map_controls/plugin.rs
//
// MapControlsPlugin: HUD, camera buttons, storey switcher and layer list.

use bevy::prelude::*;

use super::systems::{
    button_hover_feedback, handle_control_buttons, spawn_map_controls, toggle_layer_group_items,
    update_hud, update_layer_buttons, update_storey_panel,
};
use crate::camera::CameraSet;

pub struct MapControlsPlugin;

impl Plugin for MapControlsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_map_controls).add_systems(
            Update,
            (
                handle_control_buttons.in_set(CameraSet::Input),
                button_hover_feedback,
                toggle_layer_group_items,
                update_layer_buttons,
                update_storey_panel,
                update_hud.after(CameraSet::Sync),
            ),
        );
    }
}
