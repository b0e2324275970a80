// src/ui/info_panel/plugin.rs
//
// InfoPanelPlugin shows the picked object's details in the bottom-right corner.

use bevy::prelude::*;

use super::components::{InfoPanelSettings, InfoPanelTracker};
use super::systems::{handle_info_panel_buttons, refresh_info_panel};

pub struct InfoPanelPlugin;

impl Plugin for InfoPanelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InfoPanelSettings>()
            .init_resource::<InfoPanelTracker>()
            .add_systems(
                Update,
                (refresh_info_panel, handle_info_panel_buttons),
            );
    }
}
