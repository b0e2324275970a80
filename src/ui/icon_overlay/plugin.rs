// src/ui/icon_overlay/plugin.rs
//
// Plugin registration for icon overlays.

use bevy::prelude::*;

use super::components::{IconOverlaySettings, IconOverlayTracker};
use super::systems::{
    icon_overlay_clicks, position_icon_overlays, setup_icon_overlay_root, sync_icon_overlays,
};
use crate::camera::CameraSet;

/// Screen-space labels and layer icons that follow their world anchors.
///
/// # System Ordering
///
/// 1. `sync_icon_overlays` rebuilds nodes when the layer manager changed
/// 2. `position_icon_overlays` projects anchors through the synced camera
pub struct IconOverlayPlugin;

impl Plugin for IconOverlayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<IconOverlaySettings>()
            .init_resource::<IconOverlayTracker>()
            .add_systems(Startup, setup_icon_overlay_root)
            .add_systems(
                Update,
                (
                    icon_overlay_clicks,
                    (sync_icon_overlays, position_icon_overlays)
                        .chain()
                        .after(CameraSet::Sync),
                ),
            );
    }
}
