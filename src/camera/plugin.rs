//! CameraPlugin owns the rig and wires input, animation and rendering sync.
use bevy::prelude::*;

use super::{
    components::{MapClicked, PointerGesture},
    config::CameraSettings,
    rig::{CameraEvent, CameraRig},
    systems::{
        advance_camera_rig, camera_keyboard_shortcuts, camera_pointer_controls,
        forward_camera_events, resize_camera_rig, spawn_map_camera, sync_map_camera,
    },
};

/// System sets other plugins order against.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CameraSet {
    Input,
    Animate,
    Sync,
}

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<CameraSettings>() {
            app.insert_resource(CameraSettings::load_or_default());
        }
        let settings = app.world().resource::<CameraSettings>().clone();

        app.insert_resource(CameraRig::new(settings))
            .init_resource::<PointerGesture>()
            .add_message::<CameraEvent>()
            .add_message::<MapClicked>()
            .configure_sets(
                Update,
                (CameraSet::Input, CameraSet::Animate, CameraSet::Sync).chain(),
            )
            .add_systems(Startup, spawn_map_camera)
            .add_systems(
                Update,
                (
                    (resize_camera_rig, camera_pointer_controls, camera_keyboard_shortcuts)
                        .chain()
                        .in_set(CameraSet::Input),
                    advance_camera_rig.in_set(CameraSet::Animate),
                    (forward_camera_events, sync_map_camera).in_set(CameraSet::Sync),
                ),
            );
    }
}
