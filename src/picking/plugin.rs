use bevy::prelude::*;

use super::{
    components::{PickChanged, PickRequest},
    info::InfoPane,
    resolver::PickResolver,
    systems::{apply_pick_requests, hover_outline, pick_on_click, picking_shortcuts},
};
use crate::camera::CameraSet;

pub struct PickingPlugin;

impl Plugin for PickingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PickResolver>()
            .init_resource::<InfoPane>()
            .add_message::<PickRequest>()
            .add_message::<PickChanged>()
            .add_systems(
                Update,
                (
                    (picking_shortcuts, apply_pick_requests, pick_on_click).chain(),
                    hover_outline,
                )
                    .after(CameraSet::Input)
                    .before(CameraSet::Animate),
            );
    }
}
