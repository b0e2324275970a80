use bevy::prelude::*;

use super::{
    components::{BuildingViewChanged, BuildingViewRequest},
    controller::BuildingViewController,
    systems::{apply_building_view_requests, building_view_shortcuts, publish_building_view},
};
use crate::camera::CameraSet;

pub struct BuildingViewPlugin;

impl Plugin for BuildingViewPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BuildingViewController>()
            .add_message::<BuildingViewRequest>()
            .add_message::<BuildingViewChanged>()
            .add_systems(
                Update,
                (
                    building_view_shortcuts,
                    apply_building_view_requests,
                    publish_building_view,
                )
                    .chain()
                    .before(CameraSet::Animate),
            );
    }
}
