//! Systems routing building-view requests into the controller.
use bevy::{ecs::system::SystemParam, prelude::*};

use super::{
    components::{BuildingViewChanged, BuildingViewRequest},
    controller::{BuildingViewController, ViewContext},
};
use crate::{
    camera::CameraRig, dataset::CityDataset, highlight::OutlineManager, layers::LayerManager,
    scene::WorldScene,
};

/// Resources building view mutates, bundled so callers stay under the system parameter limit.
#[derive(SystemParam)]
pub struct ViewParams<'w, 's> {
    pub scene: WorldScene<'w, 's>,
    pub dataset: Res<'w, CityDataset>,
    pub rig: ResMut<'w, CameraRig>,
    pub layers: ResMut<'w, LayerManager>,
    pub outlines: ResMut<'w, OutlineManager>,
}

impl<'w, 's> ViewParams<'w, 's> {
    pub fn ctx(&mut self) -> ViewContext<'_, WorldScene<'w, 's>> {
        ViewContext {
            scene: &mut self.scene,
            dataset: &*self.dataset,
            rig: &mut *self.rig,
            layers: &mut *self.layers,
            outlines: &mut *self.outlines,
        }
    }
}

pub fn building_view_shortcuts(
    keys: Res<ButtonInput<KeyCode>>,
    view: Res<BuildingViewController>,
    mut requests: MessageWriter<BuildingViewRequest>,
) {
    if keys.just_pressed(KeyCode::KeyB) {
        requests.write(if view.is_activated() {
            BuildingViewRequest::Exit
        } else {
            BuildingViewRequest::Enter
        });
    }
    if keys.just_pressed(KeyCode::PageUp) {
        requests.write(BuildingViewRequest::StoreyUp);
    }
    if keys.just_pressed(KeyCode::PageDown) {
        requests.write(BuildingViewRequest::StoreyDown);
    }
}

pub fn apply_building_view_requests(
    mut requests: MessageReader<BuildingViewRequest>,
    mut view: ResMut<BuildingViewController>,
    mut params: ViewParams,
) {
    for request in requests.read() {
        let mut ctx = params.ctx();
        let result = match request {
            BuildingViewRequest::Enter => view.activate(&mut ctx),
            BuildingViewRequest::Exit => view.leave(&mut ctx),
            BuildingViewRequest::StoreyUp => view.storey_up(&mut ctx).map(|_| ()),
            BuildingViewRequest::StoreyDown => view.storey_down(&mut ctx).map(|_| ()),
            BuildingViewRequest::SetStorey(code) => view.set_storey(&mut ctx, code),
        };
        if let Err(err) = result {
            warn!(target: "building_view", "{:?} ignored: {}", request, err);
        }
    }
}

/// Announces controller changes to the UI.
pub fn publish_building_view(
    view: Res<BuildingViewController>,
    mut changed: MessageWriter<BuildingViewChanged>,
) {
    if !view.is_changed() {
        return;
    }
    changed.write(BuildingViewChanged {
        status: view.status(),
        building: view.building().map(str::to_string),
        storey: view.storey().map(str::to_string),
        storeys: view.available_storeys(),
    });
}
