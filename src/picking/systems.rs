//! Ray-cast picking and the systems that route pick requests.
use bevy::{
    ecs::system::SystemParam,
    picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings, RayCastVisibility},
    prelude::*,
    window::{CursorMoved, PrimaryWindow},
};

use super::{
    components::{PickChanged, PickRequest},
    info::InfoPane,
    resolver::{PickContext, PickResolver},
};
use crate::{
    building_view::{BuildingViewController, ViewParams},
    camera::{MapCamera, MapClicked},
    core::MapError,
    dataset::CityObjectKind,
    highlight::Highlighter,
    scene::{NodeId, SceneGraph, WorldScene},
};

/// Resources a pick reads and writes.
#[derive(SystemParam)]
pub struct PickParams<'w, 's> {
    pub map: ViewParams<'w, 's>,
    pub resolver: ResMut<'w, PickResolver>,
    pub highlighter: ResMut<'w, Highlighter>,
    pub view: ResMut<'w, BuildingViewController>,
    pub info: ResMut<'w, InfoPane>,
}

impl<'w, 's> PickParams<'w, 's> {
    fn run<R>(
        &mut self,
        action: impl FnOnce(&mut PickResolver, &mut PickContext<'_, WorldScene<'w, 's>>) -> R,
    ) -> R {
        let mut ctx = PickContext {
            scene: &mut self.map.scene,
            dataset: &*self.map.dataset,
            rig: &mut *self.map.rig,
            layers: &mut *self.map.layers,
            outlines: &mut *self.map.outlines,
            highlighter: &mut *self.highlighter,
            view: &mut *self.view,
            info: &mut *self.info,
        };
        action(&mut *self.resolver, &mut ctx)
    }

    pub fn pick(&mut self, name: &str) -> Result<(), MapError> {
        self.run(|resolver, ctx| resolver.pick_mesh(ctx, name).map(|_| ()))
    }

    pub fn unpick(&mut self) -> Result<(), MapError> {
        self.run(|resolver, ctx| resolver.unpick(ctx))
    }

    pub fn toggle_projection(&mut self) -> Result<(), MapError> {
        self.run(|resolver, ctx| resolver.toggle_projection(ctx))
    }

    fn current_key(&self) -> Option<String> {
        self.resolver.current().map(|pick| pick.key.clone())
    }
}

fn settings() -> MeshRayCastSettings<'static> {
    MeshRayCastSettings::default().with_visibility(RayCastVisibility::Visible)
}

/// Nearest visible named node under a window position.
fn node_under_cursor(
    position: Vec2,
    cameras: &Query<(&Camera, &GlobalTransform), With<MapCamera>>,
    ray_cast: &mut MeshRayCast,
    scene: &WorldScene,
) -> Option<NodeId> {
    let (camera, transform) = cameras.single().ok()?;
    let ray = camera.viewport_to_world(transform, position).ok()?;
    let (entity, _) = ray_cast.cast_ray(ray, &settings()).first()?;
    scene.named_node_for(*entity)
}

/// Clicks on the map pick what is under them, or clear the pick on empty ground.
pub fn pick_on_click(
    mut clicks: MessageReader<MapClicked>,
    cameras: Query<(&Camera, &GlobalTransform), With<MapCamera>>,
    mut ray_cast: MeshRayCast,
    mut params: PickParams,
    mut changed: MessageWriter<PickChanged>,
) {
    for click in clicks.read() {
        let hit = node_under_cursor(click.position, &cameras, &mut ray_cast, &params.map.scene)
            .and_then(|node| params.map.scene.name(node).map(str::to_string));
        let result = match &hit {
            Some(name) => params.pick(name),
            None => params.unpick(),
        };
        if let Err(err) = result {
            warn!(target: "picking", "Pick at {:?} failed: {}", click.position, err);
        }
        changed.write(PickChanged {
            key: params.current_key(),
        });
    }
}

pub fn apply_pick_requests(
    mut requests: MessageReader<PickRequest>,
    mut params: PickParams,
    mut changed: MessageWriter<PickChanged>,
) {
    for request in requests.read() {
        let result = match request {
            PickRequest::Key(name) => params.pick(name),
            PickRequest::Clear => params.unpick(),
            PickRequest::ToggleProjection => params.toggle_projection(),
        };
        if let Err(err) = result {
            warn!(target: "picking", "{:?} failed: {}", request, err);
        }
        if !matches!(request, PickRequest::ToggleProjection) {
            changed.write(PickChanged {
                key: params.current_key(),
            });
        }
    }
}

/// `V` toggles 2D/3D, `Escape` clears the pick.
pub fn picking_shortcuts(keys: Res<ButtonInput<KeyCode>>, mut requests: MessageWriter<PickRequest>) {
    if keys.just_pressed(KeyCode::KeyV) {
        requests.write(PickRequest::ToggleProjection);
    }
    if keys.just_pressed(KeyCode::Escape) {
        requests.write(PickRequest::Clear);
    }
}

/// Outlines the building or room under the cursor in the hover style.
pub fn hover_outline(
    mut moved: MessageReader<CursorMoved>,
    windows: Query<(), With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<MapCamera>>,
    mut ray_cast: MeshRayCast,
    mut params: ViewParams,
) {
    let Some(event) = moved.read().filter(|event| windows.contains(event.window)).last() else {
        return;
    };
    let hovered = node_under_cursor(event.position, &cameras, &mut ray_cast, &params.scene)
        .filter(|node| {
            params
                .scene
                .name(*node)
                .and_then(|name| params.dataset.resolve_key(name).ok())
                .is_some_and(|resolved| {
                    matches!(
                        resolved.kind,
                        CityObjectKind::Building | CityObjectKind::BuildingRoom
                    )
                })
        });
    if params.outlines.hovered() != hovered {
        params.outlines.set_hovered(hovered);
    }
}
