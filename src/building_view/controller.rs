//! Interior mode: one building isolated, one storey of rooms shown.
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use bevy::prelude::*;

use crate::{
    camera::{CameraMode, CameraRig},
    core::MapError,
    dataset::{CityDataset, CityObjectKind, DEFAULT_STOREY},
    highlight::{OutlineManager, OutlineStyle},
    layers::LayerManager,
    scene::{NodeId, SceneGraph},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildingViewStatus {
    #[default]
    NotInitialised,
    Initialised,
    Activated,
}

impl fmt::Display for BuildingViewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BuildingViewStatus::NotInitialised => "not initialised",
            BuildingViewStatus::Initialised => "initialised",
            BuildingViewStatus::Activated => "activated",
        })
    }
}

/// Everything building view touches while it changes state.
pub struct ViewContext<'a, S: SceneGraph + ?Sized> {
    pub scene: &'a mut S,
    pub dataset: &'a CityDataset,
    pub rig: &'a mut CameraRig,
    pub layers: &'a mut LayerManager,
    pub outlines: &'a mut OutlineManager,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct BuildingViewController {
    status: BuildingViewStatus,
    building: Option<String>,
    storey: Option<String>,
    /// Storey code → storey keys of the current building.
    storeys: BTreeMap<String, Vec<String>>,
    mode_before_activation: Option<CameraMode>,
}

impl BuildingViewController {
    pub fn status(&self) -> BuildingViewStatus {
        self.status
    }

    pub fn is_activated(&self) -> bool {
        self.status == BuildingViewStatus::Activated
    }

    pub fn building(&self) -> Option<&str> {
        self.building.as_deref()
    }

    pub fn storey(&self) -> Option<&str> {
        self.storey.as_deref()
    }

    /// Camera mode that was active when the view was last activated.
    pub fn mode_before_activation(&self) -> Option<CameraMode> {
        self.mode_before_activation
    }

    /// Storey codes of the current building, numeric codes in numeric order.
    pub fn available_storeys(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.storeys.keys().cloned().collect();
        codes.sort_by(|a, b| compare_storey_codes(a, b));
        codes
    }

    /// Room keys on the current storey.
    pub fn current_rooms(&self, dataset: &CityDataset) -> Vec<String> {
        let Some(storey) = self.storey.as_deref() else {
            return Vec::new();
        };
        self.storeys
            .get(storey)
            .map(|keys| {
                dataset
                    .rooms_of_storeys(keys)
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Record `building` and its storey index. Buildings without a floor plan
    /// leave the view uninitialised and return `Ok(false)`.
    pub fn initialise(
        &mut self,
        dataset: &CityDataset,
        building: &str,
        storey: Option<&str>,
    ) -> Result<bool, MapError> {
        if self.is_activated() {
            return Err(MapError::invalid_state(
                format!("initialise building view on {building}"),
                self.status,
            ));
        }
        let object = dataset.require(building)?;
        if object.kind != CityObjectKind::Building {
            return Err(MapError::UnsupportedPickType {
                key: building.to_string(),
                kind: object.kind.to_string(),
            });
        }

        self.uninitialise()?;
        if !dataset.has_floor_plan(building) {
            debug!(target: "building_view", "{} has no floor plan", building);
            return Ok(false);
        }

        let storeys = dataset.storey_index(building);
        let code = match storey {
            Some(code) if storeys.contains_key(code) => code.to_string(),
            Some(code) => {
                return Err(MapError::InvalidStorey {
                    building: building.to_string(),
                    code: code.to_string(),
                })
            }
            None if storeys.contains_key(DEFAULT_STOREY) => DEFAULT_STOREY.to_string(),
            None => storeys
                .keys()
                .min_by(|a, b| compare_storey_codes(a, b))
                .cloned()
                .unwrap_or_else(|| DEFAULT_STOREY.to_string()),
        };

        self.building = Some(building.to_string());
        self.storey = Some(code);
        self.storeys = storeys;
        self.status = BuildingViewStatus::Initialised;
        info!(
            target: "building_view",
            "Building view initialised on {} (storey {})",
            building,
            self.storey.as_deref().unwrap_or_default()
        );
        Ok(true)
    }

    /// A building was picked from outside: leave any active view and record
    /// `building` without entering it.
    pub fn select_building<S: SceneGraph + ?Sized>(
        &mut self,
        ctx: &mut ViewContext<'_, S>,
        building: &str,
    ) -> Result<(), MapError> {
        if self.is_activated() {
            let same = self.building() == Some(building);
            self.deactivate(ctx)?;
            if same {
                return Ok(());
            }
        }
        if self.building() == Some(building) {
            return Ok(());
        }
        self.uninitialise()?;
        self.initialise(ctx.dataset, building, None).map(|_| ())
    }

    /// Show `storey` of `building` in an active view, whatever the current state.
    /// Switching buildings keeps the camera mode remembered from the first activation.
    pub fn enter<S: SceneGraph + ?Sized>(
        &mut self,
        ctx: &mut ViewContext<'_, S>,
        building: &str,
        storey: &str,
    ) -> Result<(), MapError> {
        if !ctx.dataset.storey_index(building).contains_key(storey) {
            return Err(MapError::InvalidStorey {
                building: building.to_string(),
                code: storey.to_string(),
            });
        }
        if self.is_activated() && self.building() == Some(building) {
            return self.set_storey(ctx, storey);
        }

        let remembered = if self.is_activated() {
            let mode = self.mode_before_activation;
            self.deactivate(ctx)?;
            mode
        } else {
            None
        };
        if self.building() == Some(building) {
            self.set_storey(ctx, storey)?;
        } else {
            self.uninitialise()?;
            self.initialise(ctx.dataset, building, Some(storey))?;
        }
        self.activate(ctx)?;
        if remembered.is_some() {
            self.mode_before_activation = remembered;
        }
        Ok(())
    }

    /// Enter the interior of the initialised building.
    pub fn activate<S: SceneGraph + ?Sized>(&mut self, ctx: &mut ViewContext<'_, S>) -> Result<(), MapError> {
        match self.status {
            BuildingViewStatus::Activated => return Ok(()),
            BuildingViewStatus::NotInitialised => {
                return Err(MapError::invalid_state("activate building view", self.status))
            }
            BuildingViewStatus::Initialised => {}
        }
        let building = self.current_building()?;
        let node = ctx
            .scene
            .find(&building)
            .ok_or_else(|| MapError::missing_mesh(building.clone()))?;

        self.mode_before_activation = Some(ctx.rig.active_mode());
        if ctx.rig.active_mode() != CameraMode::Orthographic {
            ctx.rig.switch_to(CameraMode::Orthographic);
        }

        set_other_buildings_visible(ctx.scene, ctx.dataset, &building, false);
        ctx.scene.unhide_mesh_children(node, true);
        ctx.scene.hide_mesh_children(node, false);

        self.status = BuildingViewStatus::Activated;
        self.update_view(ctx)?;
        info!(target: "building_view", "Building view activated on {}", building);
        Ok(())
    }

    /// Switch storey; when active the visible rooms follow.
    pub fn set_storey<S: SceneGraph + ?Sized>(
        &mut self,
        ctx: &mut ViewContext<'_, S>,
        code: &str,
    ) -> Result<(), MapError> {
        let building = self.current_building()?;
        if !self.storeys.contains_key(code) {
            return Err(MapError::InvalidStorey {
                building,
                code: code.to_string(),
            });
        }
        if self.storey.as_deref() == Some(code) {
            return Ok(());
        }
        self.storey = Some(code.to_string());
        debug!(target: "building_view", "{} storey -> {}", building, code);
        if self.is_activated() {
            self.update_view(ctx)?;
        }
        Ok(())
    }

    pub fn storey_up<S: SceneGraph + ?Sized>(
        &mut self,
        ctx: &mut ViewContext<'_, S>,
    ) -> Result<Option<String>, MapError> {
        self.step_storey(ctx, 1)
    }

    pub fn storey_down<S: SceneGraph + ?Sized>(
        &mut self,
        ctx: &mut ViewContext<'_, S>,
    ) -> Result<Option<String>, MapError> {
        self.step_storey(ctx, -1)
    }

    /// Move to a neighbouring storey, stopping at either end.
    fn step_storey<S: SceneGraph + ?Sized>(
        &mut self,
        ctx: &mut ViewContext<'_, S>,
        step: isize,
    ) -> Result<Option<String>, MapError> {
        let storeys = self.available_storeys();
        let Some(current) = self.storey.as_deref() else {
            return Err(MapError::invalid_state("change storey", self.status));
        };
        let Some(index) = storeys.iter().position(|code| code == current) else {
            return Ok(None);
        };
        let Some(next) = index
            .checked_add_signed(step)
            .and_then(|next| storeys.get(next))
            .cloned()
        else {
            return Ok(None);
        };
        self.set_storey(ctx, &next)?;
        Ok(Some(next))
    }

    /// Leave the interior but keep the building recorded.
    pub fn deactivate<S: SceneGraph + ?Sized>(&mut self, ctx: &mut ViewContext<'_, S>) -> Result<(), MapError> {
        if !self.is_activated() {
            return Ok(());
        }
        let building = self.current_building()?;
        if let Some(node) = ctx.scene.find(&building) {
            ctx.scene.hide_mesh_children(node, true);
            ctx.scene.unhide_mesh_children(node, false);
        }
        set_other_buildings_visible(ctx.scene, ctx.dataset, &building, true);
        ctx.layers
            .remove_interior_building_layers(ctx.scene, ctx.dataset, true);
        ctx.outlines.outline_buildings(ctx.scene, ctx.dataset);
        self.status = BuildingViewStatus::Initialised;
        info!(target: "building_view", "Building view deactivated on {}", building);
        Ok(())
    }

    /// Deactivate and hand the camera back to the mode it had before activation.
    pub fn leave<S: SceneGraph + ?Sized>(&mut self, ctx: &mut ViewContext<'_, S>) -> Result<(), MapError> {
        if !self.is_activated() {
            return Ok(());
        }
        self.deactivate(ctx)?;
        if let Some(mode) = self.mode_before_activation.take() {
            ctx.rig.switch_to(mode);
        }
        Ok(())
    }

    /// Forget the building entirely. An active view must be deactivated first.
    pub fn uninitialise(&mut self) -> Result<(), MapError> {
        match self.status {
            BuildingViewStatus::NotInitialised => Ok(()),
            BuildingViewStatus::Activated => {
                Err(MapError::invalid_state("uninitialise building view", self.status))
            }
            BuildingViewStatus::Initialised => {
                self.building = None;
                self.storey = None;
                self.storeys.clear();
                self.status = BuildingViewStatus::NotInitialised;
                Ok(())
            }
        }
    }

    /// Show only the current storey's rooms and refresh interior layers and outlines.
    fn update_view<S: SceneGraph + ?Sized>(&mut self, ctx: &mut ViewContext<'_, S>) -> Result<(), MapError> {
        let building = self.current_building()?;
        let storey = self
            .storey
            .clone()
            .ok_or_else(|| MapError::invalid_state("update building view", self.status))?;
        let node = ctx
            .scene
            .find(&building)
            .ok_or_else(|| MapError::missing_mesh(building.clone()))?;
        ctx.scene.hide_mesh_children(node, true);

        let rooms = self.current_rooms(ctx.dataset);
        for room in &rooms {
            let Some(room_node) = ctx.scene.find(room) else {
                debug!(target: "building_view", "Room {} not in scene", room);
                continue;
            };
            lift_above_ground(ctx.scene, room_node);
            ctx.scene.unhide_mesh_children(room_node, false);
        }

        ctx.layers
            .add_interior_building_layers(ctx.scene, ctx.dataset, &building, &storey);
        ctx.outlines
            .set_outline(ctx.scene, &rooms, "lod_0", OutlineStyle::Single);
        Ok(())
    }

    fn current_building(&self) -> Result<String, MapError> {
        self.building
            .clone()
            .ok_or_else(|| MapError::invalid_state("use building view", self.status))
    }
}

/// Rooms exported below the ground plane are raised so their floor sits at zero.
/// The correction is kept for the rest of the session.
fn lift_above_ground<S: SceneGraph + ?Sized>(scene: &mut S, room: NodeId) {
    let Some(bounds) = scene.world_bounds(room) else {
        return;
    };
    if bounds.min.y < 0.0 {
        scene.translate(room, Vec3::new(0.0, -bounds.min.y, 0.0));
        debug!(target: "building_view", "Lifted room by {:.2}", -bounds.min.y);
    }
}

fn set_other_buildings_visible<S: SceneGraph + ?Sized>(
    scene: &mut S,
    dataset: &CityDataset,
    active: &str,
    visible: bool,
) {
    for key in dataset.building_keys().iter().filter(|key| *key != active) {
        if let Some(node) = scene.find(key) {
            scene.set_visible(node, visible);
        }
    }
}

/// Numeric when both codes parse as integers, otherwise lexicographic.
pub fn compare_storey_codes(a: &str, b: &str) -> Ordering {
    match (a.parse::<i32>(), b.parse::<i32>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::{
        core::MapSettings, dataset::store::fixtures::campus,
        layers::manager::fixtures::initialised, scene::MemoryScene,
    };

    /// Owned state behind a `ViewContext` over the campus fixtures.
    pub struct Harness {
        pub scene: MemoryScene,
        pub dataset: CityDataset,
        pub rig: CameraRig,
        pub layers: LayerManager,
        pub outlines: OutlineManager,
    }

    impl Harness {
        pub fn new() -> Self {
            let (layers, scene) = initialised();
            let dataset = campus();
            let mut outlines = OutlineManager::new(&MapSettings::default());
            outlines.outline_buildings(&scene, &dataset);
            Self {
                scene,
                dataset,
                rig: CameraRig::default(),
                layers,
                outlines,
            }
        }

        pub fn ctx(&mut self) -> ViewContext<'_, MemoryScene> {
            ViewContext {
                scene: &mut self.scene,
                dataset: &self.dataset,
                rig: &mut self.rig,
                layers: &mut self.layers,
                outlines: &mut self.outlines,
            }
        }
    }
}
