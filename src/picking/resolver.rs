//! Turns a picked node name into a city object and the navigation it implies.
use bevy::prelude::*;

use super::info::InfoPane;
use crate::{
    building_view::{BuildingViewController, BuildingViewStatus, ViewContext},
    camera::{CameraMode, CameraRig, CameraStep},
    core::MapError,
    dataset::{CityDataset, CityObjectKind},
    highlight::{Highlighter, OutlineManager},
    layers::LayerManager,
    scene::{BoundingSphere, NodeId, SceneGraph},
};

/// Everything a pick may touch.
pub struct PickContext<'a, S: SceneGraph + ?Sized> {
    pub scene: &'a mut S,
    pub dataset: &'a CityDataset,
    pub rig: &'a mut CameraRig,
    pub layers: &'a mut LayerManager,
    pub outlines: &'a mut OutlineManager,
    pub highlighter: &'a mut Highlighter,
    pub view: &'a mut BuildingViewController,
    pub info: &'a mut InfoPane,
}

impl<S: SceneGraph + ?Sized> PickContext<'_, S> {
    fn split(&mut self) -> (&mut BuildingViewController, ViewContext<'_, S>) {
        (
            &mut *self.view,
            ViewContext {
                scene: &mut *self.scene,
                dataset: self.dataset,
                rig: &mut *self.rig,
                layers: &mut *self.layers,
                outlines: &mut *self.outlines,
            },
        )
    }
}

/// Result of a successful pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    pub key: String,
    pub kind: CityObjectKind,
    pub building: String,
    /// Storey shown in building view, for rooms and units.
    pub storey: Option<String>,
}

#[derive(Resource, Debug, Default)]
pub struct PickResolver {
    current: Option<Pick>,
}

impl PickResolver {
    pub fn current(&self) -> Option<&Pick> {
        self.current.as_ref()
    }

    /// Pick the object behind a scene node name. Validation happens before any
    /// state changes, so a failed pick leaves highlight and camera untouched.
    pub fn pick_mesh<S: SceneGraph + ?Sized>(
        &mut self,
        ctx: &mut PickContext<'_, S>,
        name: &str,
    ) -> Result<Pick, MapError> {
        let resolved = ctx.dataset.resolve_key(name)?;
        let key = resolved.object_key;
        let pick = match resolved.kind {
            CityObjectKind::Building => self.pick_building(ctx, &key)?,
            CityObjectKind::BuildingRoom => self.pick_room(ctx, &key)?,
            CityObjectKind::BuildingUnit => self.pick_unit(ctx, &key)?,
            other => {
                return Err(MapError::UnsupportedPickType {
                    key,
                    kind: other.to_string(),
                })
            }
        };

        ctx.info.show(ctx.dataset, &pick.key)?;
        info!(
            target: "picking",
            "Picked {} {} in {}",
            pick.kind,
            pick.key,
            pick.building
        );
        self.current = Some(pick.clone());
        Ok(pick)
    }

    fn pick_building<S: SceneGraph + ?Sized>(
        &mut self,
        ctx: &mut PickContext<'_, S>,
        building: &str,
    ) -> Result<Pick, MapError> {
        let mesh_name = ctx.dataset.mesh_key(building)?;
        let mesh = require_node(ctx.scene, &mesh_name)?;
        let sphere = ctx.scene.bounding_sphere_of(std::slice::from_ref(&mesh_name));

        let (view, mut view_ctx) = ctx.split();
        view.select_building(&mut view_ctx, building)?;

        ctx.highlighter.highlight(ctx.scene, &[mesh]);
        match sphere {
            Some(sphere) => {
                ctx.rig.start([
                    CameraStep::SwitchMode(CameraMode::Orbit),
                    CameraStep::FrameSphere(sphere),
                ]);
            }
            None => warn!(
                target: "picking",
                "{}",
                MapError::animation_target_missing(format!("building {building}"))
            ),
        }

        Ok(Pick {
            key: building.to_string(),
            kind: CityObjectKind::Building,
            building: building.to_string(),
            storey: None,
        })
    }

    fn pick_room<S: SceneGraph + ?Sized>(
        &mut self,
        ctx: &mut PickContext<'_, S>,
        room: &str,
    ) -> Result<Pick, MapError> {
        let building = ctx.dataset.find_parent_building(room)?.to_string();
        let storey = ctx.dataset.room_storey_code(room)?;
        let mesh_name = ctx.dataset.mesh_key(room)?;
        let mesh = require_node(ctx.scene, &mesh_name)?;
        let target = ctx.scene.bounding_sphere_of(std::slice::from_ref(&mesh_name));

        enter_building_view(ctx, &building, &storey, target)?;
        ctx.highlighter.highlight(ctx.scene, &[mesh]);

        Ok(Pick {
            key: room.to_string(),
            kind: CityObjectKind::BuildingRoom,
            building,
            storey: Some(storey),
        })
    }

    fn pick_unit<S: SceneGraph + ?Sized>(
        &mut self,
        ctx: &mut PickContext<'_, S>,
        unit: &str,
    ) -> Result<Pick, MapError> {
        let dataset = ctx.dataset;
        let spaces = dataset.unit_spaces(unit);

        let mut buildings: Vec<String> = Vec::new();
        for room in spaces {
            let building = dataset.find_parent_building(room)?;
            if !buildings.iter().any(|known| known == building) {
                buildings.push(building.to_string());
            }
        }
        if buildings.len() > 1 {
            return Err(MapError::CrossBuildingUnit {
                key: unit.to_string(),
                buildings,
            });
        }
        let Some(building) = buildings.pop() else {
            return Err(MapError::UnsupportedUnit {
                key: unit.to_string(),
            });
        };
        let storey = majority_storey(dataset, spaces)?.ok_or_else(|| MapError::UnsupportedUnit {
            key: unit.to_string(),
        })?;

        let mesh_names: Vec<String> = spaces
            .iter()
            .filter_map(|room| dataset.mesh_key(room).ok())
            .collect();
        let meshes: Vec<NodeId> = mesh_names
            .iter()
            .filter_map(|name| ctx.scene.find(name))
            .collect();
        let target = ctx.scene.bounding_sphere_of(&mesh_names);

        enter_building_view(ctx, &building, &storey, target)?;
        ctx.highlighter.highlight(ctx.scene, &meshes);

        Ok(Pick {
            key: unit.to_string(),
            kind: CityObjectKind::BuildingUnit,
            building,
            storey: Some(storey),
        })
    }

    /// Clear the pick and step back out of building view and orbit.
    pub fn unpick<S: SceneGraph + ?Sized>(&mut self, ctx: &mut PickContext<'_, S>) -> Result<(), MapError> {
        ctx.highlighter.unhighlight(ctx.scene);

        let (view, mut view_ctx) = ctx.split();
        match view.status() {
            BuildingViewStatus::Activated => view.leave(&mut view_ctx)?,
            BuildingViewStatus::Initialised => view.uninitialise()?,
            BuildingViewStatus::NotInitialised => {}
        }
        if ctx.rig.active_mode() == CameraMode::Orbit {
            ctx.rig.switch_to(CameraMode::Map);
        }

        ctx.info.hide();
        if let Some(previous) = self.current.take() {
            debug!(target: "picking", "Unpicked {}", previous.key);
        }
        Ok(())
    }

    /// 2D/3D toggle. Leaving the plan view ends building view first.
    pub fn toggle_projection<S: SceneGraph + ?Sized>(
        &mut self,
        ctx: &mut PickContext<'_, S>,
    ) -> Result<(), MapError> {
        let (view, mut view_ctx) = ctx.split();
        if view_ctx.rig.active_mode() == CameraMode::Orthographic && view.is_activated() {
            view.deactivate(&mut view_ctx)?;
        }
        ctx.rig.toggle_projection();
        Ok(())
    }
}

/// Activate building view on `storey` and fly there: building first, then plan view, then `target`.
fn enter_building_view<S: SceneGraph + ?Sized>(
    ctx: &mut PickContext<'_, S>,
    building: &str,
    storey: &str,
    target: Option<BoundingSphere>,
) -> Result<(), MapError> {
    let building_sphere = ctx
        .dataset
        .mesh_key(building)
        .ok()
        .and_then(|name| ctx.scene.bounding_sphere_of(&[name]));

    let (view, mut view_ctx) = ctx.split();
    view.enter(&mut view_ctx, building, storey)?;

    let mut steps = Vec::with_capacity(3);
    steps.extend(building_sphere.map(CameraStep::FrameSphere));
    steps.push(CameraStep::SwitchMode(CameraMode::Orthographic));
    match target {
        Some(sphere) => steps.push(CameraStep::FrameSphere(sphere)),
        None => warn!(
            target: "picking",
            "{}",
            MapError::animation_target_missing(format!("pick inside {building}"))
        ),
    }
    ctx.rig.start(steps);
    Ok(())
}

fn require_node<S: SceneGraph + ?Sized>(scene: &S, name: &str) -> Result<NodeId, MapError> {
    scene.find(name).ok_or_else(|| MapError::missing_mesh(name))
}

/// Most common storey among `rooms`; ties go to the storey seen first.
pub fn majority_storey(dataset: &CityDataset, rooms: &[String]) -> Result<Option<String>, MapError> {
    let mut tally: Vec<(String, usize)> = Vec::new();
    for room in rooms {
        let code = dataset.room_storey_code(room)?;
        match tally.iter_mut().find(|(known, _)| *known == code) {
            Some((_, count)) => *count += 1,
            None => tally.push((code, 1)),
        }
    }
    Ok(tally
        .into_iter()
        .enumerate()
        .max_by(|(ia, (_, a)), (ib, (_, b))| a.cmp(b).then(ib.cmp(ia)))
        .map(|(_, (code, _))| code))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::{building_view::controller::fixtures::Harness, core::MapSettings, scene::MemoryScene};

    pub struct PickHarness {
        pub base: Harness,
        pub highlighter: Highlighter,
        pub view: BuildingViewController,
        pub info: InfoPane,
        pub resolver: PickResolver,
    }

    impl PickHarness {
        pub fn new() -> Self {
            Self {
                base: Harness::new(),
                highlighter: Highlighter::new(MapSettings::default().pick_color),
                view: BuildingViewController::default(),
                info: InfoPane::default(),
                resolver: PickResolver::default(),
            }
        }

        pub fn pick(&mut self, name: &str) -> Result<Pick, MapError> {
            let (resolver, mut ctx) = self.split();
            resolver.pick_mesh(&mut ctx, name)
        }

        pub fn unpick(&mut self) -> Result<(), MapError> {
            let (resolver, mut ctx) = self.split();
            resolver.unpick(&mut ctx)
        }

        pub fn toggle_projection(&mut self) -> Result<(), MapError> {
            let (resolver, mut ctx) = self.split();
            resolver.toggle_projection(&mut ctx)
        }

        /// Runs the camera until the current plan is done.
        pub fn settle(&mut self) {
            for _ in 0..1000 {
                if !self.base.rig.is_animating() {
                    return;
                }
                self.base.rig.advance(std::time::Duration::from_millis(500));
            }
            panic!("camera never settled");
        }

        fn split(&mut self) -> (&mut PickResolver, PickContext<'_, MemoryScene>) {
            (
                &mut self.resolver,
                PickContext {
                    scene: &mut self.base.scene,
                    dataset: &self.base.dataset,
                    rig: &mut self.base.rig,
                    layers: &mut self.base.layers,
                    outlines: &mut self.base.outlines,
                    highlighter: &mut self.highlighter,
                    view: &mut self.view,
                    info: &mut self.info,
                },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::PickHarness;
    use super::*;
    use crate::core::HexColor;

    const PICK: HexColor = HexColor::new(0xffea00);

    fn color_of(harness: &PickHarness, name: &str) -> Option<HexColor> {
        let scene = &harness.base.scene;
        scene.find(name).and_then(|node| scene.color(node))
    }

    #[test]
    fn building_without_floor_plan_is_highlighted_and_orbited() {
        let mut harness = PickHarness::new();

        let pick = harness.pick("Building-01-lod_2").unwrap();
        assert_eq!(pick.key, "Building-01");
        assert_eq!(color_of(&harness, "Building-01-lod_2"), Some(PICK));
        assert_eq!(harness.view.status(), BuildingViewStatus::NotInitialised);
        assert!(harness.base.rig.is_animating());

        harness.settle();
        assert_eq!(harness.base.rig.active_mode(), CameraMode::Orbit);
        let sphere = harness
            .base
            .scene
            .bounding_sphere_of(&["Building-01-lod_2".to_string()])
            .unwrap();
        let target = harness.base.rig.active_camera().target();
        assert!(target.distance(sphere.center) < 0.5);
        assert_eq!(harness.info.content().unwrap().key, "Building-01");
    }

    #[test]
    fn building_with_floor_plan_is_initialised() {
        let mut harness = PickHarness::new();

        harness.pick("Building-02").unwrap();
        assert_eq!(harness.view.status(), BuildingViewStatus::Initialised);
        assert_eq!(harness.view.building(), Some("Building-02"));
        assert!(harness.info.content().unwrap().building_view_hint);
    }

    #[test]
    fn room_pick_activates_building_view_in_plan() {
        let mut harness = PickHarness::new();

        let pick = harness.pick("Room-A-lod_0").unwrap();
        assert_eq!(pick.building, "Building-02");
        assert_eq!(pick.storey.as_deref(), Some("00"));
        assert!(harness.view.is_activated());
        assert_eq!(harness.view.storey(), Some("00"));

        harness.settle();
        assert_eq!(harness.base.rig.active_mode(), CameraMode::Orthographic);
        let scene = &harness.base.scene;
        assert_eq!(scene.visible_by_name("Room-A-lod_0"), Some(true));
        assert_eq!(scene.visible_by_name("Building-01"), Some(false));
        assert_eq!(scene.visible_by_name("Building-03"), Some(false));
        assert_eq!(scene.visible_by_name("Building-02-lod_2"), Some(false));
        assert_eq!(color_of(&harness, "Room-A-lod_0"), Some(PICK));
    }

    #[test]
    fn room_pick_moves_between_buildings_and_storeys() {
        let mut harness = PickHarness::new();
        harness.pick("Room-D").unwrap();
        harness.settle();
        assert_eq!(harness.view.building(), Some("Building-03"));

        harness.pick("Room-C-lod_0").unwrap();
        assert!(harness.view.is_activated());
        assert_eq!(harness.view.building(), Some("Building-02"));
        assert_eq!(harness.view.storey(), Some("01"));
        assert_eq!(harness.view.mode_before_activation(), Some(CameraMode::Map));
        assert_eq!(harness.base.scene.visible_by_name("Building-03"), Some(false));
        assert_ne!(color_of(&harness, "Room-D-lod_0"), Some(PICK));
    }

    #[test]
    fn unit_pick_uses_majority_storey_and_highlights_all_rooms() {
        let mut harness = PickHarness::new();

        let pick = harness.pick("Unit-Hall").unwrap();
        assert_eq!(pick.storey.as_deref(), Some("00"));
        assert_eq!(harness.view.storey(), Some("00"));
        assert_eq!(harness.highlighter.highlighted().count(), 3);
    }

    #[test]
    fn invalid_picks_leave_state_untouched() {
        let mut harness = PickHarness::new();
        harness.pick("Building-01").unwrap();
        harness.settle();

        assert!(matches!(
            harness.pick("Unit-Split"),
            Err(MapError::CrossBuildingUnit { ref buildings, .. }) if buildings.len() == 2
        ));
        assert!(matches!(
            harness.pick("Unit-Empty"),
            Err(MapError::UnsupportedUnit { .. })
        ));
        assert!(matches!(
            harness.pick("Tree-01"),
            Err(MapError::UnsupportedPickType { ref kind, .. }) if kind == "SolitaryVegetationObject"
        ));
        assert!(matches!(
            harness.pick("Ghost-lod_0"),
            Err(MapError::UnknownEntity { .. })
        ));

        assert_eq!(color_of(&harness, "Building-01-lod_2"), Some(PICK));
        assert_eq!(harness.resolver.current().unwrap().key, "Building-01");
        assert_eq!(harness.base.rig.active_mode(), CameraMode::Orbit);
        assert!(!harness.base.rig.is_animating());
    }

    #[test]
    fn picking_active_building_leaves_interior() {
        let mut harness = PickHarness::new();
        harness.pick("Room-A").unwrap();
        harness.settle();

        harness.pick("Building-02-lod_2").unwrap();
        assert_eq!(harness.view.status(), BuildingViewStatus::Initialised);
        assert_eq!(harness.base.scene.visible_by_name("Building-01"), Some(true));
        harness.settle();
        assert_eq!(harness.base.rig.active_mode(), CameraMode::Orbit);
    }

    #[test]
    fn unpick_restores_map_view() {
        let mut harness = PickHarness::new();
        harness.pick("Room-A").unwrap();
        harness.settle();

        harness.unpick().unwrap();
        harness.settle();
        assert_eq!(harness.view.status(), BuildingViewStatus::Initialised);
        assert_eq!(harness.base.rig.active_mode(), CameraMode::Map);
        assert!(!harness.highlighter.is_active());
        assert!(!harness.info.is_visible());
        assert!(harness.resolver.current().is_none());

        harness.unpick().unwrap();
        assert_eq!(harness.view.status(), BuildingViewStatus::NotInitialised);
    }

    #[test]
    fn leaving_plan_view_ends_building_view() {
        let mut harness = PickHarness::new();
        harness.pick("Room-A").unwrap();
        harness.settle();

        harness.toggle_projection().unwrap();
        harness.settle();
        assert_eq!(harness.view.status(), BuildingViewStatus::Initialised);
        assert!(harness.base.rig.active_camera().mode.is_perspective());
        assert_eq!(harness.base.scene.visible_by_name("Building-03"), Some(true));
    }

    #[test]
    fn majority_vote_breaks_ties_by_first_seen() {
        let dataset = crate::dataset::store::fixtures::campus();
        let rooms = vec!["Room-C".to_string(), "Room-A".to_string()];
        assert_eq!(majority_storey(&dataset, &rooms), Ok(Some("01".to_string())));
        assert_eq!(majority_storey(&dataset, &[]), Ok(None));
    }
}
