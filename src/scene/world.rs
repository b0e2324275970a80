//! Bevy-backed scene graph: glTF nodes addressed by their `Name`.
use std::collections::HashMap;

use bevy::{
    camera::primitives::Aabb,
    ecs::system::SystemParam,
    prelude::*,
};

use super::graph::{Bounds, NodeId, SceneGraph};
use crate::core::HexColor;

/// `Name` → entity lookup for every named node in the loaded scene.
#[derive(Resource, Debug, Default)]
pub struct SceneNameIndex {
    by_name: HashMap<String, Entity>,
}

impl SceneNameIndex {
    pub fn get(&self, name: &str) -> Option<Entity> {
        self.by_name.get(name).copied()
    }

    pub fn insert(&mut self, name: &str, entity: Entity) {
        self.by_name.insert(name.to_string(), entity);
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }
}

/// Colours the isolated materials had before the map recoloured them.
#[derive(Resource, Debug, Default)]
pub struct IsolatedMaterials {
    initial: HashMap<Entity, HexColor>,
}

impl NodeId {
    pub fn entity(self) -> Entity {
        Entity::from_bits(self.0)
    }
}

/// Indexes newly named entities. glTF primitives that repeat their parent's
/// name are skipped so names resolve to the node rather than one primitive.
pub fn index_scene_names(
    mut index: ResMut<SceneNameIndex>,
    added: Query<(Entity, &Name, Option<&ChildOf>), Added<Name>>,
    names: Query<&Name>,
) {
    for (entity, name, child_of) in added.iter() {
        let repeats_parent = child_of
            .and_then(|child_of| names.get(child_of.parent()).ok())
            .is_some_and(|parent_name| parent_name.as_str() == name.as_str());
        if repeats_parent {
            continue;
        }
        index.insert(name.as_str(), entity);
    }
}

#[derive(SystemParam)]
pub struct WorldScene<'w, 's> {
    index: Res<'w, SceneNameIndex>,
    names: Query<'w, 's, &'static Name>,
    parents: Query<'w, 's, &'static ChildOf>,
    children: Query<'w, 's, &'static Children>,
    meshes: Query<'w, 's, (), With<Mesh3d>>,
    visibility: Query<'w, 's, &'static mut Visibility>,
    bounds: Query<'w, 's, (&'static Aabb, &'static GlobalTransform)>,
    globals: Query<'w, 's, &'static GlobalTransform>,
    transforms: Query<'w, 's, &'static mut Transform>,
    material_handles: Query<'w, 's, &'static mut MeshMaterial3d<StandardMaterial>>,
    materials: ResMut<'w, Assets<StandardMaterial>>,
    isolated: ResMut<'w, IsolatedMaterials>,
}

impl WorldScene<'_, '_> {
    /// Closest ancestor (or the entity itself) that the name index resolves to.
    pub fn named_node_for(&self, entity: Entity) -> Option<NodeId> {
        let mut current = Some(entity);
        while let Some(candidate) = current {
            if let Ok(name) = self.names.get(candidate) {
                if self.index.get(name.as_str()) == Some(candidate) {
                    return Some(candidate.into());
                }
            }
            current = self.parents.get(candidate).ok().map(ChildOf::parent);
        }
        None
    }

    fn child_entities(&self, entity: Entity) -> Vec<Entity> {
        self.children
            .get(entity)
            .map(|children| children.to_vec())
            .unwrap_or_default()
    }

    /// Entities holding the mesh and material of a mesh node.
    fn primitives(&self, entity: Entity) -> Vec<Entity> {
        if self.meshes.contains(entity) {
            return vec![entity];
        }
        self.child_entities(entity)
            .into_iter()
            .filter(|child| self.meshes.contains(*child))
            .collect()
    }

    fn collect_bounds(&self, entity: Entity, acc: &mut Option<Bounds>) {
        if let Ok((aabb, global)) = self.bounds.get(entity) {
            let center = Vec3::from(aabb.center);
            let half = Vec3::from(aabb.half_extents);
            let corners = (0..8).map(|corner| {
                let sign = Vec3::new(
                    if corner & 1 == 0 { -1.0 } else { 1.0 },
                    if corner & 2 == 0 { -1.0 } else { 1.0 },
                    if corner & 4 == 0 { -1.0 } else { 1.0 },
                );
                global.transform_point(center + half * sign)
            });
            if let Some(bounds) = Bounds::from_points(corners) {
                *acc = Some(match acc.take() {
                    Some(existing) => existing.union(bounds),
                    None => bounds,
                });
            }
        }
        for child in self.child_entities(entity) {
            self.collect_bounds(child, acc);
        }
    }

    fn apply_color(&mut self, entity: Entity, color: HexColor) {
        for primitive in self.primitives(entity) {
            let Ok(handle) = self.material_handles.get(primitive) else {
                continue;
            };
            if let Some(material) = self.materials.get_mut(&handle.0) {
                material.base_color = color.to_color();
            }
        }
    }
}

impl SceneGraph for WorldScene<'_, '_> {
    fn find(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).map(NodeId::from)
    }

    fn name(&self, node: NodeId) -> Option<&str> {
        self.names.get(node.entity()).ok().map(Name::as_str)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents
            .get(node.entity())
            .ok()
            .map(|child_of| child_of.parent().into())
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.child_entities(node.entity())
            .into_iter()
            .map(NodeId::from)
            .collect()
    }

    fn is_mesh(&self, node: NodeId) -> bool {
        !self.primitives(node.entity()).is_empty()
    }

    fn is_visible(&self, node: NodeId) -> bool {
        self.visibility
            .get(node.entity())
            .map(|visibility| *visibility != Visibility::Hidden)
            .unwrap_or(false)
    }

    fn set_visible(&mut self, node: NodeId, visible: bool) {
        if let Ok(mut visibility) = self.visibility.get_mut(node.entity()) {
            *visibility = if visible {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
        }
    }

    fn world_bounds(&self, node: NodeId) -> Option<Bounds> {
        let mut bounds = None;
        self.collect_bounds(node.entity(), &mut bounds);
        bounds
    }

    fn translate(&mut self, node: NodeId, offset: Vec3) {
        let entity = node.entity();
        // The offset is in world space; the scene root is rotated into Y-up.
        let local_offset = self
            .parents
            .get(entity)
            .ok()
            .and_then(|child_of| self.globals.get(child_of.parent()).ok())
            .map(|parent| parent.affine().inverse().transform_vector3(offset))
            .unwrap_or(offset);
        if let Ok(mut transform) = self.transforms.get_mut(entity) {
            transform.translation += local_offset;
        }
    }

    fn isolate_material(&mut self, node: NodeId) -> Option<HexColor> {
        let mut first = None;
        for primitive in self.primitives(node.entity()) {
            let cached = self.isolated.initial.get(&primitive).copied();
            let initial = match cached {
                Some(initial) => initial,
                None => {
                    let Ok(mut handle) = self.material_handles.get_mut(primitive) else {
                        continue;
                    };
                    let Some(material) = self.materials.get(&handle.0).cloned() else {
                        continue;
                    };
                    let initial = HexColor::from_color(material.base_color);
                    handle.0 = self.materials.add(material);
                    self.isolated.initial.insert(primitive, initial);
                    initial
                }
            };
            first.get_or_insert(initial);
        }
        first
    }

    fn set_color(&mut self, node: NodeId, color: HexColor) {
        self.apply_color(node.entity(), color);
    }

    fn set_base_color(&mut self, node: NodeId, color: HexColor) {
        self.isolate_material(node);
        self.apply_color(node.entity(), color);
        for primitive in self.primitives(node.entity()) {
            if self.isolated.initial.contains_key(&primitive) {
                self.isolated.initial.insert(primitive, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_round_trip_entities() {
        let mut world = World::new();
        let entity = world.spawn_empty().id();
        assert_eq!(NodeId::from(entity).entity(), entity);
    }

    #[test]
    fn index_prefers_nodes_over_primitives() {
        let mut app = App::new();
        app.init_resource::<SceneNameIndex>()
            .add_systems(Update, index_scene_names);

        let node = app.world_mut().spawn(Name::new("Room-A-lod_0")).id();
        let primitive = app
            .world_mut()
            .spawn((Name::new("Room-A-lod_0"), ChildOf(node)))
            .id();
        app.update();

        let index = app.world().resource::<SceneNameIndex>();
        assert_eq!(index.get("Room-A-lod_0"), Some(node));
        assert_ne!(index.get("Room-A-lod_0"), Some(primitive));
    }

    #[test]
    fn visibility_round_trips_through_world_scene() {
        let mut app = App::new();
        app.init_resource::<SceneNameIndex>()
            .init_resource::<IsolatedMaterials>()
            .init_resource::<Assets<StandardMaterial>>()
            .add_systems(Update, index_scene_names);
        let group = app
            .world_mut()
            .spawn((Name::new("Building-01"), Visibility::default()))
            .id();
        app.update();

        let mut state = bevy::ecs::system::SystemState::<WorldScene>::new(app.world_mut());
        {
            let mut scene = state.get_mut(app.world_mut());
            let node = scene.find("Building-01").expect("indexed");
            assert_eq!(node.entity(), group);
            assert!(scene.is_visible(node));
            scene.set_visible(node, false);
        }
        state.apply(app.world_mut());

        assert_eq!(
            app.world().get::<Visibility>(group),
            Some(&Visibility::Hidden)
        );
    }
}
