//! Scene graph kept entirely in memory, used headless and in tests.
use std::collections::HashMap;

use bevy::math::Vec3;

use super::graph::{Bounds, NodeId, SceneGraph};
use crate::core::HexColor;

#[derive(Debug, Clone)]
struct MeshData {
    local_bounds: Bounds,
    color: HexColor,
    initial_color: Option<HexColor>,
}

#[derive(Debug, Clone)]
struct MemoryNode {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    visible: bool,
    offset: Vec3,
    mesh: Option<MeshData>,
}

/// Arena-backed scene graph.
#[derive(Debug, Default, Clone)]
pub struct MemoryScene {
    nodes: Vec<MemoryNode>,
    by_name: HashMap<String, NodeId>,
    material_clones: usize,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, name: &str, parent: Option<NodeId>) -> NodeId {
        self.push(name, parent, None)
    }

    pub fn add_mesh(
        &mut self,
        name: &str,
        parent: Option<NodeId>,
        bounds: Bounds,
        color: HexColor,
    ) -> NodeId {
        self.push(
            name,
            parent,
            Some(MeshData {
                local_bounds: bounds,
                color,
                initial_color: None,
            }),
        )
    }

    /// Number of materials cloned by `isolate_material` so far.
    pub fn material_clones(&self) -> usize {
        self.material_clones
    }

    pub fn color(&self, node: NodeId) -> Option<HexColor> {
        self.node(node)?.mesh.as_ref().map(|mesh| mesh.color)
    }

    /// Visibility of the named node, `None` when it does not exist.
    pub fn visible_by_name(&self, name: &str) -> Option<bool> {
        self.find(name).map(|node| self.is_visible(node))
    }

    fn push(&mut self, name: &str, parent: Option<NodeId>, mesh: Option<MeshData>) -> NodeId {
        let id = NodeId(self.nodes.len() as u64);
        self.nodes.push(MemoryNode {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            visible: true,
            offset: Vec3::ZERO,
            mesh,
        });
        if let Some(parent) = parent.and_then(|parent| self.node_mut(parent)) {
            parent.children.push(id);
        }
        self.by_name.insert(name.to_string(), id);
        id
    }

    fn node(&self, node: NodeId) -> Option<&MemoryNode> {
        self.nodes.get(node.0 as usize)
    }

    fn node_mut(&mut self, node: NodeId) -> Option<&mut MemoryNode> {
        self.nodes.get_mut(node.0 as usize)
    }

    fn world_offset(&self, node: NodeId) -> Vec3 {
        let mut offset = Vec3::ZERO;
        let mut current = Some(node);
        while let Some(id) = current {
            let Some(entry) = self.node(id) else {
                break;
            };
            offset += entry.offset;
            current = entry.parent;
        }
        offset
    }

    fn collect_bounds(&self, node: NodeId, acc: &mut Option<Bounds>) {
        let Some(entry) = self.node(node) else {
            return;
        };
        if let Some(mesh) = &entry.mesh {
            let bounds = mesh.local_bounds.translated(self.world_offset(node));
            *acc = Some(match acc.take() {
                Some(existing) => existing.union(bounds),
                None => bounds,
            });
        }
        for child in &entry.children {
            self.collect_bounds(*child, acc);
        }
    }
}

impl SceneGraph for MemoryScene {
    fn find(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    fn name(&self, node: NodeId) -> Option<&str> {
        self.node(node).map(|entry| entry.name.as_str())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|entry| entry.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .map(|entry| entry.children.clone())
            .unwrap_or_default()
    }

    fn is_mesh(&self, node: NodeId) -> bool {
        self.node(node).is_some_and(|entry| entry.mesh.is_some())
    }

    fn is_visible(&self, node: NodeId) -> bool {
        self.node(node).is_some_and(|entry| entry.visible)
    }

    fn set_visible(&mut self, node: NodeId, visible: bool) {
        if let Some(entry) = self.node_mut(node) {
            entry.visible = visible;
        }
    }

    fn world_bounds(&self, node: NodeId) -> Option<Bounds> {
        let mut bounds = None;
        self.collect_bounds(node, &mut bounds);
        bounds
    }

    fn translate(&mut self, node: NodeId, offset: Vec3) {
        if let Some(entry) = self.node_mut(node) {
            entry.offset += offset;
        }
    }

    fn isolate_material(&mut self, node: NodeId) -> Option<HexColor> {
        let mesh = self.node_mut(node)?.mesh.as_mut()?;
        if let Some(initial) = mesh.initial_color {
            return Some(initial);
        }
        let initial = mesh.color;
        mesh.initial_color = Some(initial);
        self.material_clones += 1;
        Some(initial)
    }

    fn set_color(&mut self, node: NodeId, color: HexColor) {
        if let Some(mesh) = self.node_mut(node).and_then(|entry| entry.mesh.as_mut()) {
            mesh.color = color;
        }
    }

    fn set_base_color(&mut self, node: NodeId, color: HexColor) {
        self.isolate_material(node);
        if let Some(mesh) = self.node_mut(node).and_then(|entry| entry.mesh.as_mut()) {
            mesh.color = color;
            mesh.initial_color = Some(color);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::campus_scene;
    use super::*;

    #[test]
    fn hiding_recurses_through_groups() {
        let mut scene = campus_scene();
        let building = scene.find("Building-02").unwrap();

        scene.hide_mesh_children(building, true);
        assert_eq!(scene.visible_by_name("Building-02-lod_2"), Some(false));
        assert_eq!(scene.visible_by_name("Room-A-lod_0"), Some(false));
        assert_eq!(scene.visible_by_name("Storey-02-00"), Some(true));

        scene.unhide_mesh_children(building, false);
        assert_eq!(scene.visible_by_name("Building-02-lod_2"), Some(true));
        assert_eq!(scene.visible_by_name("Room-A-lod_0"), Some(false));
    }

    #[test]
    fn hierarchy_visibility_checks_ancestors() {
        let mut scene = campus_scene();
        let building = scene.find("Building-02").unwrap();
        let room = scene.find("Room-A-lod_0").unwrap();
        assert!(scene.is_visible_in_hierarchy(room));

        scene.set_visible(building, false);
        assert!(scene.is_visible(room));
        assert!(!scene.is_visible_in_hierarchy(room));
    }

    #[test]
    fn translation_moves_subtree_bounds() {
        let mut scene = campus_scene();
        let room = scene.find("Room-C").unwrap();
        let before = scene.world_bounds(room).unwrap();

        scene.translate(room, Vec3::new(0.0, 3.0, 0.0));
        let after = scene.world_bounds(room).unwrap();
        assert_eq!(after.min.y, before.min.y + 3.0);
    }

    #[test]
    fn materials_are_isolated_once() {
        let mut scene = campus_scene();
        let mesh = scene.find("Room-A-lod_0").unwrap();

        let first = scene.isolate_material(mesh);
        scene.set_color(mesh, HexColor::new(0xffea00));
        let second = scene.isolate_material(mesh);

        assert_eq!(first, second);
        assert_eq!(scene.material_clones(), 1);
        assert!(scene.isolate_material(scene.find("Room-A").unwrap()).is_none());
    }

    #[test]
    fn bounding_sphere_skips_missing_names() {
        let scene = campus_scene();
        let sphere = scene
            .bounding_sphere_of(&["Room-A-lod_0".into(), "Ghost-lod_0".into()])
            .unwrap();
        assert_eq!(sphere.center, Vec3::new(95.0, 2.0, 0.0));
        assert!(scene.bounding_sphere_of(&["Ghost-lod_0".into()]).is_none());
    }
}
