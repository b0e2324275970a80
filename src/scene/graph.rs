//! Scene-graph seam: the operations the map needs from whatever owns the meshes.
use bevy::{ecs::entity::Entity, math::Vec3};

use crate::core::HexColor;

/// Opaque handle to a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl From<Entity> for NodeId {
    fn from(entity: Entity) -> Self {
        Self(entity.to_bits())
    }
}

/// World-space axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |bounds, point| Self {
            min: bounds.min.min(point),
            max: bounds.max.max(point),
        }))
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn translated(self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Sphere circumscribing the box.
    pub fn sphere(&self) -> BoundingSphere {
        BoundingSphere {
            center: self.center(),
            radius: (self.max - self.min).length() * 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

/// Read and toggle access to the rendered scene.
///
/// The map never creates or destroys nodes; it looks them up by name,
/// flips visibility, moves interior geometry and recolours materials.
pub trait SceneGraph {
    fn find(&self, name: &str) -> Option<NodeId>;
    fn name(&self, node: NodeId) -> Option<&str>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn children(&self, node: NodeId) -> Vec<NodeId>;
    fn is_mesh(&self, node: NodeId) -> bool;
    fn is_visible(&self, node: NodeId) -> bool;
    fn set_visible(&mut self, node: NodeId, visible: bool);
    /// Box around every mesh in the node's subtree.
    fn world_bounds(&self, node: NodeId) -> Option<Bounds>;
    fn translate(&mut self, node: NodeId, offset: Vec3);
    /// Gives the mesh its own material the first time it is called and returns
    /// the colour it had before any highlighting.
    fn isolate_material(&mut self, node: NodeId) -> Option<HexColor>;
    fn set_color(&mut self, node: NodeId, color: HexColor);

    /// Recolours a mesh and makes the new colour the one highlights restore.
    fn set_base_color(&mut self, node: NodeId, color: HexColor);

    /// Visible itself and through every ancestor.
    fn is_visible_in_hierarchy(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(node) = current {
            if !self.is_visible(node) {
                return false;
            }
            current = self.parent(node);
        }
        true
    }

    /// Hides the mesh children of `node`, making intermediate groups visible when recursing.
    fn hide_mesh_children(&mut self, node: NodeId, recursive: bool) {
        self.set_mesh_children_visible(node, false, recursive);
    }

    /// Shows the mesh children of `node`, making intermediate groups visible when recursing.
    fn unhide_mesh_children(&mut self, node: NodeId, recursive: bool) {
        self.set_mesh_children_visible(node, true, recursive);
    }

    #[doc(hidden)]
    fn set_mesh_children_visible(&mut self, node: NodeId, visible: bool, recursive: bool) {
        for child in self.children(node) {
            if self.is_mesh(child) {
                self.set_visible(child, visible);
            } else if recursive {
                self.set_visible(child, true);
                self.set_mesh_children_visible(child, visible, recursive);
            }
        }
    }

    /// Bounding sphere around the named meshes, skipping names absent from the scene.
    fn bounding_sphere_of(&self, names: &[String]) -> Option<BoundingSphere> {
        names
            .iter()
            .filter_map(|name| self.find(name))
            .filter_map(|node| self.world_bounds(node))
            .reduce(Bounds::union)
            .map(|bounds| bounds.sphere())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_normalise_corners() {
        let bounds = Bounds::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 2.0));
        assert_eq!(bounds.min, Vec3::ZERO);
        assert_eq!(bounds.max, Vec3::splat(2.0));
    }

    #[test]
    fn sphere_circumscribes_box() {
        let bounds = Bounds::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let sphere = bounds.sphere();
        assert_eq!(sphere.center, Vec3::ZERO);
        assert!((sphere.radius - 3.0_f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn union_covers_both_boxes() {
        let a = Bounds::new(Vec3::ZERO, Vec3::ONE);
        let b = Bounds::new(Vec3::splat(3.0), Vec3::splat(4.0));
        let union = a.union(b);
        assert_eq!(union.min, Vec3::ZERO);
        assert_eq!(union.max, Vec3::splat(4.0));
        assert_eq!(
            Bounds::from_points([Vec3::ONE, Vec3::ZERO, Vec3::splat(4.0)]),
            Some(union)
        );
    }
}
