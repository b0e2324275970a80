//! Colour emphasis for picked meshes.
use bevy::prelude::*;

use crate::{
    core::HexColor,
    scene::{NodeId, SceneGraph},
};

/// Recolours the picked meshes and remembers what to restore.
#[derive(Resource, Debug)]
pub struct Highlighter {
    color: HexColor,
    highlighted: Vec<(NodeId, HexColor)>,
}

impl Highlighter {
    pub fn new(color: HexColor) -> Self {
        Self {
            color,
            highlighted: Vec::new(),
        }
    }

    pub fn color(&self) -> HexColor {
        self.color
    }

    /// Replaces the current highlight with `meshes`.
    pub fn highlight<S: SceneGraph + ?Sized>(&mut self, scene: &mut S, meshes: &[NodeId]) {
        self.unhighlight(scene);
        for &mesh in meshes {
            let Some(initial) = scene.isolate_material(mesh) else {
                debug!(target: "highlight", "{:?} has no material to highlight", mesh);
                continue;
            };
            scene.set_color(mesh, self.color);
            self.highlighted.push((mesh, initial));
        }
    }

    pub fn unhighlight<S: SceneGraph + ?Sized>(&mut self, scene: &mut S) {
        for (mesh, initial) in self.highlighted.drain(..) {
            scene.set_color(mesh, initial);
        }
    }

    pub fn highlighted(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.highlighted.iter().map(|(mesh, _)| *mesh)
    }

    pub fn is_active(&self) -> bool {
        !self.highlighted.is_empty()
    }
}
