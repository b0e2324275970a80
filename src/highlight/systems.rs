//! Systems keeping outlines in sync with the window and drawing them.
use bevy::{prelude::*, window::WindowResized};

use super::outline::{OutlineManager, OutlineStyle};
use crate::{
    dataset::CityDataset,
    scene::{NodeId, SceneGraph, ScenePrepared, WorldScene},
};

pub fn apply_default_outline(
    mut prepared: MessageReader<ScenePrepared>,
    mut outlines: ResMut<OutlineManager>,
    dataset: Res<CityDataset>,
    scene: WorldScene,
) {
    if prepared.read().last().is_none() {
        return;
    }
    outlines.outline_buildings(&scene, &dataset);
    info!(
        target: "highlight",
        "Outlining {} building shells",
        outlines.outlined().len()
    );
}

pub fn resize_outlines(
    mut resized: MessageReader<WindowResized>,
    mut outlines: ResMut<OutlineManager>,
) {
    if let Some(event) = resized.read().last() {
        outlines.resize(event.width as u32, event.height as u32);
    }
}

pub fn apply_outline_line_width(
    outlines: Res<OutlineManager>,
    mut config_store: ResMut<GizmoConfigStore>,
) {
    if !outlines.is_changed() {
        return;
    }
    let (config, _) = config_store.config_mut::<DefaultGizmoConfigGroup>();
    config.line.width = outlines.line_width();
}

/// Draws each outlined mesh as a box around its world bounds.
pub fn draw_outlines(outlines: Res<OutlineManager>, scene: WorldScene, mut gizmos: Gizmos) {
    let color = outlines.style_settings(outlines.style()).color.to_color();
    for &node in outlines.outlined() {
        draw_node(&scene, &mut gizmos, node, color);
    }
    if let Some(hovered) = outlines.hovered() {
        let hover = outlines.style_settings(OutlineStyle::Hover).color.to_color();
        draw_node(&scene, &mut gizmos, hovered, hover);
    }
}

fn draw_node(scene: &WorldScene, gizmos: &mut Gizmos, node: NodeId, color: Color) {
    if !scene.is_visible_in_hierarchy(node) {
        return;
    }
    if let Some(bounds) = scene.world_bounds(node) {
        let size = (bounds.max - bounds.min).max(Vec3::splat(0.01));
        gizmos.cuboid(
            Transform::from_translation(bounds.center()).with_scale(size),
            color,
        );
    }
}
