//! ScenePlugin loads the campus glTF and exposes it through the scene-graph seam.
use bevy::prelude::*;

use super::{
    components::{ScenePrepared, SceneStatus},
    systems::{prepare_scene, scene_pending, spawn_campus_scene},
    world::{index_scene_names, IsolatedMaterials, SceneNameIndex},
};

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneNameIndex>()
            .init_resource::<IsolatedMaterials>()
            .init_resource::<SceneStatus>()
            .add_message::<ScenePrepared>()
            .add_systems(Startup, spawn_campus_scene)
            .add_systems(PreUpdate, index_scene_names)
            .add_systems(Update, prepare_scene.run_if(scene_pending));
    }
}
