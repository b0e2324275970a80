//! Resources and messages describing the loaded campus scene.
use bevy::prelude::*;

/// Root entity of the spawned campus glTF.
#[derive(Component, Debug, Default)]
pub struct CampusSceneRoot;

/// Tracks whether the scene has been indexed and styled.
#[derive(Resource, Debug, Default)]
pub struct SceneStatus {
    pub prepared: bool,
}

/// Sent once, after base colours are applied and every building mesh is indexed.
#[derive(Message, Debug, Clone)]
pub struct ScenePrepared {
    pub indexed_nodes: usize,
}
