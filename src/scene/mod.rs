//! Scene access: the `SceneGraph` seam, its in-memory and Bevy implementations,
//! and the plugin that loads and styles the campus model.
pub mod components;
pub mod graph;
pub mod memory;
pub mod plugin;
pub mod styling;
pub mod systems;
pub mod world;

pub use components::ScenePrepared;
pub use graph::{BoundingSphere, Bounds, NodeId, SceneGraph};
pub use memory::MemoryScene;
pub use plugin::ScenePlugin;
pub use world::WorldScene;
