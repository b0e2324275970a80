//! Thematic layers: definitions, the active set, unit geometry and icon sets.
pub mod activation;
pub mod components;
pub mod definitions;
pub mod groups;
pub mod icons;
pub mod manager;
pub mod plugin;
pub mod systems;

pub use components::{SetImportanceBaseline, SetLayerGroup, ToggleLayer};
pub use definitions::LayerCatalog;
pub use groups::{GroupState, LayerGroups};
pub use icons::{IconContext, IconSet};
pub use manager::LayerManager;
pub use plugin::LayersPlugin;
