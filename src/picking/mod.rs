//! Picking: from a click or a key to a highlighted object, building view and camera flight.
pub mod components;
pub mod info;
pub mod plugin;
pub mod resolver;
pub mod systems;

pub use components::{PickChanged, PickRequest};
pub use info::{InfoContent, InfoPane};
pub use plugin::PickingPlugin;
pub use resolver::{Pick, PickContext, PickResolver};
