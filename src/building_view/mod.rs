//! Building view: isolate one building and browse its storeys room by room.
pub mod components;
pub mod controller;
pub mod plugin;
pub mod systems;

pub use components::{BuildingViewChanged, BuildingViewRequest};
pub use controller::{BuildingViewController, BuildingViewStatus, ViewContext};
pub use plugin::BuildingViewPlugin;
pub use systems::ViewParams;
