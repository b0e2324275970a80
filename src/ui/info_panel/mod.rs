// src/ui/info_panel/mod.rs
//
// Info panel: bottom-right details of the picked building, room or unit.

pub mod components;
pub mod plugin;
pub mod systems;

pub use plugin::InfoPanelPlugin;
