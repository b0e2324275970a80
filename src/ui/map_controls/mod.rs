// src/ui/map_controls/mod.rs
//
// Map controls: compass HUD, 2D/3D and zoom buttons, storey switcher, layer list.

pub mod components;
pub mod plugin;
pub mod systems;

pub use plugin::MapControlsPlugin;
