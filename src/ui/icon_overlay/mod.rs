// src/ui/icon_overlay/mod.rs
//
// Icon overlays: building labels and layer icons drawn over the 3D map.

pub mod components;
pub mod plugin;
pub mod systems;

pub use plugin::IconOverlayPlugin;
