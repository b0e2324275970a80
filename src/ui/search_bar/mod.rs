// src/ui/search_bar/mod.rs
//
// Search box: type a space id, name or nickname and pick the best match.

pub mod components;
pub mod plugin;
pub mod systems;

pub use plugin::SearchBarPlugin;
