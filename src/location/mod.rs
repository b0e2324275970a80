//! The user's position on the map: Dutch grid projection, fix tracking and the marker.
pub mod plugin;
pub mod rd;
pub mod systems;
pub mod tracker;

pub use plugin::LocationPlugin;
pub use tracker::LocationFix;
