//! Shared timing, configuration, colours and error types used by every map subsystem.
pub mod color;
pub mod config;
pub mod errors;
pub mod plugin;

pub use color::HexColor;
pub use config::{MapSettings, OutlineStyleSettings};
pub use errors::MapError;
pub use plugin::{AnimationClock, CorePlugin};
