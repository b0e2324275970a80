//! Visual emphasis: pick highlighting and outlines.
pub mod highlighter;
pub mod outline;
pub mod plugin;
pub mod systems;

pub use highlighter::Highlighter;
pub use outline::{OutlineManager, OutlineStyle};
pub use plugin::HighlightPlugin;
