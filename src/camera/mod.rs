//! Camera rig with map, orbit and plan projections plus animated transitions.
pub mod components;
pub mod config;
pub mod mode;
pub mod plugin;
pub mod rig;
pub mod systems;
pub mod tween;

pub use components::{MapCamera, MapClicked};
pub use config::CameraSettings;
pub use mode::CameraMode;
pub use plugin::{CameraPlugin, CameraSet};
pub use rig::{CameraEvent, CameraRig, CameraStep, TransitionId};
