//! Camera tuning loaded from `config/camera.toml`.
use std::{fs, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

const CONFIG_PATH: &str = "config/camera.toml";

#[derive(Debug, Clone, Deserialize, Default)]
struct RawCameraConfig {
    #[serde(default)]
    lens: RawLensSection,
    #[serde(default)]
    home: RawHomeSection,
    #[serde(default)]
    animation: RawAnimationSection,
    #[serde(default)]
    controls: RawControlsSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawLensSection {
    fov_degrees: f32,
    near: f32,
    far: f32,
    orthographic_height: f32,
}

impl Default for RawLensSection {
    fn default() -> Self {
        Self {
            fov_degrees: 55.0,
            near: 0.1,
            far: 100_000.0,
            orthographic_height: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawHomeSection {
    position: [f32; 3],
    target: [f32; 3],
}

impl Default for RawHomeSection {
    fn default() -> Self {
        Self {
            position: [85715.0, 1100.0, -445780.0],
            target: [85743.0, 30.0, -445791.0],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawAnimationSection {
    fit_margin: f32,
    north_threshold_radians: f32,
    zoom_factor: f32,
    orthographic_switch_ms_per_radian: f32,
    north_base_ms: f32,
    north_ms_per_radian: f32,
    zoom_base_ms: f32,
    zoom_ms_per_sqrt_unit: f32,
    orthographic_zoom_ms: f32,
}

impl Default for RawAnimationSection {
    fn default() -> Self {
        Self {
            fit_margin: 1.2,
            north_threshold_radians: 0.05,
            zoom_factor: 1.8,
            orthographic_switch_ms_per_radian: 500.0,
            north_base_ms: 300.0,
            north_ms_per_radian: 500.0,
            zoom_base_ms: 300.0,
            zoom_ms_per_sqrt_unit: 30.0,
            orthographic_zoom_ms: 500.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawControlsSection {
    min_distance: f32,
    max_distance: f32,
    min_zoom: f32,
    max_zoom: f32,
    rotate_speed: f32,
    wheel_zoom_step: f32,
    pick_drag_threshold_px: f32,
}

impl Default for RawControlsSection {
    fn default() -> Self {
        Self {
            min_distance: 5.0,
            max_distance: 20_000.0,
            min_zoom: 0.02,
            max_zoom: 200.0,
            rotate_speed: 0.005,
            wheel_zoom_step: 0.1,
            pick_drag_threshold_px: 4.0,
        }
    }
}

/// Resolved camera settings.
#[derive(Resource, Debug, Clone)]
pub struct CameraSettings {
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Height of the plan camera above its target.
    pub orthographic_height: f32,
    pub home_position: Vec3,
    pub home_target: Vec3,
    /// Multiplier on the tightest fitting distance; never below 1.
    pub fit_margin: f32,
    pub north_threshold: f32,
    pub zoom_factor: f32,
    pub orthographic_switch_ms_per_radian: f32,
    pub north_base_ms: f32,
    pub north_ms_per_radian: f32,
    pub zoom_base_ms: f32,
    pub zoom_ms_per_sqrt_unit: f32,
    pub orthographic_zoom_ms: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub rotate_speed: f32,
    pub wheel_zoom_step: f32,
    pub pick_drag_threshold_px: f32,
}

impl CameraSettings {
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_PATH);
        match fs::read_to_string(path) {
            Ok(data) => match toml::from_str::<RawCameraConfig>(&data) {
                Ok(raw) => raw.into(),
                Err(err) => {
                    warn!(
                        "Failed to parse {} ({}). Falling back to defaults.",
                        CONFIG_PATH, err
                    );
                    RawCameraConfig::default().into()
                }
            },
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                RawCameraConfig::default().into()
            }
        }
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        RawCameraConfig::default().into()
    }
}

impl From<RawCameraConfig> for CameraSettings {
    fn from(value: RawCameraConfig) -> Self {
        let lens = value.lens;
        let home = value.home;
        let animation = value.animation;
        let controls = value.controls;

        let min_distance = controls.min_distance.max(0.01);
        let min_zoom = controls.min_zoom.max(0.001);

        Self {
            fov: lens.fov_degrees.clamp(5.0, 150.0).to_radians(),
            near: lens.near.max(0.001),
            far: lens.far.max(lens.near.max(0.001) * 10.0),
            orthographic_height: lens.orthographic_height.max(1.0),
            home_position: Vec3::from_array(home.position),
            home_target: Vec3::from_array(home.target),
            fit_margin: animation.fit_margin.max(1.0),
            north_threshold: animation.north_threshold_radians.clamp(0.0, 0.5),
            zoom_factor: animation.zoom_factor.max(1.01),
            orthographic_switch_ms_per_radian: animation.orthographic_switch_ms_per_radian.max(0.0),
            north_base_ms: animation.north_base_ms.max(0.0),
            north_ms_per_radian: animation.north_ms_per_radian.max(0.0),
            zoom_base_ms: animation.zoom_base_ms.max(0.0),
            zoom_ms_per_sqrt_unit: animation.zoom_ms_per_sqrt_unit.max(0.0),
            orthographic_zoom_ms: animation.orthographic_zoom_ms.max(0.0),
            min_distance,
            max_distance: controls.max_distance.max(min_distance),
            min_zoom,
            max_zoom: controls.max_zoom.max(min_zoom),
            rotate_speed: controls.rotate_speed.max(0.0),
            wheel_zoom_step: controls.wheel_zoom_step.clamp(0.01, 0.9),
            pick_drag_threshold_px: controls.pick_drag_threshold_px.max(0.0),
        }
    }
}
