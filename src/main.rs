use std::path::Path;

use bevy::prelude::*;

mod building_view;
mod camera;
mod core;
mod dataset;
mod feedback;
mod highlight;
mod layers;
mod location;
mod picking;
mod scene;
mod ui;

use crate::{
    building_view::BuildingViewPlugin, camera::CameraPlugin, core::CorePlugin,
    dataset::DatasetPlugin, feedback::FeedbackPlugin, highlight::HighlightPlugin,
    layers::LayersPlugin, location::LocationPlugin, picking::PickingPlugin, scene::ScenePlugin, ui::UiPlugin,
};

fn main() {
    load_env_overrides();

    App::new()
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Campus Map".into(),
                    ..default()
                }),
                ..default()
            }),
            CorePlugin::default(),
            DatasetPlugin,
            ScenePlugin,
            HighlightPlugin,
            CameraPlugin,
            LayersPlugin,
            LocationPlugin,
            BuildingViewPlugin,
            PickingPlugin,
            UiPlugin,
            FeedbackPlugin,
        ))
        .run();
}

/// Loads `CAMPUSMAP_*` overrides before `CorePlugin` reads the map settings.
fn load_env_overrides() {
    const ENV_FILE: &str = "campusmap.env";

    let path = Path::new(ENV_FILE);
    if !path.exists() {
        return;
    }

    if let Err(err) = dotenvy::from_filename(path) {
        eprintln!("Failed to load {}: {}", ENV_FILE, err);
    }
}
