//! LocationPlugin tracks the user's position and keeps the marker on the map.
use std::env;

use bevy::prelude::*;

use super::{
    systems::{apply_location_fixes, draw_location_marker, recentre_on_location},
    tracker::{LocationFix, LocationTracker},
};
use crate::{camera::CameraSet, core::MapSettings};

/// Fixed fix for machines without a positioning service.
const LOCATION_ENV: &str = "CAMPUSMAP_LOCATION";

pub struct LocationPlugin;

impl Plugin for LocationPlugin {
    fn build(&self, app: &mut App) {
        let bounds = app
            .world()
            .get_resource::<MapSettings>()
            .map(|settings| settings.location_bounds)
            .unwrap_or_else(|| MapSettings::default().location_bounds);

        app.insert_resource(LocationTracker::new(bounds))
            .add_message::<LocationFix>()
            .add_systems(Startup, read_location_from_env)
            .add_systems(
                Update,
                (
                    (apply_location_fixes, recentre_on_location)
                        .chain()
                        .in_set(CameraSet::Input),
                    draw_location_marker,
                ),
            );
    }
}

fn read_location_from_env(mut fixes: MessageWriter<LocationFix>) {
    let Ok(raw) = env::var(LOCATION_ENV) else {
        return;
    };
    match LocationFix::parse(&raw) {
        Some(fix) => {
            info!(target: "location", "Using {} = {:?}", LOCATION_ENV, raw);
            fixes.write(fix);
        }
        None => warn!(target: "location", "Ignoring malformed {} = {:?}", LOCATION_ENV, raw),
    }
}
