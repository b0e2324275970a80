//! Feeds location fixes into the tracker, moves the camera and draws the marker.
use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;

use super::tracker::{FixOutcome, LocationFix, LocationTracker};
use crate::camera::CameraRig;

const MARKER_COLOR: Color = Color::srgb(0.1, 0.45, 1.0);
const ACCURACY_COLOR: Color = Color::srgba(0.1, 0.45, 1.0, 0.5);
const MARKER_RADIUS: f32 = 3.0;

pub fn apply_location_fixes(
    mut fixes: MessageReader<LocationFix>,
    mut tracker: ResMut<LocationTracker>,
    mut rig: ResMut<CameraRig>,
) {
    for fix in fixes.read() {
        match tracker.apply(fix) {
            FixOutcome::First(position) => {
                let distance = tracker.framing_distance();
                info!(target: "location", "Centring on first location fix at {:?}", position);
                rig.zoom_to_coordinates(position, Some(distance));
            }
            FixOutcome::Moved(position) => {
                debug!(target: "location", "Location moved to {:?}", position);
            }
            FixOutcome::OutsideMap => warn!(
                target: "location",
                "Location {:.5}, {:.5} is outside the map",
                fix.latitude,
                fix.longitude
            ),
        }
    }
}

/// `L` brings the camera back to the marker.
pub fn recentre_on_location(
    keyboard: Res<ButtonInput<KeyCode>>,
    tracker: Res<LocationTracker>,
    mut rig: ResMut<CameraRig>,
) {
    if !keyboard.just_pressed(KeyCode::KeyL) {
        return;
    }
    match tracker.position() {
        Some(position) => {
            rig.zoom_to_coordinates(position, Some(tracker.framing_distance()));
        }
        None => info!(target: "location", "No location to centre on"),
    }
}

pub fn draw_location_marker(tracker: Res<LocationTracker>, mut gizmos: Gizmos) {
    let Some(position) = tracker.position() else {
        return;
    };
    // Circles lie flat on the ground plane.
    let flat = Isometry3d::new(position, Quat::from_rotation_x(FRAC_PI_2));
    gizmos.circle(flat, MARKER_RADIUS, MARKER_COLOR);
    if tracker.accuracy() > MARKER_RADIUS {
        gizmos.circle(flat, tracker.accuracy(), ACCURACY_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location_app() -> App {
        let mut app = App::new();
        app.insert_resource(LocationTracker::new([84_000.0, 443_500.0, 87_000.0, 448_000.0]))
            .insert_resource(CameraRig::default())
            .init_resource::<ButtonInput<KeyCode>>()
            .add_message::<LocationFix>()
            .add_systems(Update, (apply_location_fixes, recentre_on_location).chain());
        app
    }

    fn send(app: &mut App, latitude: f64, longitude: f64) {
        app.world_mut().write_message(LocationFix {
            latitude,
            longitude,
            accuracy: 10.0,
        });
    }

    #[test]
    fn first_fix_on_the_map_moves_the_camera() {
        let mut app = location_app();
        send(&mut app, 52.37, 4.89);
        app.update();
        assert!(!app.world().resource::<CameraRig>().is_animating());
        assert_eq!(app.world().resource::<LocationTracker>().position(), None);

        send(&mut app, 52.0, 4.37);
        app.update();
        assert!(app.world().resource::<CameraRig>().is_animating());
        assert!(app.world().resource::<LocationTracker>().position().is_some());
    }

    #[test]
    fn recentre_key_needs_a_location() {
        let mut app = location_app();
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyL);
        app.update();
        assert!(!app.world().resource::<CameraRig>().is_animating());

        let mut app = location_app();
        send(&mut app, 52.0, 4.37);
        app.update();
        app.world_mut().resource_mut::<CameraRig>().cancel();
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyL);
        app.update();
        assert!(app.world().resource::<CameraRig>().is_animating());
    }
}
