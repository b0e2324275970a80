//! Systems driving the camera rig from input and time, and mirroring it onto
//! the rendering camera.
use bevy::{
    camera::ScalingMode,
    input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel},
    prelude::*,
    window::{PrimaryWindow, WindowResized},
};

use super::{
    components::{MapCamera, MapClicked, PointerGesture},
    mode::{CameraMode, ModeCamera, ProjectionParams},
    rig::{CameraEvent, CameraRig},
};
use crate::core::AnimationClock;

/// Pixel-unit scroll events per wheel notch.
const PIXELS_PER_NOTCH: f32 = 100.0;

pub fn spawn_map_camera(
    mut commands: Commands,
    mut rig: ResMut<CameraRig>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    if let Ok(window) = windows.single() {
        rig.resize(window.width(), window.height());
    }
    let camera = rig.active_camera();
    commands.spawn((
        Camera3d::default(),
        projection_for(camera),
        camera.transform(),
        MapCamera,
        Name::new("map camera"),
    ));
    info!(
        target: "camera",
        "Map camera spawned at {:?} looking at {:?}",
        camera.position,
        camera.target()
    );
}

pub fn advance_camera_rig(clock: Res<AnimationClock>, mut rig: ResMut<CameraRig>) {
    if !rig.is_animating() {
        return;
    }
    rig.advance(clock.last_scaled_delta());
}

pub fn forward_camera_events(mut rig: ResMut<CameraRig>, mut writer: MessageWriter<CameraEvent>) {
    if !rig.has_events() {
        return;
    }
    for event in rig.drain_events() {
        writer.write(event);
    }
}

pub fn sync_map_camera(
    rig: Res<CameraRig>,
    mut cameras: Query<(&mut Transform, &mut Projection), With<MapCamera>>,
) {
    if !rig.is_changed() {
        return;
    }
    let camera = rig.active_camera();
    for (mut transform, mut projection) in &mut cameras {
        *transform = camera.transform();
        *projection = projection_for(camera);
    }
}

pub fn resize_camera_rig(mut resized: MessageReader<WindowResized>, mut rig: ResMut<CameraRig>) {
    if let Some(event) = resized.read().last() {
        rig.resize(event.width, event.height);
    }
}

/// Press, drag and release handling. Clicks that stayed put become `MapClicked`.
pub fn camera_pointer_controls(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut motion: MessageReader<MouseMotion>,
    mut wheel: MessageReader<MouseWheel>,
    windows: Query<&Window, With<PrimaryWindow>>,
    interactions: Query<&Interaction>,
    mut gesture: ResMut<PointerGesture>,
    mut rig: ResMut<CameraRig>,
    mut clicks: MessageWriter<MapClicked>,
) {
    let cursor = windows.single().ok().and_then(Window::cursor_position);
    let over_ui = interactions
        .iter()
        .any(|interaction| *interaction != Interaction::None);

    if mouse_buttons.just_pressed(MouseButton::Left) || mouse_buttons.just_pressed(MouseButton::Right)
    {
        gesture.press(cursor, over_ui);
    }

    let delta: Vec2 = motion.read().map(|event| event.delta).sum();
    if delta != Vec2::ZERO {
        gesture.record_motion(delta);
        if gesture.is_map_drag() {
            let rotate = mouse_buttons.pressed(MouseButton::Right)
                || (mouse_buttons.pressed(MouseButton::Left)
                    && rig.active_mode() == CameraMode::Orbit);
            if rotate {
                rig.orbit_by_pixels(delta);
            } else if mouse_buttons.pressed(MouseButton::Left) {
                rig.pan_by_pixels(delta);
            }
        }
    }

    if !over_ui {
        let notches: f32 = wheel
            .read()
            .map(|event| match event.unit {
                MouseScrollUnit::Line => event.y,
                MouseScrollUnit::Pixel => event.y / PIXELS_PER_NOTCH,
            })
            .sum();
        if notches != 0.0 {
            rig.wheel(notches);
        }
    } else {
        wheel.clear();
    }

    let threshold = rig.settings().pick_drag_threshold_px;
    if mouse_buttons.just_released(MouseButton::Left) {
        if let Some(position) = gesture.release(threshold) {
            clicks.write(MapClicked { position });
        }
    } else if mouse_buttons.just_released(MouseButton::Right) {
        gesture.release(threshold);
    }
}

/// `N` north, `H` home, `Shift+H` set home, `+`/`-` zoom.
pub fn camera_keyboard_shortcuts(keyboard: Res<ButtonInput<KeyCode>>, mut rig: ResMut<CameraRig>) {
    if keyboard.just_pressed(KeyCode::KeyN) {
        rig.reset_north();
    }
    if keyboard.just_pressed(KeyCode::KeyH) {
        if keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
            rig.set_home_view();
        } else {
            rig.reset_view();
        }
    }
    let zoom = if keyboard.any_just_pressed([KeyCode::Equal, KeyCode::NumpadAdd]) {
        Some(rig.zoom_in())
    } else if keyboard.any_just_pressed([KeyCode::Minus, KeyCode::NumpadSubtract]) {
        Some(rig.zoom_out())
    } else {
        None
    };
    if let Some(Err(err)) = zoom {
        warn!(target: "camera", "{}", err);
    }
}

/// Bevy projection for a mode camera.
pub fn projection_for(camera: &ModeCamera) -> Projection {
    match camera.projection {
        ProjectionParams::Perspective {
            fov,
            aspect,
            near,
            far,
        } => Projection::Perspective(PerspectiveProjection {
            fov,
            aspect_ratio: aspect,
            near,
            far,
            ..default()
        }),
        ProjectionParams::Orthographic {
            half_height,
            zoom,
            near,
            far,
            ..
        } => Projection::Orthographic(OrthographicProjection {
            near,
            far,
            scaling_mode: ScalingMode::FixedVertical {
                viewport_height: half_height * 2.0,
            },
            scale: 1.0 / zoom,
            ..OrthographicProjection::default_3d()
        }),
    }
}
