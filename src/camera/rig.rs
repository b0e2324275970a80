//! The camera rig: three mode cameras, the active mode, and the transition
//! plan currently driving them.
use std::collections::VecDeque;
use std::time::Duration;

use bevy::prelude::*;

use crate::core::MapError;
use crate::scene::BoundingSphere;

use super::config::CameraSettings;
use super::mode::{
    wrap_angle, AzimuthLimit, CameraMode, ControllerState, ModeCamera, ProjectionParams,
    DEGENERATE_OFFSET,
};
use super::tween::{millis, CameraPose, Tween, TweenPath};

/// Generation token of a transition plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(pub u64);

/// One named step of a transition plan. Steps read the rig state when they
/// start, not when the plan is built.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraStep {
    /// Fit a sphere into the view of whichever mode is active.
    FrameSphere(BoundingSphere),
    /// Re-target the active camera. `None` keeps the current distance.
    MoveTo { target: Vec3, distance: Option<f32> },
    SwitchMode(CameraMode),
    /// Swing the active camera around its target to an explicit pose.
    Rotate { pose: CameraPose, duration: Duration },
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraEvent {
    ModeChanged { from: CameraMode, to: CameraMode },
    TransitionFinished(TransitionId),
    TransitionCancelled(TransitionId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum StepFinish {
    Nothing,
    EnterMode { from: CameraMode, to: CameraMode },
}

#[derive(Debug, Clone, PartialEq)]
struct AnimatingStep {
    tween: Tween,
    finish: StepFinish,
}

#[derive(Debug, Clone, PartialEq)]
struct Transition {
    id: TransitionId,
    pending: VecDeque<CameraStep>,
    animating: Option<AnimatingStep>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct HomeView {
    position: Vec3,
    target: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct NorthMemory {
    position: Vec3,
    heading: f32,
}

#[derive(Resource, Debug, Clone)]
pub struct CameraRig {
    settings: CameraSettings,
    cameras: [ModeCamera; 3],
    active: CameraMode,
    last_perspective: CameraMode,
    transition: Option<Transition>,
    next_id: u64,
    events: Vec<CameraEvent>,
    home: HomeView,
    north_memory: Option<NorthMemory>,
    viewport: Vec2,
}

impl CameraRig {
    pub const DEFAULT_VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

    pub fn new(settings: CameraSettings) -> Self {
        let aspect = Self::DEFAULT_VIEWPORT.x / Self::DEFAULT_VIEWPORT.y;
        let position = settings.home_position;
        let target = settings.home_target;
        let perspective = ProjectionParams::Perspective {
            fov: settings.fov,
            aspect,
            near: settings.near,
            far: settings.far,
        };
        let mut map = ModeCamera {
            mode: CameraMode::Map,
            position,
            heading: 0.0,
            projection: perspective,
            controls: ControllerState::for_mode(CameraMode::Map, target),
        };
        map.heading = map.heading();
        let orbit = ModeCamera {
            mode: CameraMode::Orbit,
            controls: ControllerState::for_mode(CameraMode::Orbit, target),
            ..map.clone()
        };
        let orthographic = ModeCamera {
            mode: CameraMode::Orthographic,
            position: target + Vec3::Y * settings.orthographic_height,
            heading: map.heading,
            projection: ProjectionParams::Orthographic {
                half_height: (settings.fov * 0.5).tan() * map.distance(),
                aspect,
                zoom: 1.0,
                near: settings.near,
                far: settings.far,
                reference_fov: settings.fov,
            },
            controls: ControllerState::for_mode(CameraMode::Orthographic, target),
        };

        Self {
            settings,
            cameras: [map, orbit, orthographic],
            active: CameraMode::Map,
            last_perspective: CameraMode::Map,
            transition: None,
            next_id: 0,
            events: Vec::new(),
            home: HomeView { position, target },
            north_memory: None,
            viewport: Self::DEFAULT_VIEWPORT,
        }
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn active_mode(&self) -> CameraMode {
        self.active
    }

    pub fn active_camera(&self) -> &ModeCamera {
        self.camera(self.active)
    }

    pub fn camera(&self, mode: CameraMode) -> &ModeCamera {
        &self.cameras[mode.index()]
    }

    fn camera_mut(&mut self, mode: CameraMode) -> &mut ModeCamera {
        &mut self.cameras[mode.index()]
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    pub fn current_transition(&self) -> Option<TransitionId> {
        self.transition.as_ref().map(|transition| transition.id)
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<CameraEvent> {
        std::mem::take(&mut self.events)
    }

    /// Heading of the active camera.
    pub fn heading(&self) -> f32 {
        self.active_camera().heading()
    }

    /// Start a plan, cancelling whatever was running. Instant leading steps
    /// complete before this returns.
    pub fn start(&mut self, steps: impl IntoIterator<Item = CameraStep>) -> TransitionId {
        self.cancel();
        self.next_id += 1;
        let id = TransitionId(self.next_id);
        self.transition = Some(Transition {
            id,
            pending: steps.into_iter().collect(),
            animating: None,
        });
        debug!(target: "camera", "transition {:?} started", id);
        self.advance(Duration::ZERO);
        id
    }

    /// Cancel the in-flight plan, if any.
    pub fn cancel(&mut self) -> Option<TransitionId> {
        let transition = self.transition.take()?;
        for camera in &mut self.cameras {
            camera.controls.azimuth = AzimuthLimit::Free;
        }
        debug!(target: "camera", "transition {:?} cancelled", transition.id);
        self.events.push(CameraEvent::TransitionCancelled(transition.id));
        Some(transition.id)
    }

    /// Drive the running plan forward by `delta`.
    pub fn advance(&mut self, delta: Duration) {
        let mut delta = delta;
        loop {
            let Some(mut transition) = self.transition.take() else {
                return;
            };

            if let Some(mut step) = transition.animating.take() {
                let pose = step.tween.step(delta);
                delta = Duration::ZERO;
                let mode = step.tween.mode;
                apply_pose(self.camera_mut(mode), &pose);
                if !step.tween.is_finished() {
                    transition.animating = Some(step);
                    self.transition = Some(transition);
                    return;
                }
                self.finish_step(step.finish);
            }

            let Some(next) = transition.pending.pop_front() else {
                debug!(target: "camera", "transition {:?} finished", transition.id);
                self.events.push(CameraEvent::TransitionFinished(transition.id));
                return;
            };
            transition.animating = self.begin_step(next);
            self.transition = Some(transition);
        }
    }

    fn finish_step(&mut self, finish: StepFinish) {
        if let StepFinish::EnterMode { from, to } = finish {
            self.camera_mut(from).controls.azimuth = AzimuthLimit::Free;
            self.set_active(to);
        }
    }

    fn set_active(&mut self, to: CameraMode) {
        let from = self.active;
        if from == to {
            return;
        }
        if from.is_perspective() {
            self.last_perspective = from;
        }
        self.active = to;
        info!(target: "camera", "camera mode {} -> {}", from, to);
        self.events.push(CameraEvent::ModeChanged { from, to });
    }

    /// Start a step. `None` means it already completed.
    fn begin_step(&mut self, step: CameraStep) -> Option<AnimatingStep> {
        let tween = match step {
            CameraStep::FrameSphere(sphere) => {
                if self.active.is_perspective() {
                    let distance = self.fit_distance(&sphere);
                    self.perspective_move(sphere.center, Some(distance))
                } else {
                    let zoom = self.fit_zoom(&sphere);
                    self.orthographic_move(sphere.center, Some(zoom))
                }
            }
            CameraStep::MoveTo { target, distance } => {
                if self.active.is_perspective() {
                    self.perspective_move(target, distance)
                } else {
                    self.orthographic_move(target, None)
                }
            }
            CameraStep::SwitchMode(mode) => return self.begin_switch(mode),
            CameraStep::Rotate { pose, duration } => {
                let camera = self.active_camera();
                Tween::new(self.active, CameraPose::of(camera), pose, duration)
                    .with_path(TweenPath::Orbit)
            }
        };
        Some(AnimatingStep {
            tween,
            finish: StepFinish::Nothing,
        })
    }

    fn begin_switch(&mut self, to: CameraMode) -> Option<AnimatingStep> {
        let from = self.active;
        if from == to {
            return None;
        }
        let source = self.camera(from).clone();
        match (from, to) {
            (CameraMode::Map | CameraMode::Orbit, CameraMode::Orthographic) => {
                let distance = source.distance();
                let heading = source.heading();
                let settings = &self.settings;
                let half_height = (settings.fov * 0.5).tan() * distance;
                let height = settings.orthographic_height;
                let duration = millis(source.polar() * settings.orthographic_switch_ms_per_radian);

                let plan = self.camera_mut(CameraMode::Orthographic);
                plan.controls.target = source.target();
                plan.position = source.target() + Vec3::Y * height;
                plan.heading = heading;
                if let ProjectionParams::Orthographic {
                    half_height: plan_half,
                    zoom,
                    ..
                } = &mut plan.projection
                {
                    *plan_half = half_height.max(DEGENERATE_OFFSET);
                    *zoom = 1.0;
                }

                self.camera_mut(from).controls.azimuth = AzimuthLimit::Locked(heading);
                let overhead = CameraPose {
                    position: source.target() + Vec3::Y * distance,
                    target: source.target(),
                    heading,
                    zoom: 1.0,
                };
                let tween = Tween::new(from, CameraPose::of(&source), overhead, duration);
                Some(AnimatingStep {
                    tween,
                    finish: StepFinish::EnterMode { from, to },
                })
            }
            (CameraMode::Orthographic, _) => {
                let distance = source.equivalent_distance();
                let destination = self.camera_mut(to);
                destination.controls.target = source.target();
                destination.position = source.target() + Vec3::Y * distance;
                destination.heading = source.heading();
                self.set_active(to);
                None
            }
            _ => {
                let destination = self.camera_mut(to);
                destination.controls.target = source.target();
                destination.position = source.position;
                destination.heading = source.heading();
                self.set_active(to);
                None
            }
        }
    }

    fn perspective_move(&self, target: Vec3, distance: Option<f32>) -> Tween {
        let camera = self.active_camera();
        let offset = camera.offset();
        let direction = if offset.length_squared() > DEGENERATE_OFFSET * DEGENERATE_OFFSET {
            offset.normalize()
        } else {
            Vec3::Y
        };
        let distance = distance.unwrap_or_else(|| camera.distance());
        let from = CameraPose::of(camera);
        let to = CameraPose {
            position: target + direction * distance,
            target,
            heading: from.heading,
            zoom: from.zoom,
        };
        let travel = to.position.distance(from.position);
        let duration = millis(
            self.settings.zoom_base_ms + self.settings.zoom_ms_per_sqrt_unit * travel.sqrt(),
        );
        Tween::new(self.active, from, to, duration)
    }

    fn orthographic_move(&self, target: Vec3, zoom: Option<f32>) -> Tween {
        let camera = self.active_camera();
        let from = CameraPose::of(camera);
        let to = CameraPose {
            position: target + camera.offset(),
            target,
            heading: from.heading,
            zoom: zoom.unwrap_or(from.zoom),
        };
        Tween::new(
            self.active,
            from,
            to,
            millis(self.settings.orthographic_zoom_ms),
        )
    }

    /// Perspective distance at which the sphere fits the narrower half angle.
    pub fn fit_distance(&self, sphere: &BoundingSphere) -> f32 {
        let half_angle = self.active_camera().projection.min_half_fov();
        let tight = sphere.radius / half_angle.sin().max(DEGENERATE_OFFSET);
        (tight * self.settings.fit_margin).max(self.settings.min_distance)
    }

    /// Orthographic zoom at which the sphere fits the shorter visible side.
    pub fn fit_zoom(&self, sphere: &BoundingSphere) -> f32 {
        let camera = self.camera(CameraMode::Orthographic);
        let (half_height, aspect) = match camera.projection {
            ProjectionParams::Orthographic {
                half_height,
                aspect,
                ..
            } => (half_height, aspect),
            ProjectionParams::Perspective { .. } => return camera.zoom(),
        };
        let needed = sphere.radius * self.settings.fit_margin;
        if needed <= DEGENERATE_OFFSET {
            return self.settings.max_zoom;
        }
        let fit = half_height * aspect.min(1.0) / needed;
        if fit < self.settings.min_zoom {
            debug!(
                target: "camera",
                "Sphere of radius {:.1} needs zoom {:.3}, below the minimum {:.3}; it will not fit",
                sphere.radius,
                fit,
                self.settings.min_zoom
            );
        }
        fit.clamp(self.settings.min_zoom, self.settings.max_zoom)
    }

    /// Switch to `mode`. Asking for the current mode cancels any running
    /// transition and returns `None`.
    pub fn switch_to(&mut self, mode: CameraMode) -> Option<TransitionId> {
        if mode == self.active {
            self.cancel();
            return None;
        }
        Some(self.start([CameraStep::SwitchMode(mode)]))
    }

    /// Plan view and back to whichever perspective mode was left for it.
    pub fn toggle_projection(&mut self) -> Option<TransitionId> {
        if self.active == CameraMode::Orthographic {
            self.switch_to(self.last_perspective)
        } else {
            self.switch_to(CameraMode::Orthographic)
        }
    }

    /// Plan steps that frame `sphere`: perspective views orbit the object.
    pub fn zoom_to_object_steps(&self, sphere: BoundingSphere) -> Vec<CameraStep> {
        if self.active.is_perspective() {
            vec![
                CameraStep::SwitchMode(CameraMode::Orbit),
                CameraStep::FrameSphere(sphere),
            ]
        } else {
            vec![CameraStep::FrameSphere(sphere)]
        }
    }

    pub fn zoom_to_object(&mut self, sphere: Option<BoundingSphere>) -> Result<TransitionId, MapError> {
        let sphere = sphere.ok_or_else(|| MapError::animation_target_missing("zoom to object"))?;
        let steps = self.zoom_to_object_steps(sphere);
        Ok(self.start(steps))
    }

    pub fn zoom_to_coordinates(&mut self, target: Vec3, distance: Option<f32>) -> TransitionId {
        self.start([CameraStep::MoveTo { target, distance }])
    }

    /// Toggle between the current heading and north.
    pub fn reset_north(&mut self) -> TransitionId {
        let camera = self.active_camera().clone();
        let heading = camera.heading();
        let is_north = wrap_angle(heading).abs() < self.settings.north_threshold;
        let target = camera.target();

        let destination = match (is_north, self.north_memory) {
            (true, Some(memory)) => CameraPose {
                position: memory.position,
                target,
                heading: memory.heading,
                zoom: camera.zoom(),
            },
            _ => {
                if !is_north && !self.is_animating() {
                    self.north_memory = Some(NorthMemory {
                        position: camera.position,
                        heading,
                    });
                }
                CameraPose {
                    position: Vec3::new(
                        target.x,
                        camera.position.y,
                        target.z + camera.horizontal_distance(),
                    ),
                    target,
                    heading: 0.0,
                    zoom: camera.zoom(),
                }
            }
        };

        let rotation = wrap_angle(destination.heading - heading).abs();
        let duration =
            millis(self.settings.north_base_ms + rotation * self.settings.north_ms_per_radian);
        self.start([CameraStep::Rotate {
            pose: destination,
            duration,
        }])
    }

    /// Jump back to the home view.
    pub fn reset_view(&mut self) {
        self.cancel();
        let home = self.home;
        let height = self.settings.orthographic_height;
        let camera = self.camera_mut(self.active);
        camera.controls.target = home.target;
        if camera.mode.is_perspective() {
            camera.position = home.position;
            camera.heading = camera.heading();
        } else {
            camera.position = home.target + Vec3::Y * height;
            camera.set_zoom(1.0);
        }
        info!(target: "camera", "view reset to home");
    }

    pub fn set_home_view(&mut self) {
        let camera = self.active_camera();
        self.home = HomeView {
            position: if camera.mode.is_perspective() {
                camera.position
            } else {
                camera.target() + Vec3::Y * camera.equivalent_distance()
            },
            target: camera.target(),
        };
        info!(target: "camera", "home view set at {:?}", self.home.target);
    }

    pub fn home(&self) -> (Vec3, Vec3) {
        (self.home.position, self.home.target)
    }

    pub fn zoom_in(&mut self) -> Result<(), MapError> {
        let factor = self.settings.zoom_factor;
        self.dolly_by(1.0 / factor)
    }

    pub fn zoom_out(&mut self) -> Result<(), MapError> {
        let factor = self.settings.zoom_factor;
        self.dolly_by(factor)
    }

    /// Scale the view distance. Values below 1 move closer.
    fn dolly_by(&mut self, scale: f32) -> Result<(), MapError> {
        let mode = self.active;
        if !self.active_camera().controls.enable_zoom {
            return Err(MapError::ZoomUnsupported {
                mode: mode.to_string(),
            });
        }
        self.cancel();
        let settings = self.settings.clone();
        let camera = self.camera_mut(mode);
        if mode.is_perspective() {
            let distance =
                (camera.distance() * scale).clamp(settings.min_distance, settings.max_distance);
            camera.set_distance(distance);
        } else {
            let zoom = (camera.zoom() / scale).clamp(settings.min_zoom, settings.max_zoom);
            camera.set_zoom(zoom);
        }
        Ok(())
    }

    /// Mouse wheel: one notch scales by the configured step.
    pub fn wheel(&mut self, notches: f32) {
        let scale = (1.0 + self.settings.wheel_zoom_step).powf(-notches);
        if let Err(err) = self.dolly_by(scale) {
            debug!(target: "camera", "wheel ignored: {}", err);
        }
    }

    /// Rotate by a pointer drag in pixels.
    pub fn orbit_by_pixels(&mut self, delta: Vec2) {
        if !self.active_camera().controls.enable_rotate {
            return;
        }
        self.cancel();
        let speed = self.settings.rotate_speed;
        let mode = self.active;
        self.camera_mut(mode).orbit(-delta.x * speed, -delta.y * speed);
    }

    /// Pan by a pointer drag in pixels so the ground follows the cursor.
    pub fn pan_by_pixels(&mut self, delta: Vec2) {
        if !self.active_camera().controls.enable_pan {
            return;
        }
        self.cancel();
        let viewport_height = self.viewport.y.max(1.0);
        let mode = self.active;
        let camera = self.camera_mut(mode);
        let world_per_pixel = match camera.projection {
            ProjectionParams::Perspective { fov, .. } => {
                2.0 * (fov * 0.5).tan() * camera.distance() / viewport_height
            }
            ProjectionParams::Orthographic {
                half_height, zoom, ..
            } => 2.0 * half_height / zoom / viewport_height,
        };
        let heading = camera.heading();
        let right = Vec3::new(heading.cos(), 0.0, -heading.sin());
        let forward = Vec3::new(-heading.sin(), 0.0, -heading.cos());
        let motion = (-right * delta.x + forward * delta.y) * world_per_pixel;
        camera.pan(motion);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.viewport = Vec2::new(width, height);
        let aspect = width / height;
        for camera in &mut self.cameras {
            camera.projection.set_aspect(aspect);
        }
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(CameraSettings::default())
    }
}

fn apply_pose(camera: &mut ModeCamera, pose: &CameraPose) {
    camera.position = pose.position;
    camera.controls.target = pose.target;
    camera.heading = match camera.controls.azimuth {
        AzimuthLimit::Locked(heading) => heading,
        AzimuthLimit::Free => pose.heading,
    };
    camera.set_zoom(pose.zoom);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> CameraRig {
        let mut settings = CameraSettings::default();
        settings.home_position = Vec3::new(0.0, 100.0, 100.0);
        settings.home_target = Vec3::new(0.0, 5.0, 0.0);
        CameraRig::new(settings)
    }

    fn finish(rig: &mut CameraRig) {
        for _ in 0..200 {
            if !rig.is_animating() {
                return;
            }
            rig.advance(Duration::from_millis(50));
        }
        panic!("transition never finished");
    }

    #[test]
    fn starts_in_map_mode() {
        let rig = rig();
        assert_eq!(rig.active_mode(), CameraMode::Map);
        assert!(!rig.is_animating());
    }

    #[test]
    fn map_to_orthographic_animates_then_switches() {
        let mut rig = rig();
        let id = rig.switch_to(CameraMode::Orthographic);
        assert!(id.is_some());
        assert!(rig.is_animating());
        assert_eq!(rig.active_mode(), CameraMode::Map);
        assert!(matches!(
            rig.camera(CameraMode::Map).controls.azimuth,
            AzimuthLimit::Locked(_)
        ));

        finish(&mut rig);
        assert_eq!(rig.active_mode(), CameraMode::Orthographic);
        assert_eq!(rig.camera(CameraMode::Map).controls.azimuth, AzimuthLimit::Free);
        let events = rig.drain_events();
        assert!(events.contains(&CameraEvent::ModeChanged {
            from: CameraMode::Map,
            to: CameraMode::Orthographic
        }));
        assert!(events.contains(&CameraEvent::TransitionFinished(id.unwrap())));
    }

    #[test]
    fn orthographic_round_trip_keeps_target_and_heading() {
        let mut rig = rig();
        let target = rig.active_camera().target();
        let heading = rig.heading();
        rig.switch_to(CameraMode::Orthographic);
        finish(&mut rig);
        assert!((rig.heading() - heading).abs() < 1e-4);
        rig.switch_to(CameraMode::Map);
        assert!(!rig.is_animating());
        assert_eq!(rig.active_mode(), CameraMode::Map);
        assert!((rig.active_camera().target() - target).length() < 1e-3);

        let distance = rig.active_camera().distance();
        let original = Vec3::new(0.0, 95.0, 100.0).length();
        assert!((distance - original).abs() < 1e-2);
    }

    #[test]
    fn orbit_orthographic_round_trip_keeps_target_and_height() {
        let mut rig = rig();
        rig.switch_to(CameraMode::Orbit);
        let target = rig.active_camera().target();
        let heading = rig.heading();
        let distance = rig.active_camera().distance();

        rig.switch_to(CameraMode::Orthographic);
        finish(&mut rig);
        assert_eq!(rig.active_mode(), CameraMode::Orthographic);
        assert!((rig.active_camera().target() - target).length() < 1e-3);

        rig.switch_to(CameraMode::Orbit);
        finish(&mut rig);
        let camera = rig.active_camera();
        assert_eq!(rig.active_mode(), CameraMode::Orbit);
        assert!((camera.target() - target).length() < 1e-3);
        assert!((rig.heading() - heading).abs() < 1e-4);
        // Back in perspective the camera sits overhead at the equivalent distance.
        let expected = target + Vec3::Y * distance;
        assert!((camera.position - expected).length() < 1e-2);

        rig.switch_to(CameraMode::Orthographic);
        finish(&mut rig);
        assert!((rig.active_camera().target() - target).length() < 1e-3);
    }

    #[test]
    fn every_switch_round_trip_restores_the_target() {
        let modes = [CameraMode::Map, CameraMode::Orbit, CameraMode::Orthographic];
        for first in modes {
            for second in modes.into_iter().filter(|mode| *mode != first) {
                let mut rig = rig();
                rig.switch_to(first);
                finish(&mut rig);
                let target = rig.active_camera().target();

                rig.switch_to(second);
                finish(&mut rig);
                assert_eq!(rig.active_mode(), second);
                rig.switch_to(first);
                finish(&mut rig);

                assert_eq!(rig.active_mode(), first);
                assert!(
                    (rig.active_camera().target() - target).length() < 1e-3,
                    "{first:?} -> {second:?} -> {first:?} moved the target"
                );
            }
        }
    }

    #[test]
    fn map_and_orbit_swap_instantly() {
        let mut rig = rig();
        let position = rig.active_camera().position;
        rig.switch_to(CameraMode::Orbit);
        assert!(!rig.is_animating());
        assert_eq!(rig.active_mode(), CameraMode::Orbit);
        assert_eq!(rig.active_camera().position, position);
        assert!(!rig.active_camera().controls.enable_pan);
    }

    #[test]
    fn toggle_projection_returns_to_last_perspective_mode() {
        let mut rig = rig();
        rig.switch_to(CameraMode::Orbit);
        rig.toggle_projection();
        finish(&mut rig);
        assert_eq!(rig.active_mode(), CameraMode::Orthographic);

        rig.toggle_projection();
        finish(&mut rig);
        assert_eq!(rig.active_mode(), CameraMode::Orbit);
    }

    #[test]
    fn switching_to_current_mode_cancels() {
        let mut rig = rig();
        let id = rig.zoom_to_coordinates(Vec3::new(50.0, 0.0, 0.0), None);
        assert!(rig.is_animating());
        assert_eq!(rig.switch_to(CameraMode::Map), None);
        assert!(!rig.is_animating());
        assert!(rig
            .drain_events()
            .contains(&CameraEvent::TransitionCancelled(id)));
    }

    #[test]
    fn new_plan_cancels_the_running_one() {
        let mut rig = rig();
        rig.switch_to(CameraMode::Orthographic);
        let first = rig.current_transition().unwrap();
        let second = rig.zoom_to_coordinates(Vec3::ZERO, Some(20.0));
        assert_ne!(first, second);
        assert_eq!(rig.camera(CameraMode::Map).controls.azimuth, AzimuthLimit::Free);
        assert!(rig
            .drain_events()
            .contains(&CameraEvent::TransitionCancelled(first)));
        finish(&mut rig);
        assert_eq!(rig.active_mode(), CameraMode::Map);
    }

    #[test]
    fn zoom_to_object_contains_sphere_in_perspective() {
        let mut rig = rig();
        let sphere = BoundingSphere {
            center: Vec3::new(40.0, 10.0, -30.0),
            radius: 25.0,
        };
        rig.zoom_to_object(Some(sphere)).unwrap();
        assert_eq!(rig.active_mode(), CameraMode::Orbit);
        finish(&mut rig);

        let camera = rig.active_camera();
        assert!((camera.target() - sphere.center).length() < 1e-3);
        let half_angle = camera.projection.min_half_fov();
        let visible_radius = camera.distance() * half_angle.sin();
        assert!(visible_radius >= sphere.radius);
    }

    #[test]
    fn zoom_to_object_contains_sphere_in_orthographic() {
        let mut rig = rig();
        rig.switch_to(CameraMode::Orthographic);
        finish(&mut rig);
        let offset = rig.active_camera().offset();
        let sphere = BoundingSphere {
            center: Vec3::new(-10.0, 0.0, 20.0),
            radius: 12.0,
        };
        rig.zoom_to_object(Some(sphere)).unwrap();
        finish(&mut rig);

        let camera = rig.active_camera();
        assert_eq!(camera.mode, CameraMode::Orthographic);
        assert!((camera.offset() - offset).length() < 1e-3);
        let extents = camera.visible_half_extents().unwrap();
        assert!(extents.min_element() >= sphere.radius);
    }

    #[test]
    fn fit_zoom_stops_at_minimum_for_huge_spheres() {
        let rig = rig();
        let sphere = BoundingSphere {
            center: Vec3::ZERO,
            radius: 1.0e7,
        };
        assert_eq!(rig.fit_zoom(&sphere), rig.settings().min_zoom);
    }

    #[test]
    fn zoom_to_missing_object_is_reported() {
        let mut rig = rig();
        let err = rig.zoom_to_object(None).unwrap_err();
        assert!(err.is_recoverable());
        assert!(!rig.is_animating());
    }

    #[test]
    fn zoom_to_coordinates_keeps_distance_by_default() {
        let mut rig = rig();
        let distance = rig.active_camera().distance();
        rig.zoom_to_coordinates(Vec3::new(30.0, 0.0, 30.0), None);
        finish(&mut rig);
        assert!((rig.active_camera().distance() - distance).abs() < 1e-2);
    }

    #[test]
    fn reset_north_cycles_between_two_poses() {
        let mut rig = rig();
        rig.camera_mut(CameraMode::Map).position = Vec3::new(80.0, 100.0, 0.0);
        let original = rig.active_camera().position;

        rig.reset_north();
        finish(&mut rig);
        assert!(rig.heading().abs() < 1e-3);
        let north = rig.active_camera().position;
        assert!((north.y - original.y).abs() < 1e-3);

        rig.reset_north();
        finish(&mut rig);
        assert!((rig.active_camera().position - original).length() < 1e-2);

        rig.reset_north();
        finish(&mut rig);
        assert!((rig.active_camera().position - north).length() < 1e-2);
    }

    #[test]
    fn reset_view_returns_home() {
        let mut rig = rig();
        rig.zoom_to_coordinates(Vec3::new(500.0, 0.0, 0.0), Some(10.0));
        finish(&mut rig);
        rig.reset_view();
        let (position, target) = rig.home();
        assert_eq!(rig.active_camera().position, position);
        assert_eq!(rig.active_camera().target(), target);
    }

    #[test]
    fn set_home_view_redefines_reset() {
        let mut rig = rig();
        rig.zoom_to_coordinates(Vec3::new(500.0, 0.0, 0.0), Some(10.0));
        finish(&mut rig);
        rig.set_home_view();
        let here = rig.active_camera().position;
        rig.zoom_out().unwrap();
        rig.reset_view();
        assert!((rig.active_camera().position - here).length() < 1e-3);
    }

    #[test]
    fn zoom_in_moves_closer() {
        let mut rig = rig();
        let before = rig.active_camera().distance();
        rig.zoom_in().unwrap();
        assert!(rig.active_camera().distance() < before);
        rig.switch_to(CameraMode::Orthographic);
        finish(&mut rig);
        rig.zoom_in().unwrap();
        assert!(rig.active_camera().zoom() > 1.0);
    }

    #[test]
    fn zoom_reports_disabled_controls() {
        let mut rig = rig();
        rig.camera_mut(CameraMode::Map).controls.enable_zoom = false;
        assert!(matches!(rig.zoom_in(), Err(MapError::ZoomUnsupported { .. })));
    }

    #[test]
    fn resize_updates_every_aspect() {
        let mut rig = rig();
        rig.resize(800.0, 400.0);
        for mode in CameraMode::ALL {
            assert_eq!(rig.camera(mode).projection.aspect(), 2.0);
        }
        assert_eq!(rig.viewport(), Vec2::new(800.0, 400.0));
    }

    #[test]
    fn orbit_mode_refuses_panning() {
        let mut rig = rig();
        rig.switch_to(CameraMode::Orbit);
        let target = rig.active_camera().target();
        rig.pan_by_pixels(Vec2::new(50.0, 0.0));
        assert_eq!(rig.active_camera().target(), target);
    }

    #[test]
    fn user_input_cancels_transition() {
        let mut rig = rig();
        rig.zoom_to_coordinates(Vec3::new(50.0, 0.0, 0.0), None);
        rig.orbit_by_pixels(Vec2::new(10.0, 0.0));
        assert!(!rig.is_animating());
    }
}
