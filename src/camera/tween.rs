//! Time-driven interpolation between camera poses.
use std::time::Duration;

use bevy::prelude::*;

use super::mode::{wrap_angle, CameraMode, ModeCamera, DEGENERATE_OFFSET};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    QuadraticInOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadraticInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) * 0.5
                }
            }
        }
    }
}

/// Everything a tween moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
    pub heading: f32,
    pub zoom: f32,
}

impl CameraPose {
    pub fn of(camera: &ModeCamera) -> Self {
        Self {
            position: camera.position,
            target: camera.target(),
            heading: camera.heading(),
            zoom: camera.zoom(),
        }
    }

    /// Straight-line blend of position and target.
    pub fn lerp(&self, other: &CameraPose, t: f32) -> CameraPose {
        CameraPose {
            position: self.position.lerp(other.position, t),
            target: self.target.lerp(other.target, t),
            heading: lerp_angle(self.heading, other.heading, t),
            zoom: self.zoom + (other.zoom - self.zoom) * t,
        }
    }

    /// Blend that swings around the target instead of cutting through it.
    pub fn orbit_lerp(&self, other: &CameraPose, t: f32) -> CameraPose {
        let from_offset = self.position - self.target;
        let to_offset = other.position - other.target;
        let from_reach = Vec2::new(from_offset.x, from_offset.z).length();
        let to_reach = Vec2::new(to_offset.x, to_offset.z).length();
        let heading = lerp_angle(self.heading, other.heading, t);
        let reach = from_reach + (to_reach - from_reach) * t;
        let height = from_offset.y + (to_offset.y - from_offset.y) * t;
        let target = self.target.lerp(other.target, t);
        let offset = if reach > DEGENERATE_OFFSET {
            Vec3::new(reach * heading.sin(), height, reach * heading.cos())
        } else {
            Vec3::new(0.0, height, 0.0)
        };
        CameraPose {
            position: target + offset,
            target,
            heading,
            zoom: self.zoom + (other.zoom - self.zoom) * t,
        }
    }
}

/// Shortest-arc blend between two headings.
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    wrap_angle(from + wrap_angle(to - from) * t)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TweenPath {
    #[default]
    Straight,
    Orbit,
}

/// A running animation of one mode's camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub mode: CameraMode,
    pub from: CameraPose,
    pub to: CameraPose,
    pub duration: Duration,
    pub elapsed: Duration,
    pub easing: Easing,
    pub path: TweenPath,
}

impl Tween {
    pub fn new(mode: CameraMode, from: CameraPose, to: CameraPose, duration: Duration) -> Self {
        Self {
            mode,
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
            easing: Easing::default(),
            path: TweenPath::default(),
        }
    }

    pub fn with_path(mut self, path: TweenPath) -> Self {
        self.path = path;
        self
    }

    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Advance by `delta` and return the pose for the new time.
    pub fn step(&mut self, delta: Duration) -> CameraPose {
        self.elapsed = (self.elapsed + delta).min(self.duration);
        self.sample()
    }

    pub fn sample(&self) -> CameraPose {
        if self.is_finished() {
            return self.to;
        }
        let t = self.easing.apply(self.progress());
        match self.path {
            TweenPath::Straight => self.from.lerp(&self.to, t),
            TweenPath::Orbit => self.from.orbit_lerp(&self.to, t),
        }
    }
}

pub fn millis(ms: f32) -> Duration {
    Duration::from_secs_f32(ms.max(0.0) / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn pose(position: Vec3, heading: f32) -> CameraPose {
        CameraPose {
            position,
            target: Vec3::ZERO,
            heading,
            zoom: 1.0,
        }
    }

    #[test]
    fn easing_is_symmetric() {
        let easing = Easing::QuadraticInOut;
        assert_eq!(easing.apply(0.0), 0.0);
        assert_eq!(easing.apply(1.0), 1.0);
        assert!((easing.apply(0.5) - 0.5).abs() < 1e-6);
        assert!((easing.apply(0.25) + easing.apply(0.75) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn headings_blend_across_the_seam() {
        let mid = lerp_angle(PI - 0.1, -PI + 0.1, 0.5);
        assert!((mid.abs() - PI).abs() < 1e-4);
    }

    #[test]
    fn tween_lands_exactly_on_target() {
        let mut tween = Tween::new(
            CameraMode::Map,
            pose(Vec3::new(0.0, 10.0, 10.0), 0.0),
            pose(Vec3::new(10.0, 10.0, 0.0), 1.0),
            Duration::from_millis(300),
        );
        let mid = tween.step(Duration::from_millis(150));
        assert!(mid.position.x > 0.0 && mid.position.x < 10.0);
        let end = tween.step(Duration::from_secs(1));
        assert!(tween.is_finished());
        assert_eq!(end.position, Vec3::new(10.0, 10.0, 0.0));
    }

    #[test]
    fn orbit_path_keeps_distance_to_target() {
        let tween = Tween::new(
            CameraMode::Map,
            pose(Vec3::new(0.0, 5.0, 10.0), 0.0),
            pose(Vec3::new(0.0, 5.0, -10.0), PI),
            Duration::from_millis(100),
        )
        .with_path(TweenPath::Orbit);
        let mut halfway = tween.clone();
        let sample = halfway.step(Duration::from_millis(50));
        let reach = Vec2::new(sample.position.x, sample.position.z).length();
        assert!((reach - 10.0).abs() < 1e-3);
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let tween = Tween::new(
            CameraMode::Orbit,
            pose(Vec3::ZERO, 0.0),
            pose(Vec3::ONE, 0.0),
            Duration::ZERO,
        );
        assert!(tween.is_finished());
        assert_eq!(tween.sample().position, Vec3::ONE);
    }
}
