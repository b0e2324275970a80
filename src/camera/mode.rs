//! Per-mode camera state: projection parameters, orbit constraints and the
//! geometry helpers the rig animates.
use std::f32::consts::{FRAC_PI_2, PI};
use std::fmt;

use bevy::prelude::*;

/// Horizontal offsets shorter than this are treated as looking straight down.
pub const DEGENERATE_OFFSET: f32 = 1e-4;
/// Smallest polar angle the orbit controls allow in perspective modes.
pub const MIN_POLAR: f32 = 0.001;
/// Map mode keeps the camera just above the horizon.
pub const MAP_MAX_POLAR: f32 = FRAC_PI_2 - 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CameraMode {
    #[default]
    Map,
    Orbit,
    Orthographic,
}

impl CameraMode {
    pub const ALL: [CameraMode; 3] = [CameraMode::Map, CameraMode::Orbit, CameraMode::Orthographic];

    pub fn index(self) -> usize {
        match self {
            CameraMode::Map => 0,
            CameraMode::Orbit => 1,
            CameraMode::Orthographic => 2,
        }
    }

    pub fn is_perspective(self) -> bool {
        !matches!(self, CameraMode::Orthographic)
    }

    pub fn label(self) -> &'static str {
        match self {
            CameraMode::Map => "map",
            CameraMode::Orbit => "orbit",
            CameraMode::Orthographic => "orthographic",
        }
    }
}

impl fmt::Display for CameraMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Azimuth constraint on the orbit controls.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AzimuthLimit {
    #[default]
    Free,
    /// Rotation pinned to one heading while a transition needs it fixed.
    Locked(f32),
}

/// Orbit controller state owned by one mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerState {
    pub target: Vec3,
    pub max_polar: f32,
    pub enable_pan: bool,
    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub azimuth: AzimuthLimit,
}

impl ControllerState {
    pub fn for_mode(mode: CameraMode, target: Vec3) -> Self {
        match mode {
            CameraMode::Map => Self {
                target,
                max_polar: MAP_MAX_POLAR,
                enable_pan: true,
                enable_rotate: true,
                enable_zoom: true,
                azimuth: AzimuthLimit::Free,
            },
            CameraMode::Orbit => Self {
                target,
                max_polar: MAP_MAX_POLAR,
                enable_pan: false,
                enable_rotate: true,
                enable_zoom: true,
                azimuth: AzimuthLimit::Free,
            },
            CameraMode::Orthographic => Self {
                target,
                max_polar: 0.0,
                enable_pan: true,
                enable_rotate: true,
                enable_zoom: true,
                azimuth: AzimuthLimit::Free,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionParams {
    Perspective {
        fov: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        /// Half of the visible height at zoom 1.
        half_height: f32,
        aspect: f32,
        zoom: f32,
        near: f32,
        far: f32,
        /// Field of view used to convert between zoom and distance.
        reference_fov: f32,
    },
}

impl ProjectionParams {
    pub fn aspect(&self) -> f32 {
        match self {
            ProjectionParams::Perspective { aspect, .. } => *aspect,
            ProjectionParams::Orthographic { aspect, .. } => *aspect,
        }
    }

    pub fn set_aspect(&mut self, value: f32) {
        match self {
            ProjectionParams::Perspective { aspect, .. } => *aspect = value,
            ProjectionParams::Orthographic { aspect, .. } => *aspect = value,
        }
    }

    pub fn fov(&self) -> f32 {
        match self {
            ProjectionParams::Perspective { fov, .. } => *fov,
            ProjectionParams::Orthographic { reference_fov, .. } => *reference_fov,
        }
    }

    /// Smaller of the vertical and horizontal half field of view.
    pub fn min_half_fov(&self) -> f32 {
        let half_vertical = self.fov() * 0.5;
        let half_horizontal = (half_vertical.tan() * self.aspect()).atan();
        half_vertical.min(half_horizontal)
    }
}

/// One mode's camera: pose, projection and controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeCamera {
    pub mode: CameraMode,
    pub position: Vec3,
    /// Last known heading, used when the view offset has no horizontal part.
    pub heading: f32,
    pub projection: ProjectionParams,
    pub controls: ControllerState,
}

impl ModeCamera {
    pub fn target(&self) -> Vec3 {
        self.controls.target
    }

    pub fn offset(&self) -> Vec3 {
        self.position - self.controls.target
    }

    pub fn distance(&self) -> f32 {
        self.offset().length()
    }

    pub fn horizontal_distance(&self) -> f32 {
        let offset = self.offset();
        Vec2::new(offset.x, offset.z).length()
    }

    /// Angle between the view offset and straight up.
    pub fn polar(&self) -> f32 {
        let distance = self.distance();
        if distance <= DEGENERATE_OFFSET {
            return 0.0;
        }
        (self.offset().y / distance).clamp(-1.0, 1.0).acos()
    }

    /// Heading of the camera around the target. Zero looks towards -Z.
    pub fn heading(&self) -> f32 {
        let offset = self.offset();
        if self.horizontal_distance() > DEGENERATE_OFFSET * self.distance().max(1.0) {
            offset.x.atan2(offset.z)
        } else {
            self.heading
        }
    }

    pub fn zoom(&self) -> f32 {
        match self.projection {
            ProjectionParams::Orthographic { zoom, .. } => zoom,
            ProjectionParams::Perspective { .. } => 1.0,
        }
    }

    pub fn set_zoom(&mut self, value: f32) {
        if let ProjectionParams::Orthographic { zoom, .. } = &mut self.projection {
            *zoom = value;
        }
    }

    /// Half extents of the visible rectangle of an orthographic camera.
    pub fn visible_half_extents(&self) -> Option<Vec2> {
        match self.projection {
            ProjectionParams::Orthographic {
                half_height,
                aspect,
                zoom,
                ..
            } => {
                let half_h = half_height / zoom;
                Some(Vec2::new(half_h * aspect, half_h))
            }
            ProjectionParams::Perspective { .. } => None,
        }
    }

    /// Distance a perspective camera would need to show the same view.
    pub fn equivalent_distance(&self) -> f32 {
        match self.projection {
            ProjectionParams::Perspective { .. } => self.distance(),
            ProjectionParams::Orthographic {
                half_height,
                zoom,
                reference_fov,
                ..
            } => half_height * 2.0 / (2.0 * (reference_fov * 0.5).tan()) / zoom,
        }
    }

    /// Up vector used when looking straight down.
    pub fn plan_up(&self) -> Vec3 {
        let heading = self.heading();
        Vec3::new(-heading.sin(), 0.0, -heading.cos())
    }

    pub fn transform(&self) -> Transform {
        let offset = self.offset();
        let transform = Transform::from_translation(self.position);
        if offset.length_squared() <= DEGENERATE_OFFSET * DEGENERATE_OFFSET {
            return transform;
        }
        let up = if self.horizontal_distance() <= DEGENERATE_OFFSET * self.distance().max(1.0) {
            self.plan_up()
        } else {
            Vec3::Y
        };
        transform.looking_at(self.controls.target, up)
    }

    /// Rotate around the target by the given azimuth and polar deltas,
    /// honouring the controller limits.
    pub fn orbit(&mut self, delta_azimuth: f32, delta_polar: f32) {
        let distance = self.distance();
        let heading = match self.controls.azimuth {
            AzimuthLimit::Free => wrap_angle(self.heading() + delta_azimuth),
            AzimuthLimit::Locked(locked) => locked,
        };
        let min_polar = MIN_POLAR.min(self.controls.max_polar);
        let polar = (self.polar() + delta_polar).clamp(min_polar, self.controls.max_polar.max(min_polar));
        self.position = self.controls.target + spherical_offset(distance, polar, heading);
        self.heading = heading;
    }

    /// Move target and camera together in the horizontal plane.
    pub fn pan(&mut self, delta: Vec3) {
        let delta = Vec3::new(delta.x, 0.0, delta.z);
        self.position += delta;
        self.controls.target += delta;
    }

    /// Set the distance to the target while keeping the view direction.
    pub fn set_distance(&mut self, distance: f32) {
        let offset = self.offset();
        let direction = if offset.length_squared() > DEGENERATE_OFFSET * DEGENERATE_OFFSET {
            offset.normalize()
        } else {
            Vec3::Y
        };
        self.position = self.controls.target + direction * distance;
    }
}

/// Offset from a target for the given spherical coordinates.
pub fn spherical_offset(distance: f32, polar: f32, heading: f32) -> Vec3 {
    let horizontal = distance * polar.sin();
    Vec3::new(
        horizontal * heading.sin(),
        distance * polar.cos(),
        horizontal * heading.cos(),
    )
}

/// Wrap an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perspective(position: Vec3, target: Vec3) -> ModeCamera {
        ModeCamera {
            mode: CameraMode::Map,
            position,
            heading: 0.0,
            projection: ProjectionParams::Perspective {
                fov: 1.0,
                aspect: 1.5,
                near: 0.1,
                far: 1000.0,
            },
            controls: ControllerState::for_mode(CameraMode::Map, target),
        }
    }

    #[test]
    fn heading_follows_horizontal_offset() {
        let camera = perspective(Vec3::new(10.0, 10.0, 0.0), Vec3::ZERO);
        assert!((camera.heading() - FRAC_PI_2).abs() < 1e-5);
        let north = perspective(Vec3::new(0.0, 10.0, 10.0), Vec3::ZERO);
        assert!(north.heading().abs() < 1e-5);
    }

    #[test]
    fn straight_down_uses_stored_heading() {
        let mut camera = perspective(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO);
        camera.heading = 1.0;
        assert_eq!(camera.heading(), 1.0);
        let forward = camera.transform().forward();
        assert!((forward.as_vec3() - Vec3::NEG_Y).length() < 1e-4);
    }

    #[test]
    fn orbit_respects_polar_limit() {
        let mut camera = perspective(Vec3::new(0.0, 10.0, 10.0), Vec3::ZERO);
        camera.orbit(0.0, 10.0);
        assert!(camera.polar() <= MAP_MAX_POLAR + 1e-4);
        assert!(camera.position.y > 0.0);
    }

    #[test]
    fn locked_azimuth_ignores_rotation() {
        let mut camera = perspective(Vec3::new(0.0, 10.0, 10.0), Vec3::ZERO);
        camera.controls.azimuth = AzimuthLimit::Locked(0.0);
        camera.orbit(1.0, 0.0);
        assert!(camera.heading().abs() < 1e-5);
    }

    #[test]
    fn wrap_angle_stays_in_range() {
        assert!((wrap_angle(2.5 * PI) - FRAC_PI_2).abs() < 1e-5);
        assert!((wrap_angle(-1.5 * PI) - FRAC_PI_2).abs() < 1e-5);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn orthographic_distance_matches_zoom() {
        let camera = ModeCamera {
            mode: CameraMode::Orthographic,
            position: Vec3::new(0.0, 1000.0, 0.0),
            heading: 0.0,
            projection: ProjectionParams::Orthographic {
                half_height: 100.0,
                aspect: 1.0,
                zoom: 2.0,
                near: 0.1,
                far: 5000.0,
                reference_fov: FRAC_PI_2,
            },
            controls: ControllerState::for_mode(CameraMode::Orthographic, Vec3::ZERO),
        };
        assert!((camera.equivalent_distance() - 50.0).abs() < 1e-3);
        assert_eq!(camera.visible_half_extents(), Some(Vec2::new(50.0, 50.0)));
    }
}
