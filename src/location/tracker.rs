//! Tracks the latest location fix and where its marker sits in the world.
use bevy::math::DVec2;
use bevy::prelude::*;

use super::rd::{rd_to_world, wgs84_to_rd};

const DEFAULT_ACCURACY: f32 = 25.0;
const MIN_FRAMING_DISTANCE: f32 = 100.0;

/// One position report from a location source.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Radius of the accuracy circle in metres.
    pub accuracy: f32,
}

impl LocationFix {
    /// Parses `"lat,lon"` or `"lat,lon,accuracy"`.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(',').map(str::trim);
        let latitude: f64 = parts.next()?.parse().ok()?;
        let longitude: f64 = parts.next()?.parse().ok()?;
        let accuracy = match parts.next() {
            Some(value) => value.parse::<f32>().ok()?,
            None => DEFAULT_ACCURACY,
        };
        if parts.next().is_some()
            || !(-90.0..=90.0).contains(&latitude)
            || !(-180.0..=180.0).contains(&longitude)
            || !accuracy.is_finite()
            || accuracy < 0.0
        {
            return None;
        }
        Some(Self {
            latitude,
            longitude,
            accuracy,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixOutcome {
    /// First fix inside the map; the camera should move there.
    First(Vec3),
    Moved(Vec3),
    /// The marker is hidden until a fix lands inside the map again.
    OutsideMap,
}

#[derive(Resource, Debug, Clone)]
pub struct LocationTracker {
    /// Grid rectangle covered by the basemap.
    min: DVec2,
    max: DVec2,
    position: Option<Vec3>,
    accuracy: f32,
    centred: bool,
}

impl LocationTracker {
    /// `bounds` is `[min_x, min_y, max_x, max_y]` in grid metres.
    pub fn new(bounds: [f64; 4]) -> Self {
        let [min_x, min_y, max_x, max_y] = bounds;
        Self {
            min: DVec2::new(min_x.min(max_x), min_y.min(max_y)),
            max: DVec2::new(min_x.max(max_x), min_y.max(max_y)),
            position: None,
            accuracy: 0.0,
            centred: false,
        }
    }

    /// Marker position, `None` while hidden.
    pub fn position(&self) -> Option<Vec3> {
        self.position
    }

    pub fn accuracy(&self) -> f32 {
        self.accuracy
    }

    pub fn apply(&mut self, fix: &LocationFix) -> FixOutcome {
        let rd = wgs84_to_rd(fix.latitude, fix.longitude);
        if rd.cmplt(self.min).any() || rd.cmpgt(self.max).any() {
            self.position = None;
            return FixOutcome::OutsideMap;
        }
        let world = rd_to_world(rd);
        self.position = Some(world);
        self.accuracy = fix.accuracy;
        if self.centred {
            FixOutcome::Moved(world)
        } else {
            self.centred = true;
            FixOutcome::First(world)
        }
    }

    /// Camera distance that keeps the accuracy circle in view.
    pub fn framing_distance(&self) -> f32 {
        (4.0 * self.accuracy).max(MIN_FRAMING_DISTANCE)
    }
}
