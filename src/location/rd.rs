//! WGS84 latitude/longitude to Rijksdriehoek (EPSG:28992) grid coordinates.
//!
//! Polynomial approximation around Amersfoort, accurate to about a metre inside
//! the Netherlands.
use bevy::math::{DVec2, Vec3};

const LAT_0: f64 = 52.155_174_40;
const LON_0: f64 = 5.387_206_21;
const X_0: f64 = 155_000.0;
const Y_0: f64 = 463_000.0;

/// (power of Δφ, power of Δλ, coefficient)
const X_TERMS: [(i32, i32, f64); 9] = [
    (0, 1, 190_094.945),
    (1, 1, -11_832.228),
    (2, 1, -114.221),
    (0, 3, -32.391),
    (1, 0, -0.705),
    (3, 1, -2.340),
    (1, 3, -0.608),
    (0, 2, -0.008),
    (2, 3, 0.148),
];

const Y_TERMS: [(i32, i32, f64); 10] = [
    (1, 0, 309_056.544),
    (0, 2, 3_638.893),
    (2, 0, 73.077),
    (1, 2, -157.984),
    (3, 0, 59.788),
    (0, 1, 0.433),
    (2, 2, -6.439),
    (1, 1, -0.032),
    (0, 4, 0.092),
    (1, 4, -0.054),
];

/// Height at which the location marker floats, just above the basemap.
pub const MARKER_HEIGHT: f32 = -0.9;

pub fn wgs84_to_rd(latitude: f64, longitude: f64) -> DVec2 {
    let d_lat = 0.36 * (latitude - LAT_0);
    let d_lon = 0.36 * (longitude - LON_0);
    let sum = |terms: &[(i32, i32, f64)]| {
        terms
            .iter()
            .map(|&(p, q, c)| c * d_lat.powi(p) * d_lon.powi(q))
            .sum::<f64>()
    };
    DVec2::new(X_0 + sum(&X_TERMS), Y_0 + sum(&Y_TERMS))
}

/// Grid coordinates in the Y-up world frame the campus scene uses.
pub fn rd_to_world(rd: DVec2) -> Vec3 {
    Vec3::new(rd.x as f32, MARKER_HEIGHT, -rd.y as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amersfoort_is_the_grid_origin() {
        let rd = wgs84_to_rd(LAT_0, LON_0);
        assert!((rd.x - X_0).abs() < 1e-6);
        assert!((rd.y - Y_0).abs() < 1e-6);
    }

    #[test]
    fn delft_lands_near_the_campus() {
        let rd = wgs84_to_rd(52.0, 4.37);
        assert!((84_000.0..87_000.0).contains(&rd.x), "{rd:?}");
        assert!((445_000.0..447_500.0).contains(&rd.y), "{rd:?}");
    }

    #[test]
    fn north_maps_to_negative_z() {
        let world = rd_to_world(DVec2::new(85_000.0, 446_000.0));
        assert_eq!(world, Vec3::new(85_000.0, MARKER_HEIGHT, -446_000.0));
    }
}
