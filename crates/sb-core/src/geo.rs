//! Geographic coordinates and planar angle helpers.
//!
//! Headings in the local frame are radians, counter-clockwise positive
//! (+left), measured from the local x axis.  Compass and GPS bearings are
//! degrees clockwise from north; [`compass_to_heading`] converts between the
//! two under the convention that local +x points east.

use std::f64::consts::{PI, TAU};

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }

    /// Initial great-circle bearing towards `other`, degrees clockwise from
    /// north in `[0, 360)`.
    pub fn bearing_deg(self, other: GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
        y.atan2(x).to_degrees().rem_euclid(360.0)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

// ── Angles ────────────────────────────────────────────────────────────────────

/// Wrap an angle into `(-π, π]`.
#[inline]
pub fn normalize_angle(rad: f64) -> f64 {
    let wrapped = (rad + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Signed smallest rotation from `from` to `to`, in `(-π, π]`.
#[inline]
pub fn angle_diff(to: f64, from: f64) -> f64 {
    normalize_angle(to - from)
}

/// Compass degrees (clockwise from north) → local heading radians (CCW from east).
#[inline]
pub fn compass_to_heading(deg: f64) -> f64 {
    normalize_angle((90.0 - deg).to_radians())
}

/// Bearing and distance from `(x, y)` to `(tx, ty)` in the local frame.
#[inline]
pub fn local_bearing(x: f64, y: f64, tx: f64, ty: f64) -> (f64, f64) {
    let dx = tx - x;
    let dy = ty - y;
    (dy.atan2(dx), dx.hypot(dy))
}
