//! Spherical geodesy helpers.
//!
//! Distances use the haversine formula on a spherical Earth. For the short
//! hops between consecutive fixes the error against the ellipsoid is well
//! below GPS noise.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point on the Earth's surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude/longitude in degrees.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in metres.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }

    /// Initial bearing towards `other` in degrees (0-360), 0 = North, 90 = East.
    pub fn bearing_to(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let y = dlon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
        let bearing_deg = y.atan2(x).to_degrees();

        if bearing_deg < 0.0 {
            bearing_deg + 360.0
        } else {
            bearing_deg
        }
    }

    /// Point reached by travelling `distance_m` metres from here along
    /// the initial bearing `bearing_deg`.
    pub fn destination(&self, bearing_deg: f64, distance_m: f64) -> Coordinate {
        let delta = distance_m / EARTH_RADIUS_M;
        let theta = bearing_deg.to_radians();
        let lat1 = self.latitude.to_radians();
        let lon1 = self.longitude.to_radians();

        let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
        let lon2 = lon1
            + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

        // Normalize longitude to [-180, 180)
        let lon2 = (lon2.to_degrees() + 540.0) % 360.0 - 180.0;

        Coordinate::new(lat2.to_degrees(), lon2)
    }
}

/// Errors computing the speed between two samples.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SpeedError {
    /// The later sample is not strictly after the earlier one.
    #[error("non-positive elapsed time between samples ({elapsed_ms} ms)")]
    NonPositiveElapsed { elapsed_ms: i64 },
}

/// Average ground speed in metres per second when moving from `from` at
/// `from_time` to `to` at `to_time`.
pub fn speed_between(
    from: &Coordinate,
    from_time: DateTime<Utc>,
    to: &Coordinate,
    to_time: DateTime<Utc>,
) -> Result<f64, SpeedError> {
    let elapsed = to_time - from_time;
    let seconds = match elapsed.to_std() {
        Ok(d) if !d.is_zero() => d.as_secs_f64(),
        _ => {
            return Err(SpeedError::NonPositiveElapsed {
                elapsed_ms: elapsed.num_milliseconds(),
            });
        }
    };

    Ok(from.distance_to(to) / seconds)
}
