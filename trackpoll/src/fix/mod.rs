//! Location fixes as delivered by a position provider.
//!
//! A [`PositionFix`] is always complete: it carries a timestamp and a valid
//! coordinate. Partial updates (timestamp only) never produce a
//! `PositionFix`; they are reported through
//! [`Completion::PartialUpdate`](crate::provider::Completion::PartialUpdate).
//!
//! Providers differ in how much extra data they attach to a fix. Rather than
//! a hierarchy of fix classes, the extra data is a tagged [`FixDetail`]
//! carrying only what was actually populated.

mod geo;

pub use geo::{speed_between, Coordinate, SpeedError, EARTH_RADIUS_M};

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shape of fix data requested from a provider.
///
/// Ordered from least to most detailed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FixShape {
    /// Position only.
    Basic,
    /// Position plus speed and heading.
    Course,
    /// Position, course and satellite quality.
    Satellite,
}

impl fmt::Display for FixShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixShape::Basic => write!(f, "basic"),
            FixShape::Course => write!(f, "course"),
            FixShape::Satellite => write!(f, "satellite"),
        }
    }
}

/// Speed and heading reported by the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CourseInfo {
    /// Ground speed in metres per second.
    pub speed_mps: Option<f32>,
    /// Heading in degrees (0-360), 0 = North.
    pub heading_deg: Option<f32>,
}

/// Satellite constellation quality for a fix.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SatelliteInfo {
    pub course: CourseInfo,
    pub satellites_in_view: u8,
    pub satellites_used: u8,
    /// Horizontal dilution of precision.
    pub hdop: Option<f32>,
    /// Vertical dilution of precision.
    pub vdop: Option<f32>,
    /// Time dilution of precision.
    pub tdop: Option<f32>,
}

/// Provider-specific extras attached to a fix.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FixDetail {
    #[default]
    Basic,
    Course(CourseInfo),
    Satellite(SatelliteInfo),
}

impl FixDetail {
    /// The shape this detail corresponds to.
    pub fn shape(&self) -> FixShape {
        match self {
            FixDetail::Basic => FixShape::Basic,
            FixDetail::Course(_) => FixShape::Course,
            FixDetail::Satellite(_) => FixShape::Satellite,
        }
    }

    /// Course information, if the provider supplied any.
    pub fn course(&self) -> Option<&CourseInfo> {
        match self {
            FixDetail::Basic => None,
            FixDetail::Course(course) => Some(course),
            FixDetail::Satellite(sat) => Some(&sat.course),
        }
    }
}

/// One complete location sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    /// When the receiver computed the fix.
    pub timestamp: DateTime<Utc>,
    pub coordinate: Coordinate,
    /// Altitude above WGS84 ellipsoid in metres.
    pub altitude: Option<f32>,
    /// Horizontal accuracy (metres).
    pub horizontal_accuracy: Option<f32>,
    /// Vertical accuracy (metres).
    pub vertical_accuracy: Option<f32>,
    pub detail: FixDetail,
}

impl PositionFix {
    /// Create a basic fix with no altitude or accuracy information.
    pub fn new(timestamp: DateTime<Utc>, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp,
            coordinate: Coordinate::new(latitude, longitude),
            altitude: None,
            horizontal_accuracy: None,
            vertical_accuracy: None,
            detail: FixDetail::Basic,
        }
    }

    /// Create a basic fix at a coordinate.
    pub fn at(timestamp: DateTime<Utc>, coordinate: Coordinate) -> Self {
        Self::new(timestamp, coordinate.latitude, coordinate.longitude)
    }

    pub fn with_altitude(mut self, altitude: f32) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_detail(mut self, detail: FixDetail) -> Self {
        self.detail = detail;
        self
    }

    pub fn latitude(&self) -> f64 {
        self.coordinate.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.coordinate.longitude
    }

    /// Speed in m/s needed to travel from `earlier` to this fix.
    pub fn speed_since(&self, earlier: &PositionFix) -> Result<f64, SpeedError> {
        speed_between(
            &earlier.coordinate,
            earlier.timestamp,
            &self.coordinate,
            self.timestamp,
        )
    }
}

impl fmt::Display for PositionFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lat={:.6} lon={:.6}",
            self.coordinate.latitude, self.coordinate.longitude
        )?;
        if let Some(alt) = self.altitude {
            write!(f, " alt={:.1}", alt)?;
        }
        write!(f, " time={}", self.timestamp.format("%Y-%m-%dT%H:%M:%SZ"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_fix_shape_ordering() {
        assert!(FixShape::Satellite > FixShape::Course);
        assert!(FixShape::Course > FixShape::Basic);
    }

    #[test]
    fn test_detail_shape_and_course() {
        assert_eq!(FixDetail::Basic.shape(), FixShape::Basic);
        assert!(FixDetail::Basic.course().is_none());

        let course = CourseInfo {
            speed_mps: Some(3.5),
            heading_deg: Some(270.0),
        };
        let sat = FixDetail::Satellite(SatelliteInfo {
            course,
            satellites_in_view: 9,
            satellites_used: 7,
            ..Default::default()
        });
        assert_eq!(sat.shape(), FixShape::Satellite);
        assert_eq!(sat.course(), Some(&course));
    }

    #[test]
    fn test_speed_since() {
        let t0 = Utc::now();
        let a = PositionFix::new(t0, 0.0, 0.0);
        let b = PositionFix::at(t0 + TimeDelta::seconds(4), a.coordinate.destination(90.0, 20.0));

        let speed = b.speed_since(&a).unwrap();
        assert!((speed - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_display_includes_altitude() {
        let fix = PositionFix::new(Utc::now(), 53.5, 10.0).with_altitude(12.0);
        let text = fix.to_string();
        assert!(text.contains("lat=53.500000"));
        assert!(text.contains("alt=12.0"));
    }

    #[test]
    fn test_detail_serializes_tagged() {
        let json = serde_json::to_string(&FixDetail::Course(CourseInfo::default())).unwrap();
        assert!(json.contains("\"kind\":\"course\""), "got {}", json);
    }
}
