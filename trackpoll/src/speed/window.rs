//! Sliding-window speed cache.
//!
//! Keeps the fixes of the trailing window period and reports the maximum
//! speed between chronologically adjacent fixes. Samples are appended in
//! arrival order and never reordered; samples older than `now - window` are
//! evicted lazily before every read or write.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

use crate::fix::{speed_between, Coordinate, PositionFix, SpeedError};

/// Default trailing window over which speed is evaluated.
pub const DEFAULT_WINDOW_PERIOD: Duration = Duration::from_secs(60);

/// A retained fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedSample {
    pub coordinate: Coordinate,
    pub timestamp: DateTime<Utc>,
}

impl From<&PositionFix> for SpeedSample {
    fn from(fix: &PositionFix) -> Self {
        Self {
            coordinate: fix.coordinate,
            timestamp: fix.timestamp,
        }
    }
}

/// Errors from [`SpeedWindowCache::max_speed`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpeedWindowError {
    /// Fewer than two samples in the window. Expected while warming up.
    #[error("not enough samples to calculate speed ({count} in window)")]
    InsufficientData { count: usize },

    /// Two adjacent samples could not produce a speed. Never expected with
    /// increasing timestamps.
    #[error("speed between samples {index} and {} failed: {source}", .index + 1)]
    Inconsistent {
        index: usize,
        #[source]
        source: SpeedError,
    },
}

/// Time-bounded ordered cache of recent fixes.
///
/// # Usage
///
/// ```ignore
/// let mut cache = SpeedWindowCache::new(Duration::from_secs(60));
///
/// cache.add_point(&fix);
/// match cache.max_speed() {
///     Ok(speed) => println!("max speed {:.1} m/s", speed),
///     Err(SpeedWindowError::InsufficientData { .. }) => {}
///     Err(e) => panic!("{}", e),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SpeedWindowCache {
    /// Retained samples, arrival order.
    samples: VecDeque<SpeedSample>,
    window: Duration,
    /// `window` as a signed delta; `None` when it exceeds the chrono range.
    window_delta: Option<TimeDelta>,
}

impl Default for SpeedWindowCache {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_PERIOD)
    }
}

impl SpeedWindowCache {
    pub fn new(window: Duration) -> Self {
        Self {
            samples: VecDeque::new(),
            window,
            window_delta: TimeDelta::from_std(window).ok(),
        }
    }

    /// The trailing window period.
    pub fn window_period(&self) -> Duration {
        self.window
    }

    /// Evict old samples, then append `fix`.
    pub fn add_point(&mut self, fix: &PositionFix) {
        self.add_point_at(fix, Utc::now());
    }

    /// [`add_point`](Self::add_point) with an explicit current time.
    pub fn add_point_at(&mut self, fix: &PositionFix, now: DateTime<Utc>) {
        self.evict_at(now);
        self.samples.push_back(SpeedSample::from(fix));
        tracing::trace!(
            samples = self.samples.len(),
            lat = fix.latitude(),
            lon = fix.longitude(),
            "Point added to speed window"
        );
    }

    /// Maximum speed (m/s) between adjacent samples in the window.
    pub fn max_speed(&mut self) -> Result<f64, SpeedWindowError> {
        self.max_speed_at(Utc::now())
    }

    /// [`max_speed`](Self::max_speed) with an explicit current time.
    pub fn max_speed_at(&mut self, now: DateTime<Utc>) -> Result<f64, SpeedWindowError> {
        self.evict_at(now);

        let count = self.samples.len();
        if count < 2 {
            tracing::debug!(count, "Cannot calculate max speed - not enough points");
            return Err(SpeedWindowError::InsufficientData { count });
        }

        let mut max_speed = 0.0_f64;
        for (index, (prev, next)) in self
            .samples
            .iter()
            .zip(self.samples.iter().skip(1))
            .enumerate()
        {
            let speed = speed_between(
                &prev.coordinate,
                prev.timestamp,
                &next.coordinate,
                next.timestamp,
            )
            .map_err(|source| SpeedWindowError::Inconsistent { index, source })?;
            max_speed = max_speed.max(speed);
        }

        tracing::debug!(
            max_speed_mps = max_speed,
            samples = count,
            "Max speed in window"
        );
        Ok(max_speed)
    }

    /// Drop samples with `timestamp < now - window`. Returns how many were removed.
    pub fn evict_at(&mut self, now: DateTime<Utc>) -> usize {
        let Some(cutoff) = self.window_delta.and_then(|w| now.checked_sub_signed(w)) else {
            return 0;
        };

        let before = self.samples.len();
        self.samples.retain(|s| s.timestamp >= cutoff);
        let removed = before - self.samples.len();

        if removed > 0 {
            tracing::trace!(removed, remaining = self.samples.len(), "Evicted outdated points");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Retained samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &SpeedSample> {
        self.samples.iter()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
