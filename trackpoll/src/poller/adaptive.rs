//! Speed-adaptive update interval.
//!
//! Targets a constant distance between recorded points instead of a constant
//! time between them. After each complete fix:
//!
//! ```text
//! speed    = max adjacent-pair speed over the trailing window
//! interval = clamp(round(target_distance / speed), min_interval, max_interval)
//!
//! fewer than two fixes in window ──► min_interval
//! speed == 0 (not finite)        ──► max_interval
//! ```
//!
//! Intervals are rounded to whole seconds so the provider is not
//! reconfigured on every small speed change. A changed interval is applied
//! with `timeout = interval + timeout_margin` before the next request.

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::interval::IntervalStrategy;
use crate::fix::PositionFix;
use crate::provider::UpdateOptions;
use crate::speed::{SpeedWindowCache, SpeedWindowError, DEFAULT_WINDOW_PERIOD};

/// Shortest interval the controller will select.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Longest interval the controller will select.
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(10);

/// Desired distance between consecutive fixes (metres).
pub const DEFAULT_TARGET_DISTANCE_M: f64 = 30.0;

/// Added to the interval to form the update timeout.
pub const DEFAULT_TIMEOUT_MARGIN: Duration = Duration::from_secs(1);

/// Invalid adaptive controller settings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdaptiveConfigError {
    #[error("minimum interval must be non-zero")]
    ZeroMinInterval,

    #[error("minimum interval {min:?} exceeds maximum interval {max:?}")]
    MinAboveMax { min: Duration, max: Duration },

    #[error("target distance must be a positive number of metres, got {0}")]
    InvalidTargetDistance(f64),

    #[error("window period must be non-zero")]
    ZeroWindow,
}

/// Adaptive controller settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveConfig {
    pub min_interval: Duration,
    pub max_interval: Duration,
    /// Desired spacing between fixes in metres.
    pub target_distance_m: f64,
    /// Trailing window for the max-speed estimate.
    pub window_period: Duration,
    pub timeout_margin: Duration,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_INTERVAL,
            max_interval: DEFAULT_MAX_INTERVAL,
            target_distance_m: DEFAULT_TARGET_DISTANCE_M,
            window_period: DEFAULT_WINDOW_PERIOD,
            timeout_margin: DEFAULT_TIMEOUT_MARGIN,
        }
    }
}

impl AdaptiveConfig {
    pub fn validate(&self) -> Result<(), AdaptiveConfigError> {
        if self.min_interval.is_zero() {
            return Err(AdaptiveConfigError::ZeroMinInterval);
        }
        if self.min_interval > self.max_interval {
            return Err(AdaptiveConfigError::MinAboveMax {
                min: self.min_interval,
                max: self.max_interval,
            });
        }
        if !self.target_distance_m.is_finite() || self.target_distance_m <= 0.0 {
            return Err(AdaptiveConfigError::InvalidTargetDistance(
                self.target_distance_m,
            ));
        }
        if self.window_period.is_zero() {
            return Err(AdaptiveConfigError::ZeroWindow);
        }
        Ok(())
    }
}

/// Interval strategy keeping recorded points roughly equidistant.
#[derive(Debug, Clone)]
pub struct AdaptiveInterval {
    config: AdaptiveConfig,
    cache: SpeedWindowCache,
}

impl AdaptiveInterval {
    pub fn new(config: AdaptiveConfig) -> Result<Self, AdaptiveConfigError> {
        config.validate()?;
        Ok(Self {
            cache: SpeedWindowCache::new(config.window_period),
            config,
        })
    }

    /// The speed window backing this controller.
    pub fn cache(&self) -> &SpeedWindowCache {
        &self.cache
    }

    /// Interval for a given maximum speed (m/s), clamped to the configured range.
    pub fn interval_for_speed(&self, speed_mps: f64) -> Duration {
        let seconds = self.config.target_distance_m / speed_mps;
        if !seconds.is_finite() {
            tracing::debug!(speed_mps, "Interval not computable, using maximum");
            return self.config.max_interval;
        }

        let rounded = seconds.round();
        if rounded <= self.config.min_interval.as_secs_f64() {
            self.config.min_interval
        } else if rounded >= self.config.max_interval.as_secs_f64() {
            self.config.max_interval
        } else {
            Duration::from_secs_f64(rounded)
        }
    }

    /// Record `fix` and compute the interval for the next request.
    ///
    /// # Panics
    ///
    /// If the window holds adjacent samples whose speed cannot be computed
    /// (non-increasing timestamps).
    pub fn desired_interval_at(&mut self, fix: &PositionFix, now: DateTime<Utc>) -> Duration {
        self.cache.add_point_at(fix, now);

        match self.cache.max_speed_at(now) {
            Ok(speed) => self.interval_for_speed(speed),
            Err(SpeedWindowError::InsufficientData { count }) => {
                tracing::debug!(count, "No max speed yet, using minimum interval");
                self.config.min_interval
            }
            Err(err @ SpeedWindowError::Inconsistent { .. }) => {
                panic!("speed window holds out-of-order fixes: {}", err)
            }
        }
    }
}

impl IntervalStrategy for AdaptiveInterval {
    fn name(&self) -> &'static str {
        "adaptive"
    }

    fn initial_options(&self) -> UpdateOptions {
        UpdateOptions::with_margin(self.config.min_interval, self.config.timeout_margin)
    }

    fn next_options(
        &mut self,
        fix: &PositionFix,
        current: &UpdateOptions,
    ) -> Option<UpdateOptions> {
        let desired = self.desired_interval_at(fix, Utc::now());
        if desired == current.update_interval() {
            return None;
        }

        tracing::info!(
            from_secs = current.update_interval().as_secs_f64(),
            to_secs = desired.as_secs_f64(),
            "Update interval changed"
        );
        Some(current.with_interval(desired, self.config.timeout_margin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fix::Coordinate;
    use chrono::TimeDelta;
    use proptest::prelude::*;

    fn controller() -> AdaptiveInterval {
        AdaptiveInterval::new(AdaptiveConfig::default()).unwrap()
    }

    fn fix_at(base: DateTime<Utc>, secs: i64, north_m: f64) -> PositionFix {
        let coord = Coordinate::new(48.1, 11.5).destination(0.0, north_m);
        PositionFix::at(base + TimeDelta::seconds(secs), coord)
    }

    #[test]
    fn test_default_config() {
        let config = AdaptiveConfig::default();
        assert_eq!(config.min_interval, Duration::from_secs(1));
        assert_eq!(config.max_interval, Duration::from_secs(10));
        assert_eq!(config.target_distance_m, 30.0);
        assert_eq!(config.window_period, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let bad = AdaptiveConfig {
            min_interval: Duration::from_secs(20),
            ..Default::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(AdaptiveConfigError::MinAboveMax { .. })
        ));

        let bad = AdaptiveConfig {
            target_distance_m: 0.0,
            ..Default::default()
        };
        assert_eq!(
            bad.validate(),
            Err(AdaptiveConfigError::InvalidTargetDistance(0.0))
        );

        let bad = AdaptiveConfig {
            min_interval: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(bad.validate(), Err(AdaptiveConfigError::ZeroMinInterval));
        assert!(AdaptiveInterval::new(bad).is_err());
    }

    #[test]
    fn test_initial_options_use_min_interval_plus_margin() {
        let options = controller().initial_options();
        assert_eq!(options.update_interval(), Duration::from_secs(1));
        assert_eq!(options.update_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_five_mps_gives_six_seconds() {
        let base = Utc::now();
        let mut ctl = controller();

        assert_eq!(
            ctl.desired_interval_at(&fix_at(base, 0, 0.0), base),
            Duration::from_secs(1)
        );
        let now = base + TimeDelta::seconds(2);
        assert_eq!(
            ctl.desired_interval_at(&fix_at(base, 2, 10.0), now),
            Duration::from_secs(6)
        );
    }

    #[test]
    fn test_single_fix_gives_min_interval() {
        let base = Utc::now();
        let mut ctl = controller();
        assert_eq!(
            ctl.desired_interval_at(&fix_at(base, 0, 0.0), base),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn test_stationary_gives_max_interval() {
        let base = Utc::now();
        let mut ctl = controller();
        ctl.desired_interval_at(&fix_at(base, 0, 0.0), base);
        let interval = ctl.desired_interval_at(&fix_at(base, 5, 0.0), base + TimeDelta::seconds(5));
        assert_eq!(interval, Duration::from_secs(10));
    }

    #[test]
    fn test_fast_movement_clamped_to_min() {
        let ctl = controller();
        assert_eq!(ctl.interval_for_speed(100.0), Duration::from_secs(1));
    }

    #[test]
    fn test_slow_movement_clamped_to_max() {
        let ctl = controller();
        assert_eq!(ctl.interval_for_speed(0.5), Duration::from_secs(10));
    }

    #[test]
    fn test_interval_rounds_to_whole_seconds() {
        let ctl = controller();
        // 30 / 7 = 4.29 → 4
        assert_eq!(ctl.interval_for_speed(7.0), Duration::from_secs(4));
        // 30 / 6.5 = 4.62 → 5
        assert_eq!(ctl.interval_for_speed(6.5), Duration::from_secs(5));
    }

    #[test]
    fn test_next_options_only_on_change() {
        let base = Utc::now() - TimeDelta::seconds(2);
        let mut ctl = controller();
        let current = ctl.initial_options();

        // First fix: min interval, same as current
        assert_eq!(ctl.next_options(&fix_at(base, 0, 0.0), &current), None);

        // 10 m in 2 s → 6 s, timeout 7 s
        let changed = ctl.next_options(&fix_at(base, 2, 10.0), &current).unwrap();
        assert_eq!(changed.update_interval(), Duration::from_secs(6));
        assert_eq!(changed.update_timeout(), Duration::from_secs(7));
        assert_eq!(ctl.cache().len(), 2);
    }

    #[test]
    #[should_panic(expected = "out-of-order")]
    fn test_out_of_order_fixes_panic() {
        let base = Utc::now();
        let mut ctl = controller();
        ctl.desired_interval_at(&fix_at(base, 5, 0.0), base);
        ctl.desired_interval_at(&fix_at(base, 5, 10.0), base);
    }

    proptest! {
        #[test]
        fn prop_interval_within_bounds(speed in 0.0f64..1_000.0) {
            let ctl = controller();
            let interval = ctl.interval_for_speed(speed);
            prop_assert!(interval >= Duration::from_secs(1));
            prop_assert!(interval <= Duration::from_secs(10));
        }

        #[test]
        fn prop_interval_non_increasing_in_speed(a in 0.0f64..200.0, b in 0.0f64..200.0) {
            let ctl = controller();
            let (slow, fast) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(ctl.interval_for_speed(slow) >= ctl.interval_for_speed(fast));
        }
    }
}
