//! Update parameters applied to a position provider.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Default interval between fixes for a fixed-rate poller.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(1);

/// Default time the provider may take before declaring a timeout.
pub const DEFAULT_UPDATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Invalid update option combinations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("update interval must be non-zero")]
    ZeroInterval,

    #[error("update timeout {timeout:?} is shorter than update interval {interval:?}")]
    TimeoutShorterThanInterval {
        interval: Duration,
        timeout: Duration,
    },
}

/// Provider update options.
///
/// `update_timeout >= update_interval` always holds: both constructors
/// enforce it and the fields are not publicly mutable. Cached fixes are never
/// reused, so `max_fix_age` is always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateOptions {
    update_interval: Duration,
    update_timeout: Duration,
    max_fix_age: Duration,
    accept_partial_updates: bool,
}

impl UpdateOptions {
    /// Create options with an explicit timeout.
    pub fn new(update_interval: Duration, update_timeout: Duration) -> Result<Self, OptionsError> {
        if update_interval.is_zero() {
            return Err(OptionsError::ZeroInterval);
        }
        if update_timeout < update_interval {
            return Err(OptionsError::TimeoutShorterThanInterval {
                interval: update_interval,
                timeout: update_timeout,
            });
        }
        Ok(Self {
            update_interval,
            update_timeout,
            max_fix_age: Duration::ZERO,
            accept_partial_updates: true,
        })
    }

    /// Create options whose timeout is `update_interval + margin`.
    ///
    /// A zero interval is raised to one millisecond.
    pub fn with_margin(update_interval: Duration, margin: Duration) -> Self {
        let update_interval = update_interval.max(Duration::from_millis(1));
        Self {
            update_interval,
            update_timeout: update_interval.saturating_add(margin),
            max_fix_age: Duration::ZERO,
            accept_partial_updates: true,
        }
    }

    /// Copy of these options with a new interval and `timeout = interval + margin`.
    pub fn with_interval(&self, update_interval: Duration, margin: Duration) -> Self {
        Self {
            accept_partial_updates: self.accept_partial_updates,
            ..Self::with_margin(update_interval, margin)
        }
    }

    /// Whether the provider may complete with timestamp-only updates.
    pub fn with_partial_updates(mut self, accept: bool) -> Self {
        self.accept_partial_updates = accept;
        self
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    pub fn update_timeout(&self) -> Duration {
        self.update_timeout
    }

    pub fn max_fix_age(&self) -> Duration {
        self.max_fix_age
    }

    pub fn accept_partial_updates(&self) -> bool {
        self.accept_partial_updates
    }
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL,
            update_timeout: DEFAULT_UPDATE_TIMEOUT,
            max_fix_age: Duration::ZERO,
            accept_partial_updates: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = UpdateOptions::default();
        assert_eq!(opts.update_interval(), Duration::from_secs(1));
        assert_eq!(opts.update_timeout(), Duration::from_secs(5));
        assert_eq!(opts.max_fix_age(), Duration::ZERO);
        assert!(opts.accept_partial_updates());
    }

    #[test]
    fn test_new_rejects_short_timeout() {
        let err = UpdateOptions::new(Duration::from_secs(5), Duration::from_secs(2)).unwrap_err();
        assert!(matches!(err, OptionsError::TimeoutShorterThanInterval { .. }));
        assert!(err.to_string().contains("shorter than update interval"));
    }

    #[test]
    fn test_new_rejects_zero_interval() {
        assert_eq!(
            UpdateOptions::new(Duration::ZERO, Duration::from_secs(1)),
            Err(OptionsError::ZeroInterval)
        );
    }

    #[test]
    fn test_new_accepts_equal_timeout() {
        let opts = UpdateOptions::new(Duration::from_secs(3), Duration::from_secs(3)).unwrap();
        assert_eq!(opts.update_timeout(), opts.update_interval());
    }

    #[test]
    fn test_with_interval_keeps_partial_flag() {
        let opts = UpdateOptions::default().with_partial_updates(false);
        let changed = opts.with_interval(Duration::from_secs(6), Duration::from_secs(1));

        assert_eq!(changed.update_interval(), Duration::from_secs(6));
        assert_eq!(changed.update_timeout(), Duration::from_secs(7));
        assert!(!changed.accept_partial_updates());
    }
}
