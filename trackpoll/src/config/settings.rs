//! Configuration structs and their defaults.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::logging::{default_log_dir, default_log_file};
use crate::poller::{AdaptiveConfig, PollerError, PositionListener, PositionPoller};
use crate::provider::{
    OptionsError, PositionProvider, UpdateOptions, DEFAULT_UPDATE_INTERVAL,
    DEFAULT_UPDATE_TIMEOUT,
};

/// How the update interval is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollingMode {
    /// Constant interval from `[polling]`.
    Fixed,
    /// Distance-based interval from `[adaptive]`.
    #[default]
    Adaptive,
}

impl PollingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollingMode::Fixed => "fixed",
            PollingMode::Adaptive => "adaptive",
        }
    }
}

impl fmt::Display for PollingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PollingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(PollingMode::Fixed),
            "adaptive" => Ok(PollingMode::Adaptive),
            other => Err(format!("unknown polling mode '{}'", other)),
        }
    }
}

/// `[polling]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct PollingSettings {
    pub mode: PollingMode,
    /// Interval for fixed mode.
    pub update_interval: Duration,
    /// Timeout for fixed mode.
    pub update_timeout: Duration,
    /// Fixed mode only; the adaptive controller always accepts partial updates.
    pub accept_partial_updates: bool,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            mode: PollingMode::default(),
            update_interval: DEFAULT_UPDATE_INTERVAL,
            update_timeout: DEFAULT_UPDATE_TIMEOUT,
            accept_partial_updates: true,
        }
    }
}

impl PollingSettings {
    /// Provider options for fixed mode.
    pub fn update_options(&self) -> Result<UpdateOptions, OptionsError> {
        Ok(UpdateOptions::new(self.update_interval, self.update_timeout)?
            .with_partial_updates(self.accept_partial_updates))
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: default_log_dir(),
            file: default_log_file().to_string(),
        }
    }
}

/// Complete tracker configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackerConfig {
    pub polling: PollingSettings,
    pub adaptive: AdaptiveConfig,
    pub logging: LoggingSettings,
}

impl TrackerConfig {
    /// Build the poller selected by `polling.mode`.
    pub fn build_poller(
        &self,
        provider: Box<dyn PositionProvider>,
        listener: Arc<dyn PositionListener>,
    ) -> Result<PositionPoller, PollerError> {
        match self.polling.mode {
            PollingMode::Fixed => {
                let options = self.polling.update_options()?;
                PositionPoller::fixed(provider, listener, options)
            }
            PollingMode::Adaptive => PositionPoller::adaptive(provider, listener, self.adaptive),
        }
    }
}
