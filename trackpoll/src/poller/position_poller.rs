//! The position poller state machine.
//!
//! # State Machine
//!
//! ```text
//!            start()                 Success
//! Stopped ───────────► AwaitingFix ──────────► FixAcquired
//!    ▲                   ▲    │  ▲                 │
//!    │                   │    │  └─ Timeout/Partial┘
//!    │   stop()/Cancelled/Failed (from any state)  │
//!    └──────────────────────────────────────────────┘
//! ```
//!
//! | Completion    | New state   | Edge (on change)              | Reissue |
//! |---------------|-------------|-------------------------------|---------|
//! | Success       | FixAcquired | restored                      | yes     |
//! | PartialUpdate | AwaitingFix | lost if leaving FixAcquired   | yes     |
//! | Timeout       | AwaitingFix | lost if leaving FixAcquired   | yes     |
//! | Cancelled     | Stopped     | none                          | no      |
//! | Failed        | Stopped     | lost if leaving FixAcquired,  | no      |
//! |               |             | then `on_position_error`      |         |
//!
//! Entering `AwaitingFix` from `Stopped` also fires `on_position_lost`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use super::adaptive::{AdaptiveConfig, AdaptiveInterval};
use super::error::PollerError;
use super::interval::{FixedInterval, IntervalStrategy};
use super::listener::PositionListener;
use super::state::{edge, Edge, PollerState};
use crate::fix::{FixShape, PositionFix};
use crate::provider::{Completion, PositionProvider, ProviderError, UpdateOptions};

/// Polls a provider for fixes, one request at a time.
///
/// # Example
///
/// ```ignore
/// let (listener, mut events) = ChannelListener::channel();
/// let mut poller = PositionPoller::adaptive(
///     Box::new(provider),
///     Arc::new(listener),
///     AdaptiveConfig::default(),
/// )?;
///
/// let cancel = CancellationToken::new();
/// tokio::spawn(async move { poller.run(cancel).await });
/// ```
pub struct PositionPoller {
    provider: Box<dyn PositionProvider>,
    listener: Arc<dyn PositionListener>,
    strategy: Box<dyn IntervalStrategy>,
    module_name: String,
    shape: FixShape,
    options: UpdateOptions,
    state: PollerState,
    /// Whether a request is outstanding against the provider.
    outstanding: bool,
    last_fix: Option<PositionFix>,
    previous_fix: Option<PositionFix>,
    last_partial: Option<DateTime<Utc>>,
    last_error: Option<ProviderError>,
}

impl fmt::Debug for PositionPoller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionPoller")
            .field("module", &self.module_name)
            .field("strategy", &self.strategy.name())
            .field("shape", &self.shape)
            .field("options", &self.options)
            .field("state", &self.state)
            .field("outstanding", &self.outstanding)
            .finish_non_exhaustive()
    }
}

impl PositionPoller {
    /// Create a poller with an explicit interval strategy.
    ///
    /// Queries the provider's capabilities once and selects the richest
    /// supported fix shape, then applies the strategy's initial options.
    ///
    /// # Errors
    ///
    /// - `UnsupportedCapability` if the module supports no usable fix shape
    /// - `Provider` if the initial options are rejected
    pub fn new(
        mut provider: Box<dyn PositionProvider>,
        listener: Arc<dyn PositionListener>,
        strategy: Box<dyn IntervalStrategy>,
    ) -> Result<Self, PollerError> {
        let info = provider.module_info();
        let Some(shape) = info.capabilities.best_shape() else {
            tracing::error!(
                module = %info.name,
                capabilities = %info.capabilities,
                "Positioning module does not support any suitable fix data"
            );
            return Err(PollerError::UnsupportedCapability {
                module: info.name,
                capabilities: info.capabilities,
            });
        };

        let options = strategy.initial_options();
        provider.configure(&options)?;

        tracing::info!(
            module = %info.name,
            shape = %shape,
            strategy = strategy.name(),
            interval_secs = options.update_interval().as_secs_f64(),
            timeout_secs = options.update_timeout().as_secs_f64(),
            "Position poller created"
        );

        Ok(Self {
            provider,
            listener,
            strategy,
            module_name: info.name,
            shape,
            options,
            state: PollerState::Stopped,
            outstanding: false,
            last_fix: None,
            previous_fix: None,
            last_partial: None,
            last_error: None,
        })
    }

    /// Create a fixed-rate poller.
    pub fn fixed(
        provider: Box<dyn PositionProvider>,
        listener: Arc<dyn PositionListener>,
        options: UpdateOptions,
    ) -> Result<Self, PollerError> {
        Self::new(provider, listener, Box::new(FixedInterval::new(options)))
    }

    /// Create a speed-adaptive poller.
    pub fn adaptive(
        provider: Box<dyn PositionProvider>,
        listener: Arc<dyn PositionListener>,
        config: AdaptiveConfig,
    ) -> Result<Self, PollerError> {
        let strategy = AdaptiveInterval::new(config)?;
        Self::new(provider, listener, Box::new(strategy))
    }

    /// Begin polling.
    ///
    /// Cancels any outstanding request first, so calling it twice is harmless.
    pub fn start(&mut self) {
        tracing::info!(module = %self.module_name, "Position poller started");
        if self.outstanding {
            self.provider.cancel();
        }
        self.last_error = None;
        self.outstanding = true;
        self.set_state(PollerState::AwaitingFix);
    }

    /// Stop polling.
    ///
    /// Aborts the outstanding request. No listener callback is made for the
    /// cancellation, and a completion for the aborted request that still
    /// arrives is dropped.
    pub fn stop(&mut self) {
        if self.outstanding {
            self.provider.cancel();
            self.outstanding = false;
            tracing::info!(module = %self.module_name, "Position poller stopped");
        }
        self.state = PollerState::Stopped;
    }

    /// Apply a provider completion for the outstanding request.
    ///
    /// Returns `true` if the next request must be issued.
    pub fn handle_completion(&mut self, completion: Completion) -> bool {
        if !self.outstanding {
            tracing::debug!(
                completion = completion.label(),
                "Completion without outstanding request dropped"
            );
            return false;
        }

        match completion {
            Completion::Success(fix) => {
                tracing::debug!(
                    lat = fix.latitude(),
                    lon = fix.longitude(),
                    alt = fix.altitude,
                    "Position received"
                );

                // Interval changes must land before the next request goes out
                if let Some(options) = self.strategy.next_options(&fix, &self.options) {
                    self.reconfigure(options);
                }

                self.previous_fix = self.last_fix.replace(fix);
                self.set_state(PollerState::FixAcquired);
                self.listener.on_position_updated(&fix);
            }
            Completion::PartialUpdate { timestamp } => {
                tracing::debug!(%timestamp, "Position partial update");
                self.last_partial = Some(timestamp);
                self.set_state(PollerState::AwaitingFix);
                self.listener.on_position_partial_updated(timestamp);
            }
            Completion::Timeout => {
                tracing::warn!(
                    timeout_secs = self.options.update_timeout().as_secs_f64(),
                    "Positioning request timed out"
                );
                self.set_state(PollerState::AwaitingFix);
            }
            Completion::Cancelled => {
                tracing::info!("Positioning request cancelled");
                self.outstanding = false;
                self.state = PollerState::Stopped;
            }
            Completion::Failed(error) => {
                tracing::error!(error = %error, "Positioning failed, poller stopped");
                self.outstanding = false;
                // Listeners holding a fix hear about the loss before the error
                self.set_state(PollerState::Stopped);
                self.listener.on_position_error(&error);
                self.last_error = Some(error);
            }
        }

        self.outstanding
    }

    /// Drive the poller until cancelled or stopped by the provider.
    ///
    /// Cancellation takes priority over a completion that is ready at the same
    /// time, and behaves exactly like [`stop`](Self::stop).
    ///
    /// # Errors
    ///
    /// `PollerError::Provider` if polling ended on a provider error. The
    /// listener has already been told through `on_position_error`.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), PollerError> {
        self.start();

        while self.outstanding {
            let shape = self.shape;
            let completion = tokio::select! {
                biased;

                _ = cancel.cancelled() => None,

                completion = self.provider.request_fix(shape) => Some(completion),
            };

            match completion {
                Some(completion) => {
                    self.handle_completion(completion);
                }
                None => {
                    self.stop();
                    return Ok(());
                }
            }
        }

        match self.last_error.clone() {
            Some(error) => Err(PollerError::Provider(error)),
            None => Ok(()),
        }
    }

    /// Apply new options, keeping the old ones if the provider refuses.
    fn reconfigure(&mut self, options: UpdateOptions) {
        match self.provider.configure(&options) {
            Ok(()) => {
                tracing::info!(
                    interval_secs = options.update_interval().as_secs_f64(),
                    timeout_secs = options.update_timeout().as_secs_f64(),
                    "Provider reconfigured"
                );
                self.options = options;
            }
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    interval_secs = options.update_interval().as_secs_f64(),
                    "Provider rejected new update options, keeping previous"
                );
            }
        }
    }

    fn set_state(&mut self, state: PollerState) {
        let old = self.state;
        self.state = state;

        if old != state {
            tracing::debug!(from = %old, to = %state, "Poller state changed");
        }

        match edge(old, state) {
            Some(Edge::Restored) => {
                tracing::info!("Position restored");
                self.listener.on_position_restored();
            }
            Some(Edge::Lost) => {
                tracing::info!("Position lost");
                self.listener.on_position_lost();
            }
            None => {}
        }
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    /// Whether polling is active (not stopped).
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Whether the most recent completion was a complete fix.
    pub fn has_fix(&self) -> bool {
        self.state == PollerState::FixAcquired
    }

    /// Most recent complete fix.
    pub fn last_fix(&self) -> Option<&PositionFix> {
        self.last_fix.as_ref()
    }

    /// The complete fix before [`last_fix`](Self::last_fix).
    pub fn previous_fix(&self) -> Option<&PositionFix> {
        self.previous_fix.as_ref()
    }

    /// Timestamp of the most recent partial update.
    pub fn last_partial_update(&self) -> Option<DateTime<Utc>> {
        self.last_partial
    }

    /// The provider error that stopped polling, if any.
    pub fn last_error(&self) -> Option<&ProviderError> {
        self.last_error.as_ref()
    }

    /// Options currently applied to the provider.
    pub fn update_options(&self) -> &UpdateOptions {
        &self.options
    }

    pub fn update_interval(&self) -> Duration {
        self.options.update_interval()
    }

    /// Fix shape selected from the module's capabilities.
    pub fn fix_shape(&self) -> FixShape {
        self.shape
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Name of the interval strategy in use.
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }
}
