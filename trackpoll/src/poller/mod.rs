//! Position polling.
//!
//! [`PositionPoller`] drives a [`PositionProvider`](crate::provider::PositionProvider)
//! one request at a time and tells a [`PositionListener`] about fixes and
//! about the fix becoming available or unavailable. How long to wait between
//! fixes is decided by an [`IntervalStrategy`]:
//!
//! - [`FixedInterval`] keeps the configured interval
//! - [`AdaptiveInterval`] spaces fixes by distance using recent maximum speed

mod adaptive;
mod error;
mod interval;
mod listener;
mod position_poller;
mod state;

pub use adaptive::{
    AdaptiveConfig, AdaptiveConfigError, AdaptiveInterval, DEFAULT_MAX_INTERVAL,
    DEFAULT_MIN_INTERVAL, DEFAULT_TARGET_DISTANCE_M, DEFAULT_TIMEOUT_MARGIN,
};
pub use error::PollerError;
pub use interval::{FixedInterval, IntervalStrategy};
pub use listener::{ChannelListener, PositionEvent, PositionListener};
pub use position_poller::PositionPoller;
pub use state::PollerState;
