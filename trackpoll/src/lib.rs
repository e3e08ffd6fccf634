//! Trackpoll - speed-adaptive position polling
//!
//! Drives an asynchronous positioning source one request at a time, reports
//! fixes and fix availability to a listener, and optionally adapts the update
//! interval so that recorded points stay roughly equidistant.
//!
//! - [`provider`]: the positioning source seam and bundled providers
//! - [`poller`]: the polling state machine and interval strategies
//! - [`speed`]: the trailing maximum-speed window
//! - [`fix`]: position fixes and geodesy helpers

pub mod config;
pub mod fix;
pub mod logging;
pub mod poller;
pub mod provider;
pub mod speed;

pub use fix::{Coordinate, PositionFix};
pub use poller::{
    AdaptiveConfig, ChannelListener, PollerError, PollerState, PositionEvent, PositionListener,
    PositionPoller,
};
pub use provider::{Completion, PositionProvider, ProviderError, UpdateOptions};
pub use speed::SpeedWindowCache;
