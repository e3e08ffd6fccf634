//! Interval selection strategies.
//!
//! The poller asks its strategy for new update options after every complete
//! fix, before issuing the next request. Returning `Some` makes the poller
//! reconfigure the provider.

use crate::fix::PositionFix;
use crate::provider::UpdateOptions;

/// Decides the update options for the next request.
pub trait IntervalStrategy: Send {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Options to apply when the poller is constructed.
    fn initial_options(&self) -> UpdateOptions;

    /// Options for the next request after `fix`, or `None` to keep `current`.
    ///
    /// Must not block.
    fn next_options(&mut self, fix: &PositionFix, current: &UpdateOptions)
        -> Option<UpdateOptions>;
}

/// Constant update interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedInterval {
    options: UpdateOptions,
}

impl FixedInterval {
    pub fn new(options: UpdateOptions) -> Self {
        Self { options }
    }
}

impl IntervalStrategy for FixedInterval {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn initial_options(&self) -> UpdateOptions {
        self.options
    }

    fn next_options(
        &mut self,
        _fix: &PositionFix,
        _current: &UpdateOptions,
    ) -> Option<UpdateOptions> {
        None
    }
}
