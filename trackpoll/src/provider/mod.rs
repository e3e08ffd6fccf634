//! Position provider abstraction.
//!
//! A provider is an asynchronous source of location fixes. It serves exactly
//! one outstanding request at a time: the poller asks for the next fix with
//! [`PositionProvider::request_fix`], awaits the returned future, and only then
//! issues the next request.
//!
//! # Lifecycle
//!
//! ```text
//! module_info() ──► configure(options) ──► request_fix() ──► Completion
//!                          ▲                     ▲               │
//!                          └──── (interval changed) ◄────────────┤
//!                                                └── reissue ◄───┘
//! ```
//!
//! Dropping the future returned by `request_fix` abandons the request; the
//! poller always follows that with [`PositionProvider::cancel`] so the
//! provider can release the underlying notification.

mod error;
mod options;
mod scripted;
mod simulated;

pub use error::ProviderError;
pub use options::{OptionsError, UpdateOptions, DEFAULT_UPDATE_INTERVAL, DEFAULT_UPDATE_TIMEOUT};
pub use scripted::{ScriptedLog, ScriptedProvider};
pub use simulated::{ProfileParseError, SimulatedProvider, SpeedProfile, SpeedSegment};

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};

use crate::fix::{FixShape, PositionFix};

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Fix-data families a positioning module can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub basic: bool,
    pub course: bool,
    pub satellite: bool,
}

impl Capabilities {
    /// A module that supports nothing usable.
    pub fn none() -> Self {
        Self::default()
    }

    /// A module supporting every fix shape.
    pub fn all() -> Self {
        Self {
            basic: true,
            course: true,
            satellite: true,
        }
    }

    /// The richest fix shape supported, if any.
    ///
    /// Preference order: satellite, course, basic.
    pub fn best_shape(&self) -> Option<FixShape> {
        if self.satellite {
            Some(FixShape::Satellite)
        } else if self.course {
            Some(FixShape::Course)
        } else if self.basic {
            Some(FixShape::Basic)
        } else {
            None
        }
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.basic {
            names.push("basic");
        }
        if self.course {
            names.push("course");
        }
        if self.satellite {
            names.push("satellite");
        }
        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join("+"))
        }
    }
}

/// Description of the positioning module behind a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub name: String,
    pub capabilities: Capabilities,
}

/// Outcome of one fix request.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// A complete, valid fix.
    Success(PositionFix),

    /// Only the timestamp is valid; no spatial data.
    PartialUpdate { timestamp: DateTime<Utc> },

    /// No fix within the configured update timeout.
    Timeout,

    /// The request was cancelled.
    Cancelled,

    /// Unrecoverable provider failure.
    Failed(ProviderError),
}

impl Completion {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Completion::Success(_) => "success",
            Completion::PartialUpdate { .. } => "partial",
            Completion::Timeout => "timeout",
            Completion::Cancelled => "cancelled",
            Completion::Failed(_) => "failed",
        }
    }
}

/// An asynchronous source of location fixes.
///
/// Implementations must tolerate `cancel()` being called when no request is
/// outstanding.
pub trait PositionProvider: Send {
    /// Identify the module and the fix shapes it supports.
    fn module_info(&self) -> ModuleInfo;

    /// Apply new update options. Takes effect for the next request.
    fn configure(&mut self, options: &UpdateOptions) -> Result<(), ProviderError>;

    /// Request the next fix in the given shape.
    fn request_fix(&mut self, shape: FixShape) -> BoxFuture<'_, Completion>;

    /// Abort the outstanding request, if any.
    fn cancel(&mut self);
}
