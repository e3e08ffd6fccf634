//! Provider error types.

use serde::Serialize;
use thiserror::Error;

/// Errors reported by a position provider.
///
/// At runtime every variant is fatal to the poller: it stops and reports the
/// error once. Restarting is the caller's decision.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderError {
    /// The application is not permitted to read the location.
    #[error("Access to positioning denied")]
    AccessDenied,

    /// The positioning module is missing, switched off or disconnected.
    #[error("Positioning module unavailable: {reason}")]
    Unavailable { reason: String },

    /// The provider refused the update options.
    #[error("Update options rejected: {reason}")]
    OptionsRejected { reason: String },

    /// Any other provider-specific failure.
    #[error("Provider error code {code}")]
    Other { code: i32 },
}
