//! Poller error types.

use thiserror::Error;

use super::adaptive::AdaptiveConfigError;
use crate::provider::{Capabilities, OptionsError, ProviderError};

/// Errors constructing or running a position poller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PollerError {
    /// The positioning module supports none of the fix shapes the poller can
    /// consume. Positioning is unavailable; this is not retried.
    #[error("Positioning module '{module}' supports no usable fix data (capabilities: {capabilities})")]
    UnsupportedCapability {
        module: String,
        capabilities: Capabilities,
    },

    /// The provider failed during setup or stopped the poller at runtime.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Update options were inconsistent.
    #[error("Invalid update options: {0}")]
    InvalidOptions(#[from] OptionsError),

    /// Adaptive controller settings were inconsistent.
    #[error("Invalid adaptive settings: {0}")]
    InvalidAdaptiveConfig(#[from] AdaptiveConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_capability_display() {
        let err = PollerError::UnsupportedCapability {
            module: "null".to_string(),
            capabilities: Capabilities::none(),
        };
        let text = err.to_string();
        assert!(text.contains("'null'"));
        assert!(text.contains("capabilities: none"));
    }

    #[test]
    fn test_from_provider_error() {
        let err: PollerError = ProviderError::AccessDenied.into();
        assert!(matches!(err, PollerError::Provider(ProviderError::AccessDenied)));
    }
}
