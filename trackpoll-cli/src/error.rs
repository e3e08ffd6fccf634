//! CLI error handling with user-friendly messages.
//!
//! Centralizes error formatting and exit codes for all commands.

use std::fmt;
use std::process;

use trackpoll::config::ConfigFileError;
use trackpoll::poller::PollerError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Invalid arguments or settings
    Config(String),
    /// Config file could not be read, parsed or written
    ConfigFile(ConfigFileError),
    /// Poller could not be created or stopped on a provider error
    Poller(PollerError),
    /// Async runtime could not be started
    Runtime(std::io::Error),
    /// Event could not be written as JSON
    Output(serde_json::Error),
    /// Event output could not be written
    Write(std::io::Error),
}

impl CliError {
    /// Exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::ConfigFile(_) => 2,
            CliError::Poller(PollerError::UnsupportedCapability { .. }) => 3,
            _ => 1,
        }
    }

    /// Print the error and exit the process.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::ConfigFile(ConfigFileError::InvalidValue { .. }) = self {
            eprintln!();
            eprintln!("Run 'trackpoll config show' to see the effective configuration.");
        }

        process::exit(self.exit_code())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Poller(e) => write!(f, "Polling failed: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Output(e) => write!(f, "Failed to encode event: {}", e),
            CliError::Write(e) => write!(f, "Failed to write event: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Poller(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Output(e) => Some(e),
            CliError::Write(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<PollerError> for CliError {
    fn from(e: PollerError) -> Self {
        CliError::Poller(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackpoll::provider::{Capabilities, ProviderError};

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Config("bad".to_string()).exit_code(), 2);
        assert_eq!(
            CliError::Poller(PollerError::UnsupportedCapability {
                module: "null".to_string(),
                capabilities: Capabilities::none(),
            })
            .exit_code(),
            3
        );
        assert_eq!(
            CliError::Poller(PollerError::Provider(ProviderError::AccessDenied)).exit_code(),
            1
        );
    }

    #[test]
    fn test_display() {
        let err = CliError::Config("interval must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: interval must be positive"
        );
    }
}
