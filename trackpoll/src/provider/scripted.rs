//! Deterministic provider that replays a fixed script of completions.
//!
//! Used for testing pollers and for replaying recorded sessions. Every call
//! the poller makes is recorded in a shared [`ScriptedLog`] that stays
//! readable after the provider has been moved into a poller.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{
    BoxFuture, Capabilities, Completion, ModuleInfo, PositionProvider, ProviderError,
    UpdateOptions,
};
use crate::fix::FixShape;

#[derive(Debug, Default)]
struct LogInner {
    configured: Vec<UpdateOptions>,
    requests: Vec<FixShape>,
    cancels: usize,
    configure_error: Option<ProviderError>,
}

/// Shared record of the calls made against a [`ScriptedProvider`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedLog {
    inner: Arc<Mutex<LogInner>>,
}

impl ScriptedLog {
    /// Every set of options applied, oldest first.
    pub fn configured(&self) -> Vec<UpdateOptions> {
        self.inner.lock().configured.clone()
    }

    /// The most recently applied options.
    pub fn last_configured(&self) -> Option<UpdateOptions> {
        self.inner.lock().configured.last().copied()
    }

    /// Number of fix requests issued.
    pub fn request_count(&self) -> usize {
        self.inner.lock().requests.len()
    }

    /// Shapes of all fix requests issued.
    pub fn requested_shapes(&self) -> Vec<FixShape> {
        self.inner.lock().requests.clone()
    }

    /// Number of `cancel()` calls.
    pub fn cancel_count(&self) -> usize {
        self.inner.lock().cancels
    }

    /// Make subsequent `configure()` calls fail (or succeed again with `None`).
    pub fn set_configure_error(&self, error: Option<ProviderError>) {
        self.inner.lock().configure_error = error;
    }
}

/// Provider replaying a queue of completions in order.
///
/// Once the script is exhausted, further requests never complete.
#[derive(Debug)]
pub struct ScriptedProvider {
    name: String,
    capabilities: Capabilities,
    script: VecDeque<Completion>,
    log: ScriptedLog,
}

impl ScriptedProvider {
    /// Create a provider supporting all fix shapes.
    pub fn new(script: impl IntoIterator<Item = Completion>) -> Self {
        Self {
            name: "scripted".to_string(),
            capabilities: Capabilities::all(),
            script: script.into_iter().collect(),
            log: ScriptedLog::default(),
        }
    }

    /// Override the advertised capabilities.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Handle to the call log.
    pub fn log(&self) -> ScriptedLog {
        self.log.clone()
    }

    /// Completions not yet delivered.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl PositionProvider for ScriptedProvider {
    fn module_info(&self) -> ModuleInfo {
        ModuleInfo {
            name: self.name.clone(),
            capabilities: self.capabilities,
        }
    }

    fn configure(&mut self, options: &UpdateOptions) -> Result<(), ProviderError> {
        let mut log = self.log.inner.lock();
        if let Some(err) = log.configure_error.clone() {
            return Err(err);
        }
        log.configured.push(*options);
        Ok(())
    }

    fn request_fix(&mut self, shape: FixShape) -> BoxFuture<'_, Completion> {
        self.log.inner.lock().requests.push(shape);

        let next = self.script.pop_front();
        Box::pin(async move {
            match next {
                Some(completion) => completion,
                None => std::future::pending().await,
            }
        })
    }

    fn cancel(&mut self) {
        self.log.inner.lock().cancels += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_replays_script_in_order() {
        let mut provider = ScriptedProvider::new([Completion::Timeout, Completion::Cancelled]);
        let log = provider.log();

        assert_eq!(provider.request_fix(FixShape::Basic).await, Completion::Timeout);
        assert_eq!(provider.request_fix(FixShape::Course).await, Completion::Cancelled);
        assert_eq!(provider.remaining(), 0);
        assert_eq!(
            log.requested_shapes(),
            vec![FixShape::Basic, FixShape::Course]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_script_never_completes() {
        let mut provider = ScriptedProvider::new([]);
        let result =
            tokio::time::timeout(Duration::from_secs(60), provider.request_fix(FixShape::Basic))
                .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_configure_records_and_fails_on_demand() {
        let mut provider = ScriptedProvider::new([]);
        let log = provider.log();

        provider.configure(&UpdateOptions::default()).unwrap();
        assert_eq!(log.configured().len(), 1);

        log.set_configure_error(Some(ProviderError::AccessDenied));
        assert_eq!(
            provider.configure(&UpdateOptions::default()),
            Err(ProviderError::AccessDenied)
        );
        assert_eq!(log.configured().len(), 1);
    }

    #[test]
    fn test_cancel_counted() {
        let mut provider = ScriptedProvider::new([]);
        provider.cancel();
        provider.cancel();
        assert_eq!(provider.log().cancel_count(), 2);
    }
}
