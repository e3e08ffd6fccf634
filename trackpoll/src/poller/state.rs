//! Poller state and edge detection.

use std::fmt;

use serde::Serialize;

/// Coarse state of a position poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollerState {
    /// Not polling; no request outstanding.
    #[default]
    Stopped,
    /// A request is outstanding and no complete fix has arrived since
    /// entering this state.
    AwaitingFix,
    /// The most recent completion was a complete fix.
    FixAcquired,
}

impl PollerState {
    pub fn is_running(&self) -> bool {
        !matches!(self, PollerState::Stopped)
    }
}

impl fmt::Display for PollerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollerState::Stopped => write!(f, "stopped"),
            PollerState::AwaitingFix => write!(f, "awaiting fix"),
            PollerState::FixAcquired => write!(f, "fix acquired"),
        }
    }
}

/// Listener notification produced by a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Edge {
    Restored,
    Lost,
}

/// The edge event for moving `from` → `to`, if any.
///
/// ```text
/// any other   ──► FixAcquired : Restored
/// FixAcquired ──► any other   : Lost
/// Stopped     ──► AwaitingFix : Lost
/// ```
pub(crate) fn edge(from: PollerState, to: PollerState) -> Option<Edge> {
    if from == to {
        return None;
    }
    match (from, to) {
        (_, PollerState::FixAcquired) => Some(Edge::Restored),
        (PollerState::FixAcquired, _) => Some(Edge::Lost),
        (PollerState::Stopped, PollerState::AwaitingFix) => Some(Edge::Lost),
        _ => None,
    }
}
