//! Integration tests driving pollers against the simulated provider.
//!
//! Uses tokio's paused clock, so simulated minutes pass instantly.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use trackpoll::config::TrackerConfig;
use trackpoll::poller::{AdaptiveConfig, PollerError, PollerState, PositionEvent};
use trackpoll::provider::{Capabilities, SimulatedProvider, SpeedProfile, UpdateOptions};
use trackpoll::{ChannelListener, Coordinate, PositionFix, PositionPoller};

fn origin() -> Coordinate {
    Coordinate::new(47.3769, 8.5417)
}

fn spawn(
    mut poller: PositionPoller,
    cancel: CancellationToken,
) -> JoinHandle<(PositionPoller, Result<(), PollerError>)> {
    tokio::spawn(async move {
        let result = poller.run(cancel).await;
        (poller, result)
    })
}

/// Receive events until `count` fixes have arrived.
async fn collect_fixes(
    rx: &mut UnboundedReceiver<PositionEvent>,
    count: usize,
) -> (Vec<PositionEvent>, Vec<PositionFix>) {
    let mut events = Vec::new();
    let mut fixes = Vec::new();
    while fixes.len() < count {
        let event = rx.recv().await.expect("poller hung up");
        if let PositionEvent::Updated { fix } = &event {
            fixes.push(*fix);
        }
        events.push(event);
    }
    (events, fixes)
}

fn gaps(fixes: &[PositionFix]) -> Vec<TimeDelta> {
    fixes
        .windows(2)
        .map(|pair| pair[1].timestamp - pair[0].timestamp)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_adaptive_poller_spaces_fixes_by_distance() {
    let provider = SimulatedProvider::new(origin(), 45.0, SpeedProfile::constant(5.0));
    let (listener, mut rx) = ChannelListener::channel();
    let poller = PositionPoller::adaptive(
        Box::new(provider),
        Arc::new(listener),
        AdaptiveConfig::default(),
    )
    .unwrap();

    let cancel = CancellationToken::new();
    let handle = spawn(poller, cancel.clone());

    let (events, fixes) = collect_fixes(&mut rx, 4).await;
    cancel.cancel();
    let (poller, result) = handle.await.unwrap();

    assert_eq!(result, Ok(()));
    assert_eq!(events[0], PositionEvent::Lost);
    assert_eq!(events[1], PositionEvent::Restored);

    // Starts at the minimum, then 30 m / 5 m/s
    assert_eq!(
        gaps(&fixes),
        vec![
            TimeDelta::seconds(1),
            TimeDelta::seconds(6),
            TimeDelta::seconds(6)
        ]
    );
    assert_eq!(poller.update_interval(), Duration::from_secs(6));
    assert_eq!(poller.state(), PollerState::Stopped);

    // Stopping is silent
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_adaptive_poller_slows_down_when_stationary() {
    let profile: SpeedProfile = "0@600".parse().unwrap();
    let provider = SimulatedProvider::new(origin(), 0.0, profile);
    let (listener, mut rx) = ChannelListener::channel();
    let poller = PositionPoller::adaptive(
        Box::new(provider),
        Arc::new(listener),
        AdaptiveConfig::default(),
    )
    .unwrap();

    let cancel = CancellationToken::new();
    let handle = spawn(poller, cancel.clone());
    let (_, fixes) = collect_fixes(&mut rx, 3).await;
    cancel.cancel();
    let (poller, _) = handle.await.unwrap();

    assert_eq!(
        gaps(&fixes),
        vec![TimeDelta::seconds(1), TimeDelta::seconds(10)]
    );
    assert_eq!(poller.update_options().update_timeout(), Duration::from_secs(11));
}

#[tokio::test(start_paused = true)]
async fn test_dropout_loses_and_restores_fix() {
    let provider = SimulatedProvider::new(origin(), 90.0, SpeedProfile::constant(3.0))
        .with_dropout_every(3);
    let (listener, mut rx) = ChannelListener::channel();
    let options = UpdateOptions::new(Duration::from_secs(1), Duration::from_secs(2)).unwrap();
    let poller = PositionPoller::fixed(Box::new(provider), Arc::new(listener), options).unwrap();

    let cancel = CancellationToken::new();
    let handle = spawn(poller, cancel.clone());
    let (events, fixes) = collect_fixes(&mut rx, 3).await;
    cancel.cancel();
    handle.await.unwrap().1.unwrap();

    assert_eq!(
        events,
        vec![
            PositionEvent::Lost,
            PositionEvent::Restored,
            PositionEvent::Updated { fix: fixes[0] },
            PositionEvent::Updated { fix: fixes[1] },
            PositionEvent::Lost,
            PositionEvent::Restored,
            PositionEvent::Updated { fix: fixes[2] },
        ]
    );
    // Third request timed out after 2 s
    assert_eq!(
        gaps(&fixes),
        vec![TimeDelta::seconds(1), TimeDelta::seconds(3)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_poller_built_from_config_file() {
    let config = TrackerConfig::from_ini_str(
        "[polling]\nmode = fixed\nupdate_interval = 4\nupdate_timeout = 6\n",
    )
    .unwrap();

    let provider = SimulatedProvider::new(origin(), 180.0, SpeedProfile::constant(20.0));
    let (listener, mut rx) = ChannelListener::channel();
    let poller = config
        .build_poller(Box::new(provider), Arc::new(listener))
        .unwrap();
    assert_eq!(poller.strategy_name(), "fixed");

    let cancel = CancellationToken::new();
    let handle = spawn(poller, cancel.clone());
    let (_, fixes) = collect_fixes(&mut rx, 3).await;
    cancel.cancel();
    let (poller, _) = handle.await.unwrap();

    // Fast movement does not change a fixed interval
    assert_eq!(
        gaps(&fixes),
        vec![TimeDelta::seconds(4), TimeDelta::seconds(4)]
    );
    assert_eq!(poller.last_fix(), fixes.last());
    assert_eq!(poller.previous_fix(), fixes.get(1));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_before_first_fix() {
    let provider = SimulatedProvider::new(origin(), 0.0, SpeedProfile::constant(1.0));
    let (listener, mut rx) = ChannelListener::channel();
    let options = UpdateOptions::new(Duration::from_secs(30), Duration::from_secs(40)).unwrap();
    let poller = PositionPoller::fixed(Box::new(provider), Arc::new(listener), options).unwrap();

    let cancel = CancellationToken::new();
    let handle = spawn(poller, cancel.clone());

    assert_eq!(rx.recv().await, Some(PositionEvent::Lost));
    tokio::time::sleep(Duration::from_secs(5)).await;
    cancel.cancel();

    let (poller, result) = handle.await.unwrap();
    assert_eq!(result, Ok(()));
    assert!(!poller.is_running());
    assert_eq!(poller.last_fix(), None);
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_unsupported_module_rejected() {
    let provider = SimulatedProvider::new(origin(), 0.0, SpeedProfile::constant(1.0))
        .with_capabilities(Capabilities::none());
    let (listener, _rx) = ChannelListener::channel();

    let err = PositionPoller::adaptive(
        Box::new(provider),
        Arc::new(listener),
        AdaptiveConfig::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        PollerError::UnsupportedCapability { ref module, .. } if module == "simulated"
    ));
}
