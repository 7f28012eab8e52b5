use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use super::*;
use crate::errors::Result;
use crate::sync::FlushReport;

struct MockProbe {
    reachable: AtomicBool,
}

impl MockProbe {
    fn new(reachable: bool) -> Arc<Self> {
        Arc::new(Self {
            reachable: AtomicBool::new(reachable),
        })
    }

    fn set(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }
}

#[async_trait]
impl ReachabilityProbe for MockProbe {
    async fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct CountingHandler {
    calls: AtomicUsize,
    gate: Option<(Notify, Notify)>,
}

impl CountingHandler {
    fn gated() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            gate: Some((Notify::new(), Notify::new())),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReconnectHandler for CountingHandler {
    async fn on_reconnect(&self) -> Result<FlushReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some((started, release)) = &self.gate {
            started.notify_one();
            release.notified().await;
        }
        Ok(FlushReport::default())
    }
}

#[tokio::test]
async fn first_reachable_observation_triggers_reconnect() {
    let handler = Arc::new(CountingHandler::default());
    let monitor = ConnectivityMonitor::new(MockProbe::new(true), handler.clone());
    assert_eq!(monitor.state(), Connectivity::Unknown);
    assert!(!monitor.is_online());

    assert!(monitor.check_now().await.is_some());
    assert!(monitor.is_online());
    assert_eq!(handler.calls(), 1);

    // Staying online is not a transition.
    assert!(monitor.check_now().await.is_none());
    assert_eq!(handler.calls(), 1);
}

#[tokio::test]
async fn offline_to_online_runs_handler_again() {
    let probe = MockProbe::new(false);
    let handler = Arc::new(CountingHandler::default());
    let monitor = ConnectivityMonitor::new(probe.clone(), handler.clone());

    assert!(monitor.check_now().await.is_none());
    assert_eq!(monitor.state(), Connectivity::Offline);
    assert_eq!(handler.calls(), 0);

    probe.set(true);
    monitor.check_now().await;
    probe.set(false);
    monitor.check_now().await;
    probe.set(true);
    monitor.check_now().await;
    assert_eq!(handler.calls(), 2);
}

#[tokio::test]
async fn override_takes_precedence_over_probe() {
    let handler = Arc::new(CountingHandler::default());
    let monitor = ConnectivityMonitor::new(MockProbe::new(true), handler.clone());

    monitor.set_override(false);
    monitor.check_now().await;
    assert_eq!(monitor.state(), Connectivity::Offline);
    assert_eq!(handler.calls(), 0);

    monitor.release_override();
    monitor.check_now().await;
    assert!(monitor.is_online());
    assert_eq!(handler.calls(), 1);
}

#[tokio::test]
async fn transition_during_running_reconnect_does_not_start_another() {
    let handler = CountingHandler::gated();
    let monitor = Arc::new(ConnectivityMonitor::new(MockProbe::new(true), handler.clone()));

    let first = {
        let monitor = monitor.clone();
        tokio::spawn(async move { monitor.check_now().await })
    };
    let (started, release) = handler.gate.as_ref().unwrap();
    started.notified().await;

    monitor.set_override(false);
    assert!(monitor.check_now().await.is_none());
    monitor.set_override(true);
    assert!(monitor.check_now().await.is_none());
    assert_eq!(handler.calls(), 1);

    release.notify_one();
    assert!(first.await.unwrap().is_some());
    assert_eq!(handler.calls(), 1);
}

#[tokio::test]
async fn subscribers_observe_state_changes() {
    let probe = MockProbe::new(false);
    let monitor = ConnectivityMonitor::new(probe.clone(), Arc::new(CountingHandler::default()));
    let mut rx = monitor.subscribe();

    monitor.check_now().await;
    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), Connectivity::Offline);

    probe.set(true);
    monitor.check_now().await;
    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), Connectivity::Online);
}

#[tokio::test(start_paused = true)]
async fn spawned_monitor_checks_periodically() {
    let probe = MockProbe::new(true);
    let handler = Arc::new(CountingHandler::default());
    let monitor = Arc::new(ConnectivityMonitor::new(probe.clone(), handler.clone()));

    let task = monitor.clone().spawn(Duration::from_secs(10));
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(monitor.is_online());
    assert_eq!(handler.calls(), 1);

    probe.set(false);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(monitor.state(), Connectivity::Offline);

    probe.set(true);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(handler.calls(), 2);

    task.abort();
}
