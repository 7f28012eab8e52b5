use log::{debug, error, info};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::connectivity_traits::{ReachabilityProbe, ReconnectHandler};
use crate::sync::FlushReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// No observation yet.
    Unknown,
    Online,
    Offline,
}

struct ReconnectGuard<'a>(&'a AtomicBool);

impl Drop for ReconnectGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct ConnectivityMonitor {
    probe: Arc<dyn ReachabilityProbe>,
    handler: Arc<dyn ReconnectHandler>,
    state: watch::Sender<Connectivity>,
    forced: Mutex<Option<bool>>,
    reconnecting: AtomicBool,
}

impl ConnectivityMonitor {
    pub fn new(probe: Arc<dyn ReachabilityProbe>, handler: Arc<dyn ReconnectHandler>) -> Self {
        let (state, _) = watch::channel(Connectivity::Unknown);
        Self {
            probe,
            handler,
            state,
            forced: Mutex::new(None),
            reconnecting: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> Connectivity {
        *self.state.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.state() == Connectivity::Online
    }

    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.state.subscribe()
    }

    /// Forces the reachability answer until released. Applied on the next check.
    pub fn set_override(&self, online: bool) {
        *self.forced.lock().unwrap_or_else(|e| e.into_inner()) = Some(online);
    }

    pub fn release_override(&self) {
        *self.forced.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    async fn reachable(&self) -> bool {
        let forced = *self.forced.lock().unwrap_or_else(|e| e.into_inner());
        match forced {
            Some(online) => online,
            None => self.probe.is_reachable().await,
        }
    }

    /// Observes reachability once and publishes it.
    ///
    /// Returns the flush report when this observation was a transition to
    /// online and the reconnect handler ran.
    pub async fn check_now(&self) -> Option<FlushReport> {
        let next = if self.reachable().await {
            Connectivity::Online
        } else {
            Connectivity::Offline
        };
        let previous = self.state.send_replace(next);
        if previous != next {
            info!("Connectivity changed: {:?} -> {:?}", previous, next);
        }
        if next != Connectivity::Online || previous == Connectivity::Online {
            return None;
        }

        if self
            .reconnecting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Reconnect handler already running, skipping");
            return None;
        }
        let _guard = ReconnectGuard(&self.reconnecting);

        match self.handler.on_reconnect().await {
            Ok(report) => Some(report),
            Err(e) => {
                error!("Sync after reconnect failed: {}", e);
                None
            }
        }
    }

    /// Checks reachability on a fixed interval. The first check is immediate.
    pub fn spawn(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Connectivity monitor started ({}s interval)", period.as_secs());
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.check_now().await;
            }
        })
    }
}
