//! Connectivity monitor: watches reachability and replays the sync queue
//! when the backend comes back.

mod connectivity_monitor;
mod connectivity_traits;

pub use connectivity_monitor::{Connectivity, ConnectivityMonitor};
pub use connectivity_traits::{ReachabilityProbe, ReconnectHandler};

#[cfg(test)]
mod connectivity_monitor_tests;
