mod config;
mod main_lib;

use config::Config;
use main_lib::{build_state, init_tracing};
use mesfactures_core::connectivity::Connectivity;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();
    let state = build_state(&config).await?;
    if !state.durable {
        tracing::warn!("Changes made in this session will not survive a restart");
    }
    if config.api_token.is_none() && !state.session.is_authenticated().await? {
        tracing::warn!("No session token stored; replayed requests will be unauthenticated");
    }

    let mut transitions = state.monitor.subscribe();
    tokio::spawn(async move {
        while transitions.changed().await.is_ok() {
            match *transitions.borrow_and_update() {
                Connectivity::Online => tracing::info!("Backend reachable"),
                Connectivity::Offline => tracing::warn!("Backend unreachable, queuing mutations"),
                Connectivity::Unknown => {}
            }
        }
    });

    let monitor_task = state.monitor.clone().spawn(config.probe_interval);
    tracing::info!(
        "Watching {} every {:?}",
        config.api_url,
        config.probe_interval
    );

    tokio::signal::ctrl_c().await?;
    monitor_task.abort();
    tracing::info!("Shutting down");
    Ok(())
}
