use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mesfactures_connect::{ApiClient, HttpReachabilityProbe, HttpTransmitter};
use mesfactures_core::auth::AuthSession;
use mesfactures_core::connectivity::ConnectivityMonitor;
use mesfactures_core::offline::{OfflineConfig, OfflineDataService, OfflineDataServiceTrait};
use mesfactures_core::store::{
    KeyValueStoreTrait, LocalStoreTrait, MemoryKeyValueStore, MemoryLocalStore,
};
use mesfactures_core::sync::SyncQueue;
use mesfactures_storage_sqlite::SqliteLocalStore;

use crate::config::Config;

pub struct AppState {
    pub service: Arc<OfflineDataService>,
    pub monitor: Arc<ConnectivityMonitor>,
    pub session: Arc<AuthSession>,
    /// False when the database could not be opened and data lives in memory.
    pub durable: bool,
}

pub fn init_tracing() {
    let log_format = std::env::var("MF_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Opens the SQLite store, or falls back to process memory when it cannot be
/// opened.
async fn open_stores(
    db_path: &str,
) -> (Arc<dyn LocalStoreTrait>, Arc<dyn KeyValueStoreTrait>, bool) {
    let sqlite = Arc::new(SqliteLocalStore::new(db_path));
    match sqlite.initialize().await {
        Ok(()) => {
            tracing::info!("Database path in use: {}", db_path);
            let store: Arc<dyn LocalStoreTrait> = sqlite.clone();
            let kv: Arc<dyn KeyValueStoreTrait> = sqlite;
            (store, kv, true)
        }
        Err(e) => {
            tracing::warn!(
                "Local database unavailable ({}); continuing with a non-durable in-memory store",
                e
            );
            let store: Arc<dyn LocalStoreTrait> = Arc::new(MemoryLocalStore::new());
            let kv: Arc<dyn KeyValueStoreTrait> = Arc::new(MemoryKeyValueStore::new());
            (store, kv, false)
        }
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let (store, kv, durable) = open_stores(&config.db_path).await;

    let session = Arc::new(AuthSession::new(kv.clone()));
    let api = ApiClient::new(&config.api_url)?;
    let transmitter = Arc::new(
        HttpTransmitter::new(api)
            .with_session(session.clone())
            .with_token(config.api_token.clone()),
    );

    let queue = Arc::new(SyncQueue::new(kv));
    let offline_config = OfflineConfig {
        transmit_timeout: config.transmit_timeout,
        ..OfflineConfig::default()
    };
    let service = Arc::new(OfflineDataService::new(
        store,
        queue,
        transmitter,
        offline_config,
    ));
    service.initialize().await?;
    tracing::info!(
        "Offline layer ready, {} mutation(s) pending",
        service.get_sync_queue_size().await?
    );

    let probe = Arc::new(HttpReachabilityProbe::new(&config.api_url)?);
    let monitor = Arc::new(ConnectivityMonitor::new(probe, service.clone()));

    Ok(Arc::new(AppState {
        service,
        monitor,
        session,
        durable,
    }))
}
