//! Offline data service: the façade the UI layer calls.

mod offline_model;
mod offline_service;
mod offline_traits;

pub use offline_model::{CategoryResolution, MonthlyStats, OfflineConfig, UserDataExport, UserStats};
pub use offline_service::OfflineDataService;
pub use offline_traits::OfflineDataServiceTrait;
