//! Action history module - append-only audit entries.

mod history_model;

pub use history_model::ActionHistoryEntry;
