//! Key-value table holding the sync queue and session entries.

mod model;
mod repository;
