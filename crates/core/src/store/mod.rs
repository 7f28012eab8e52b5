//! Local store abstraction: collections, records, and the storage traits.

mod memory_store;
mod record;
mod store_traits;

pub use memory_store::{MemoryKeyValueStore, MemoryLocalStore};
pub use record::{Collection, IndexFilter, IndexValue, Record, StoredRecord};
pub use store_traits::{KeyValueStoreTrait, LocalStoreExt, LocalStoreTrait};

#[cfg(test)]
mod memory_store_tests;
