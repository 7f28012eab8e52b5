pub(crate) mod model;
mod repository;

pub use repository::SqliteLocalStore;

#[cfg(test)]
mod repository_tests;
