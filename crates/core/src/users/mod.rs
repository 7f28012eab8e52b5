//! Users module - domain models.

mod users_model;

pub use users_model::{User, UserStatus};
