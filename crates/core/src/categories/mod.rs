//! Categories module - domain models and the default seed set.

mod categories_model;

pub use categories_model::{default_categories, normalize_category_name, Category, CategoryKind};
