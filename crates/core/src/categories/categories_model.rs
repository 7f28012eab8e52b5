//! Category domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, ValidationError};

/// Whether a category classifies expenses or revenues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Expense,
    Revenue,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Expense => "expense",
            CategoryKind::Revenue => "revenue",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(CategoryKind::Expense),
            "revenue" => Ok(CategoryKind::Revenue),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown category kind '{}'",
                other
            ))
            .into()),
        }
    }
}

/// Domain model representing a transaction category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    pub kind: CategoryKind,
    pub color: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Category {
    pub fn new(name: impl Into<String>, kind: CategoryKind, color: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind,
            color: color.into(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Exact match on the normalized name, scoped to `kind`.
    pub fn matches(&self, name: &str, kind: CategoryKind) -> bool {
        self.kind == kind && normalize_category_name(&self.name) == normalize_category_name(name)
    }

    pub fn is_expense(&self) -> bool {
        self.kind == CategoryKind::Expense
    }
}

/// Trimmed, lower-cased form used for category lookups.
pub fn normalize_category_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Categories seeded into an empty store.
pub fn default_categories() -> Vec<Category> {
    use CategoryKind::{Expense, Revenue};
    [
        ("Alimentation", Expense, "#ef4444"),
        ("Transport", Expense, "#3b82f6"),
        ("Loisirs", Expense, "#10b981"),
        ("Logement", Expense, "#f59e0b"),
        ("Santé", Expense, "#8b5cf6"),
        ("Salaire", Revenue, "#22c55e"),
        ("Freelance", Revenue, "#06b6d4"),
        ("Autres revenus", Revenue, "#84cc16"),
    ]
    .into_iter()
    .map(|(name, kind, color)| Category::new(name, kind, color))
    .collect()
}
