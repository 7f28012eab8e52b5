use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One audit entry recorded after a successful local write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionHistoryEntry {
    pub id: Option<i64>,
    pub user_id: i64,
    pub action_type: String,
    pub description: String,
    /// When the action happened. Defaults to the store's creation stamp.
    pub date: NaiveDateTime,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl ActionHistoryEntry {
    pub fn new(
        user_id: i64,
        action_type: impl Into<String>,
        description: impl Into<String>,
        date: NaiveDateTime,
    ) -> Self {
        Self {
            id: None,
            user_id,
            action_type: action_type.into(),
            description: description.into(),
            date,
            created_at: None,
            updated_at: None,
        }
    }
}
