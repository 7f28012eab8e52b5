//! Notification domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    #[default]
    Unread,
    Read,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Unread => "unread",
            NotificationStatus::Read => "read",
        }
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unread" => Ok(NotificationStatus::Unread),
            "read" => Ok(NotificationStatus::Read),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown notification status '{}'",
                other
            ))
            .into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Option<i64>,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub status: NotificationStatus,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Notification {
    pub fn new(user_id: i64, notification_type: &str, message: impl Into<String>) -> Self {
        Self {
            id: None,
            user_id,
            notification_type: notification_type.to_string(),
            title: notification_title(notification_type),
            message: message.into(),
            status: NotificationStatus::Unread,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_unread(&self) -> bool {
        self.status == NotificationStatus::Unread
    }
}

/// Display title derived from a type tag: `goal_completed` -> `GOAL COMPLETED`.
pub fn notification_title(notification_type: &str) -> String {
    notification_type.replace('_', " ").to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_replaces_underscores_and_uppercases() {
        assert_eq!(notification_title("goal_completed"), "GOAL COMPLETED");
        assert_eq!(notification_title("budget_limit_reached"), "BUDGET LIMIT REACHED");
    }

    #[test]
    fn new_notification_is_unread() {
        let n = Notification::new(1, "goal_completed", "Bravo");
        assert!(n.is_unread());
        assert_eq!(n.title, "GOAL COMPLETED");
    }
}
