//! Goals domain models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    InProgress,
    Complete,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::InProgress => "in_progress",
            GoalStatus::Complete => "complete",
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(GoalStatus::InProgress),
            "complete" => Ok(GoalStatus::Complete),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown goal status '{}'",
                other
            ))
            .into()),
        }
    }
}

/// Domain model representing a savings goal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Option<i64>,
    pub user_id: i64,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: NaiveDate,
    pub category: Option<String>,
    pub status: GoalStatus,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Goal {
    /// True once the raw current amount reaches the target.
    pub fn is_completed(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    /// Progress against the target. Not clamped, so it may exceed 100.
    pub fn progress_percent(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return if self.current_amount > 0.0 { 100.0 } else { 0.0 };
        }
        self.current_amount / self.target_amount * 100.0
    }

    /// Applies a progress delta, flooring the result at zero.
    ///
    /// Returns `true` when this call is the first one to complete the goal.
    pub fn apply_progress(&mut self, delta: f64) -> bool {
        self.current_amount = (self.current_amount + delta).max(0.0);
        if self.is_completed() && self.status != GoalStatus::Complete {
            self.status = GoalStatus::Complete;
            return true;
        }
        false
    }
}

/// Input model for creating a new goal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub name: String,
    pub target_amount: f64,
    pub deadline: NaiveDate,
    pub category: Option<String>,
}

impl NewGoal {
    pub fn into_goal(self, user_id: i64) -> Goal {
        Goal {
            id: None,
            user_id,
            name: self.name,
            target_amount: self.target_amount,
            current_amount: 0.0,
            deadline: self.deadline,
            category: self.category,
            status: GoalStatus::InProgress,
            created_at: None,
            updated_at: None,
        }
    }
}
