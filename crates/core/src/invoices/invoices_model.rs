//! Invoice domain models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};

pub const INVOICE_STATUS_PENDING: &str = "pending";

/// Structured output of the OCR collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedInvoice {
    pub supplier: String,
    pub invoice_type: String,
    pub amount: f64,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Option<i64>,
    pub user_id: i64,
    pub supplier: String,
    pub invoice_type: String,
    pub amount: f64,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub status: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl ParsedInvoice {
    pub fn into_invoice(self, user_id: i64) -> Result<Invoice> {
        if self.supplier.trim().is_empty() {
            return Err(ValidationError::MissingField("supplier".to_string()).into());
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ValidationError::InvalidInput(format!(
                "Invoice amount must be a non-negative number, got {}",
                self.amount
            ))
            .into());
        }
        if let Some(due) = self.due_date {
            if due < self.issue_date {
                return Err(ValidationError::InvalidInput(
                    "Invoice due date precedes its issue date".to_string(),
                )
                .into());
            }
        }
        Ok(Invoice {
            id: None,
            user_id,
            supplier: self.supplier.trim().to_string(),
            invoice_type: self.invoice_type,
            amount: self.amount,
            issue_date: self.issue_date,
            due_date: self.due_date,
            status: self
                .status
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| INVOICE_STATUS_PENDING.to_string()),
            created_at: None,
            updated_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed() -> ParsedInvoice {
        ParsedInvoice {
            supplier: " EDF ".to_string(),
            invoice_type: "electricite".to_string(),
            amount: 84.2,
            issue_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 2, 15),
            status: None,
        }
    }

    #[test]
    fn defaults_status_and_trims_supplier() {
        let invoice = parsed().into_invoice(4).unwrap();
        assert_eq!(invoice.supplier, "EDF");
        assert_eq!(invoice.status, INVOICE_STATUS_PENDING);
        assert_eq!(invoice.user_id, 4);
    }

    #[test]
    fn rejects_due_date_before_issue_date() {
        let mut p = parsed();
        p.due_date = NaiveDate::from_ymd_opt(2025, 1, 1);
        assert!(p.into_invoice(4).is_err());
    }

    #[test]
    fn rejects_negative_amount() {
        let mut p = parsed();
        p.amount = -1.0;
        assert!(p.into_invoice(4).is_err());
    }
}
