//! Loan domain models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    Active,
    Closed,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanStatus {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(LoanStatus::Active),
            "closed" => Ok(LoanStatus::Closed),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown loan status '{}'",
                other
            ))
            .into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: Option<i64>,
    pub user_id: i64,
    pub label: String,
    pub principal: f64,
    /// Annual rate in percent.
    pub annual_rate: f64,
    pub term_months: i32,
    pub start_date: NaiveDate,
    pub monthly_payment: f64,
    pub status: LoanStatus,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLoan {
    pub label: String,
    pub principal: f64,
    pub annual_rate: f64,
    pub term_months: i32,
}

impl NewLoan {
    pub fn into_loan(self, user_id: i64, start_date: NaiveDate) -> Result<Loan> {
        let payment = monthly_payment(self.principal, self.annual_rate, self.term_months)?;
        Ok(Loan {
            id: None,
            user_id,
            label: self.label,
            principal: self.principal,
            annual_rate: self.annual_rate,
            term_months: self.term_months,
            start_date,
            monthly_payment: payment,
            status: LoanStatus::Active,
            created_at: None,
            updated_at: None,
        })
    }
}

/// Fixed monthly payment of an amortized loan.
///
/// `P·r·(1+r)^n / ((1+r)^n − 1)` with `r = rate / 100 / 12`, or `P / n` when
/// the rate is zero.
pub fn monthly_payment(principal: f64, annual_rate: f64, term_months: i32) -> Result<f64> {
    if term_months <= 0 {
        return Err(ValidationError::InvalidInput(format!(
            "Loan term must be positive, got {} months",
            term_months
        ))
        .into());
    }
    if principal < 0.0 || annual_rate < 0.0 {
        return Err(ValidationError::InvalidInput(
            "Loan principal and rate must be non-negative".to_string(),
        )
        .into());
    }

    let n = term_months as f64;
    let r = annual_rate / 100.0 / 12.0;
    if r == 0.0 {
        return Ok(principal / n);
    }
    let growth = (1.0 + r).powf(n);
    Ok(principal * r * growth / (growth - 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_matches_standard_amortization() {
        // 10 000 at 5% over 60 months.
        let payment = monthly_payment(10_000.0, 5.0, 60).unwrap();
        assert!((payment - 188.71).abs() < 0.01, "got {}", payment);
    }

    #[test]
    fn zero_rate_divides_principal_evenly() {
        assert_eq!(monthly_payment(1200.0, 0.0, 12).unwrap(), 100.0);
    }

    #[test]
    fn non_positive_term_is_rejected() {
        assert!(monthly_payment(1000.0, 3.0, 0).is_err());
        assert!(monthly_payment(1000.0, 3.0, -12).is_err());
    }

    #[test]
    fn new_loan_computes_payment_and_is_active() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let loan = NewLoan {
            label: "Voiture".to_string(),
            principal: 1200.0,
            annual_rate: 0.0,
            term_months: 12,
        }
        .into_loan(7, start)
        .unwrap();
        assert_eq!(loan.monthly_payment, 100.0);
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.start_date, start);
        assert_eq!(loan.user_id, 7);
    }
}
