//! Loan model and related types

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    Issued,
    Returned,
    /// Derived: an issued loan past its due date
    Overdue,
}

impl LoanStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, LoanStatus::Issued | LoanStatus::Overdue)
    }
}

/// A copy lent to a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: String,
    pub book_copy_id: String,
    pub book_id: String,
    pub member_id: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: LoanStatus,
    #[schema(value_type = Option<f64>)]
    pub fine_amount: Option<Decimal>,
}

impl Loan {
    /// Status as seen on `today`: an open loan past its due date is OVERDUE
    pub fn status_on(&self, today: NaiveDate) -> LoanStatus {
        match self.status {
            LoanStatus::Returned => LoanStatus::Returned,
            LoanStatus::Issued | LoanStatus::Overdue if self.due_date < today => LoanStatus::Overdue,
            LoanStatus::Issued | LoanStatus::Overdue => LoanStatus::Issued,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// Copy of the loan carrying its effective status
    pub fn resolved(&self, today: NaiveDate) -> Loan {
        Loan {
            status: self.status_on(today),
            ..self.clone()
        }
    }

    pub fn days_overdue(&self, on: NaiveDate) -> i64 {
        (on - self.due_date).num_days().max(0)
    }
}

/// Fine for returning a loan on `returned_on`
pub fn fine_for(loan: &Loan, returned_on: NaiveDate, fine_per_day: Decimal) -> Decimal {
    Decimal::from(loan.days_overdue(returned_on)) * fine_per_day
}

/// Issue request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueLoan {
    pub book_copy_id: Option<String>,
    pub member_id: Option<String>,
    pub due_date: Option<NaiveDate>,
}

/// Return request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnLoan {
    pub loan_id: Option<String>,
}

/// Loan search parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LoanQuery {
    pub member_id: Option<String>,
    /// Effective status (OVERDUE matches issued loans past due)
    pub status: Option<LoanStatus>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn loan(status: LoanStatus) -> Loan {
        Loan {
            id: "loan-001".to_string(),
            book_copy_id: "copy-002".to_string(),
            book_id: "book-001".to_string(),
            member_id: "mem-001".to_string(),
            issue_date: date(2024, 11, 1),
            due_date: date(2024, 11, 15),
            return_date: None,
            status,
            fine_amount: None,
        }
    }

    #[test]
    fn test_overdue_is_derived_from_due_date() {
        let l = loan(LoanStatus::Issued);
        assert_eq!(l.status_on(date(2024, 11, 15)), LoanStatus::Issued);
        assert_eq!(l.status_on(date(2024, 11, 16)), LoanStatus::Overdue);
        assert_eq!(loan(LoanStatus::Returned).status_on(date(2025, 1, 1)), LoanStatus::Returned);
    }

    #[test]
    fn test_fine_counts_full_days_late() {
        let l = loan(LoanStatus::Issued);
        let per_day = Decimal::new(100, 2);
        assert_eq!(fine_for(&l, date(2024, 11, 10), per_day), Decimal::ZERO);
        assert_eq!(fine_for(&l, date(2024, 11, 18), per_day), Decimal::new(300, 2));
    }
}
