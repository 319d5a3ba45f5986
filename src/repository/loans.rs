//! Loan lookups. Every read resolves the effective status for `today`.

use chrono::NaiveDate;

use crate::{
    error::{AppError, AppResult},
    models::{loan::LoanQuery, Loan, LoanStatus},
};

use super::LibraryData;

impl LibraryData {
    pub fn loan(&self, id: &str) -> AppResult<&Loan> {
        self.loans
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", id)))
    }

    pub fn loan_mut(&mut self, id: &str) -> AppResult<&mut Loan> {
        self.loans
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", id)))
    }

    pub fn open_loan_for_copy(&self, copy_id: &str) -> Option<&Loan> {
        self.loans.iter().find(|l| l.book_copy_id == copy_id && l.is_open())
    }

    pub fn has_open_loans_for_member(&self, member_id: &str) -> bool {
        self.loans.iter().any(|l| l.member_id == member_id && l.is_open())
    }

    /// Loans matching the filters, newest issue first, with effective status
    pub fn search_loans(&self, query: &LoanQuery, today: NaiveDate) -> Vec<Loan> {
        let mut loans: Vec<Loan> = self
            .loans
            .iter()
            .filter(|l| query.member_id.as_deref().map_or(true, |m| l.member_id == m))
            .map(|l| l.resolved(today))
            .filter(|l| query.status.map_or(true, |s| l.status == s))
            .collect();
        loans.sort_by(|a, b| b.issue_date.cmp(&a.issue_date));
        loans
    }

    pub fn overdue_loans(&self, today: NaiveDate) -> Vec<Loan> {
        let mut loans: Vec<Loan> = self
            .loans
            .iter()
            .map(|l| l.resolved(today))
            .filter(|l| l.status == LoanStatus::Overdue)
            .collect();
        loans.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        loans
    }
}
