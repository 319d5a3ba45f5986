//! Circulation rules: issue, return, reservations and fulfilment
//!
//! Every mutating operation takes the store write lock once and holds it
//! until the loan, the copy, the book counters and the member counter agree
//! again. Preconditions are all checked before the first write, so a
//! rejected operation leaves the store untouched.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::{
    clock::Clock,
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{
        loan::{fine_for, IssueLoan, LoanQuery, ReturnLoan},
        reservation::{CreateReservation, ReservationQuery},
        ActivityKind, CopyStatus, Loan, LoanStatus, MemberStatus, Page, PageLimits, Reservation,
        ReservationStatus,
    },
    repository::{LibraryData, Repository},
};

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
    clock: Arc<dyn Clock>,
    config: LendingConfig,
    limits: PageLimits,
}

impl LendingService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>, config: LendingConfig) -> Self {
        let limits = PageLimits {
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
        };
        Self {
            repository,
            clock,
            config,
            limits,
        }
    }

    fn fine_per_day(&self) -> Decimal {
        Decimal::new(self.config.fine_per_day_cents, 2)
    }

    /// Lend a copy to a member
    pub async fn issue_book(&self, request: IssueLoan) -> AppResult<Loan> {
        let (copy_id, member_id, due_date) = match (request.book_copy_id, request.member_id, request.due_date) {
            (Some(copy_id), Some(member_id), Some(due_date))
                if !copy_id.trim().is_empty() && !member_id.trim().is_empty() =>
            {
                (copy_id, member_id, due_date)
            }
            _ => {
                return Err(AppError::Validation(
                    "bookCopyId, memberId and dueDate are required".to_string(),
                ))
            }
        };

        let today = self.clock.today();
        if due_date < today {
            return Err(AppError::Validation("Due date cannot be in the past".to_string()));
        }

        let mut data = self.repository.write().await;
        self.issue_locked(&mut data, &copy_id, &member_id, due_date, today)
    }

    fn issue_locked(
        &self,
        data: &mut LibraryData,
        copy_id: &str,
        member_id: &str,
        due_date: NaiveDate,
        today: NaiveDate,
    ) -> AppResult<Loan> {
        let copy = data.copy(copy_id)?.clone();
        let member = data.member(member_id)?.clone();

        if copy.status != CopyStatus::Available {
            tracing::warn!("Refused issue of copy {}: status {}", copy.id, copy.status);
            return Err(AppError::BusinessRule(format!(
                "Copy {} is not available (status {})",
                copy.copy_number, copy.status
            )));
        }
        if data.open_loan_for_copy(copy_id).is_some() {
            return Err(AppError::BusinessRule(format!(
                "Copy {} is already on loan",
                copy.copy_number
            )));
        }
        if member.status != MemberStatus::Active {
            tracing::warn!("Refused issue to member {}: status {}", member.id, member.status);
            return Err(AppError::BusinessRule(format!(
                "Member {} is {} and cannot borrow",
                member.name, member.status
            )));
        }
        if member.current_borrowed >= member.max_books_allowed {
            tracing::warn!(
                "Refused issue to member {}: limit of {} books reached",
                member.id, member.max_books_allowed
            );
            return Err(AppError::BusinessRule(format!(
                "Member {} has reached the limit of {} books",
                member.name, member.max_books_allowed
            )));
        }

        let loan = Loan {
            id: self.repository.next_id("loan"),
            book_copy_id: copy.id.clone(),
            book_id: copy.book_id.clone(),
            member_id: member.id.clone(),
            issue_date: today,
            due_date,
            return_date: None,
            status: LoanStatus::Issued,
            fine_amount: None,
        };

        data.copy_mut(copy_id)?.status = CopyStatus::Issued;
        data.loans.push(loan.clone());
        data.sync_book_counts(&copy.book_id);
        data.sync_member_borrowed(&member.id);

        let title = data.book(&copy.book_id).map(|b| b.title.clone()).unwrap_or_default();
        let activity_id = self.repository.next_id("act");
        data.journal(
            activity_id,
            ActivityKind::Issue,
            format!("{} borrowed \"{}\"", member.name, title),
            self.clock.now(),
        );

        tracing::info!(
            "Issued copy {} to member {} as loan {}, due {}",
            copy.id, member.id, loan.id, due_date
        );
        Ok(loan)
    }

    /// Close a loan, putting the copy back on the shelf
    pub async fn return_book(&self, request: ReturnLoan) -> AppResult<Loan> {
        let loan_id = request
            .loan_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AppError::Validation("loanId is required".to_string()))?;

        let today = self.clock.today();
        let fine_per_day = self.fine_per_day();
        let mut data = self.repository.write().await;

        let loan = data.loan(&loan_id)?.clone();
        if !loan.is_open() {
            return Err(AppError::Conflict(format!(
                "Loan {} has already been returned",
                loan.id
            )));
        }

        let fine = fine_for(&loan, today, fine_per_day);
        let returned = {
            let stored = data.loan_mut(&loan_id)?;
            stored.status = LoanStatus::Returned;
            stored.return_date = Some(today);
            stored.fine_amount = Some(fine);
            stored.clone()
        };

        if let Ok(copy) = data.copy_mut(&loan.book_copy_id) {
            copy.status = CopyStatus::Available;
        }
        data.sync_book_counts(&loan.book_id);
        data.sync_member_borrowed(&loan.member_id);

        let member_name = data.member(&loan.member_id).map(|m| m.name.clone()).unwrap_or_default();
        let title = data.book(&loan.book_id).map(|b| b.title.clone()).unwrap_or_default();
        let activity_id = self.repository.next_id("act");
        data.journal(
            activity_id,
            ActivityKind::Return,
            format!("{} returned \"{}\"", member_name, title),
            self.clock.now(),
        );

        if fine > Decimal::ZERO {
            tracing::info!("Returned loan {} late, fine {}", loan.id, fine);
        } else {
            tracing::info!("Returned loan {}", loan.id);
        }
        Ok(returned)
    }

    /// Place a hold on a title for a member
    pub async fn reserve_book(&self, request: CreateReservation) -> AppResult<Reservation> {
        let (book_id, member_id) = match (request.book_id, request.member_id) {
            (Some(book_id), Some(member_id)) if !book_id.trim().is_empty() && !member_id.trim().is_empty() => {
                (book_id, member_id)
            }
            _ => {
                return Err(AppError::Validation(
                    "bookId and memberId are required".to_string(),
                ))
            }
        };

        let today = self.clock.today();
        let mut data = self.repository.write().await;
        let title = data.book(&book_id)?.title.clone();
        let member = data.member(&member_id)?.clone();

        if member.status != MemberStatus::Active {
            tracing::warn!("Refused reservation for member {}: status {}", member.id, member.status);
            return Err(AppError::BusinessRule(format!(
                "Member {} is {} and cannot reserve",
                member.name, member.status
            )));
        }
        if data.pending_reservation(&book_id, &member_id, today).is_some() {
            return Err(AppError::BusinessRule(format!(
                "Member {} already has a pending reservation for \"{}\"",
                member.name, title
            )));
        }

        let reservation = Reservation {
            id: self.repository.next_id("res"),
            book_id,
            member_id,
            reservation_date: today,
            expiry_date: today + Duration::days(self.config.reservation_hold_days),
            status: ReservationStatus::Pending,
            loan_id: None,
        };
        data.reservations.push(reservation.clone());

        let activity_id = self.repository.next_id("act");
        data.journal(
            activity_id,
            ActivityKind::Reservation,
            format!("{} reserved \"{}\"", member.name, title),
            self.clock.now(),
        );

        tracing::info!(
            "Reserved book {} for member {} until {}",
            reservation.book_id, reservation.member_id, reservation.expiry_date
        );
        Ok(reservation)
    }

    /// Cancel a pending reservation. Any other status is a conflict.
    pub async fn cancel_reservation(&self, id: &str) -> AppResult<Reservation> {
        let today = self.clock.today();
        let mut data = self.repository.write().await;

        let status = data.reservation(id)?.status_on(today);
        if status != ReservationStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Only pending reservations can be cancelled (reservation is {})",
                status
            )));
        }

        let reservation = data.reservation_mut(id)?;
        reservation.status = ReservationStatus::Cancelled;
        tracing::info!("Cancelled reservation {}", id);
        Ok(reservation.clone())
    }

    /// Turn a pending reservation into a loan of the first available copy
    pub async fn fulfill_reservation(&self, id: &str) -> AppResult<Loan> {
        let today = self.clock.today();
        let mut data = self.repository.write().await;

        let reservation = data.reservation(id)?.clone();
        let status = reservation.status_on(today);
        if status != ReservationStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Only pending reservations can be fulfilled (reservation is {})",
                status
            )));
        }

        let copy = data.first_available_copy(&reservation.book_id).ok_or_else(|| {
            tracing::warn!("No copy available to fulfil reservation {}", id);
            AppError::BusinessRule("No copy of this book is available".to_string())
        })?;

        let due_date = today + Duration::days(self.config.loan_period_days);
        let loan = self.issue_locked(&mut data, &copy.id, &reservation.member_id, due_date, today)?;

        let stored = data.reservation_mut(id)?;
        stored.status = ReservationStatus::Fulfilled;
        stored.loan_id = Some(loan.id.clone());

        tracing::info!("Fulfilled reservation {} with loan {}", id, loan.id);
        Ok(loan)
    }

    pub async fn list_loans(&self, query: &LoanQuery) -> AppResult<Page<Loan>> {
        let today = self.clock.today();
        let data = self.repository.read().await;
        let loans = data.search_loans(query, today);
        Ok(self.limits.paginate(loans, query.page, query.page_size))
    }

    pub async fn get_loan(&self, id: &str) -> AppResult<Loan> {
        let today = self.clock.today();
        let data = self.repository.read().await;
        Ok(data.loan(id)?.resolved(today))
    }

    /// Open loans past their due date, most overdue first
    pub async fn overdue_loans(&self) -> AppResult<Vec<Loan>> {
        let today = self.clock.today();
        Ok(self.repository.read().await.overdue_loans(today))
    }

    pub async fn list_reservations(&self, query: &ReservationQuery) -> AppResult<Page<Reservation>> {
        let today = self.clock.today();
        let data = self.repository.read().await;
        let reservations = data.search_reservations(query, today);
        Ok(self.limits.paginate(reservations, query.page, query.page_size))
    }

    pub async fn get_reservation(&self, id: &str) -> AppResult<Reservation> {
        let today = self.clock.today();
        let data = self.repository.read().await;
        Ok(data.reservation(id)?.resolved(today))
    }

    /// Ensure a member exists before listing their records
    pub async fn ensure_member(&self, member_id: &str) -> AppResult<()> {
        self.repository.read().await.member(member_id).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::{FixedClock, MockClock},
        models::{Book, BookCopy},
        repository::seed,
    };
    use chrono::{NaiveDate, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service_on(today: NaiveDate) -> LendingService {
        let clock = FixedClock(today);
        let data = seed::demo_data(clock.today(), clock.now()).unwrap();
        LendingService::new(Repository::new(data), Arc::new(clock), LendingConfig::default())
    }

    fn service() -> LendingService {
        service_on(date(2024, 12, 1))
    }

    fn issue(copy: &str, member: &str, due: NaiveDate) -> IssueLoan {
        IssueLoan {
            book_copy_id: Some(copy.to_string()),
            member_id: Some(member.to_string()),
            due_date: Some(due),
        }
    }

    async fn assert_invariants(lending: &LendingService) {
        let data = lending.repository.read().await;
        for book in &data.books {
            let copies: Vec<&BookCopy> = data.copies.iter().filter(|c| c.book_id == book.id).collect();
            let available = copies.iter().filter(|c| c.status == CopyStatus::Available).count();
            assert_eq!(book.total_copies as usize, copies.len(), "{}", book.id);
            assert_eq!(book.available_copies as usize, available, "{}", book.id);
        }
        for member in &data.members {
            let open = data
                .loans
                .iter()
                .filter(|l| l.member_id == member.id && l.status_on(date(2024, 12, 1)).is_open())
                .count();
            assert_eq!(member.current_borrowed as usize, open, "{}", member.id);
        }
    }

    #[tokio::test]
    async fn test_issue_and_return_copy_001() {
        let lending = service();

        let loan = lending.issue_book(issue("copy-001", "mem-002", date(2025, 1, 1))).await.unwrap();
        assert_eq!(loan.status, LoanStatus::Issued);
        assert_eq!(loan.issue_date, date(2024, 12, 1));
        assert_eq!(loan.book_id, "book-001");
        {
            let data = lending.repository.read().await;
            assert_eq!(data.copy("copy-001").unwrap().status, CopyStatus::Issued);
            assert_eq!(data.book("book-001").unwrap().available_copies, 2);
            assert_eq!(data.member("mem-002").unwrap().current_borrowed, 2);
        }
        assert_invariants(&lending).await;

        let returned = lending
            .return_book(ReturnLoan {
                loan_id: Some(loan.id.clone()),
            })
            .await
            .unwrap();
        assert_eq!(returned.status, LoanStatus::Returned);
        assert_eq!(returned.return_date, Some(date(2024, 12, 1)));
        assert_eq!(returned.fine_amount, Some(Decimal::ZERO));
        {
            let data = lending.repository.read().await;
            assert_eq!(data.copy("copy-001").unwrap().status, CopyStatus::Available);
            assert_eq!(data.book("book-001").unwrap().available_copies, 3);
            assert_eq!(data.member("mem-002").unwrap().current_borrowed, 1);
        }
        assert_invariants(&lending).await;
    }

    #[tokio::test]
    async fn test_issue_requires_every_field() {
        let lending = service();
        let mut request = issue("copy-001", "mem-002", date(2025, 1, 1));
        request.due_date = None;
        let err = lending.issue_book(request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = lending.issue_book(issue("copy-001", "mem-002", date(2024, 11, 30))).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_issue_preconditions() {
        let lending = service();
        let due = date(2025, 1, 1);

        let err = lending.issue_book(issue("copy-999", "mem-002", due)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = lending.issue_book(issue("copy-001", "mem-999", due)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        // already issued, reserved, damaged
        for copy in ["copy-002", "copy-004", "copy-012"] {
            let err = lending.issue_book(issue(copy, "mem-002", due)).await.unwrap_err();
            assert!(matches!(err, AppError::BusinessRule(_)), "{}", copy);
        }

        // suspended and expired members
        for member in ["mem-005", "mem-006"] {
            let err = lending.issue_book(issue("copy-001", member, due)).await.unwrap_err();
            assert!(matches!(err, AppError::BusinessRule(_)), "{}", member);
        }
        assert_invariants(&lending).await;
    }

    #[tokio::test]
    async fn test_borrowing_limit() {
        let lending = service();
        let due = date(2025, 1, 1);
        lending.repository.write().await.member_mut("mem-002").unwrap().max_books_allowed = 2;

        lending.issue_book(issue("copy-001", "mem-002", due)).await.unwrap();
        let err = lending.issue_book(issue("copy-003", "mem-002", due)).await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn test_return_twice_is_a_conflict() {
        let lending = service();
        let request = ReturnLoan {
            loan_id: Some("loan-005".to_string()),
        };
        let err = lending.return_book(request).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = lending
            .return_book(ReturnLoan {
                loan_id: Some("loan-404".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_late_return_is_fined() {
        let lending = service();
        // loan-001 was due sixteen days ago
        let returned = lending
            .return_book(ReturnLoan {
                loan_id: Some("loan-001".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(returned.fine_amount, Some(Decimal::new(1600, 2)));
        assert_eq!(
            lending.repository.read().await.member("mem-001").unwrap().current_borrowed,
            1
        );
    }

    #[tokio::test]
    async fn test_reserve_book_003_for_mem_004() {
        let lending = service();
        let reservation = lending
            .reserve_book(CreateReservation {
                book_id: Some("book-003".to_string()),
                member_id: Some("mem-004".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(reservation.status, ReservationStatus::Pending);
        assert_eq!(reservation.reservation_date, date(2024, 12, 1));
        assert_eq!(reservation.expiry_date, reservation.reservation_date + Duration::days(7));

        let err = lending
            .reserve_book(CreateReservation {
                book_id: Some("book-003".to_string()),
                member_id: Some("mem-004".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn test_reserve_rejects_missing_and_inactive() {
        let lending = service();
        let err = lending
            .reserve_book(CreateReservation {
                book_id: Some("book-404".to_string()),
                member_id: Some("mem-004".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = lending
            .reserve_book(CreateReservation {
                book_id: Some("book-003".to_string()),
                member_id: Some("mem-005".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn test_cancel_is_pending_only() {
        let lending = service();
        let cancelled = lending.cancel_reservation("res-001").await.unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);

        // a second cancel is a conflict and changes nothing
        let err = lending.cancel_reservation("res-001").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        let again = lending.get_reservation("res-001").await.unwrap();
        assert_eq!(again, cancelled);

        // derived EXPIRED and stored FULFILLED are final too
        for id in ["res-003", "res-004"] {
            let err = lending.cancel_reservation(id).await.unwrap_err();
            assert!(matches!(err, AppError::Conflict(_)), "{}", id);
        }
        let err = lending.cancel_reservation("res-404").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_fulfill_produces_exactly_one_loan() {
        let lending = service();
        let before = lending.repository.read().await.loans.len();

        let loan = lending.fulfill_reservation("res-001").await.unwrap();
        assert_eq!(loan.member_id, "mem-002");
        assert_eq!(loan.book_copy_id, "copy-001");
        assert_eq!(loan.due_date, date(2024, 12, 15));
        assert_eq!(loan.status, LoanStatus::Issued);

        let data = lending.repository.read().await;
        assert_eq!(data.loans.len(), before + 1);
        let reservation = data.reservation("res-001").unwrap();
        assert_eq!(reservation.status, ReservationStatus::Fulfilled);
        assert_eq!(reservation.loan_id.as_deref(), Some(loan.id.as_str()));
        drop(data);

        let err = lending.fulfill_reservation("res-001").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_invariants(&lending).await;
    }

    #[tokio::test]
    async fn test_fulfill_without_available_copy_stays_pending() {
        let lending = service();
        {
            let mut data = lending.repository.write().await;
            data.books.push(Book {
                id: "book-100".to_string(),
                isbn: "000".to_string(),
                title: "Out of Print".to_string(),
                author: "Nobody".to_string(),
                publisher: String::new(),
                published_year: 1900,
                category: "Classic".to_string(),
                description: None,
                cover_image: None,
                total_copies: 0,
                available_copies: 0,
            });
        }
        let reservation = lending
            .reserve_book(CreateReservation {
                book_id: Some("book-100".to_string()),
                member_id: Some("mem-004".to_string()),
            })
            .await
            .unwrap();

        let err = lending.fulfill_reservation(&reservation.id).await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
        let reservation = lending.get_reservation(&reservation.id).await.unwrap();
        assert_eq!(reservation.status, ReservationStatus::Pending);
        assert!(reservation.loan_id.is_none());
    }

    #[tokio::test]
    async fn test_derived_statuses_in_filters() {
        let lending = service();
        let overdue = lending
            .list_loans(&LoanQuery {
                status: Some(LoanStatus::Overdue),
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<_> = overdue.items.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["loan-004", "loan-001"]);

        let overdue = lending.overdue_loans().await.unwrap();
        assert_eq!(overdue[0].id, "loan-001");

        let expired = lending
            .list_reservations(&ReservationQuery {
                status: Some(ReservationStatus::Expired),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(expired.total, 1);
        assert_eq!(expired.items[0].id, "res-003");

        let loan = lending.get_loan("loan-002").await.unwrap();
        assert_eq!(loan.status, LoanStatus::Issued);
    }

    #[tokio::test]
    async fn test_loans_turn_overdue_as_days_pass() {
        let mut clock = MockClock::new();
        let mut day = date(2024, 12, 1);
        let data = seed::demo_data(day, Utc::now()).unwrap();
        // loan-002 is due three days after seeding
        day += Duration::days(4);
        clock.expect_today().return_const(day);
        clock.expect_now().returning(Utc::now);
        let lending = LendingService::new(Repository::new(data), Arc::new(clock), LendingConfig::default());

        let loan = lending.get_loan("loan-002").await.unwrap();
        assert_eq!(loan.status, LoanStatus::Overdue);
        let stored = lending.repository.read().await.loan("loan-002").unwrap().status;
        assert_eq!(stored, LoanStatus::Issued);
    }

    #[tokio::test]
    async fn test_member_filter() {
        let lending = service();
        let page = lending
            .list_loans(&LoanQuery {
                member_id: Some("mem-003".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert!(page.items.iter().all(|l| l.member_id == "mem-003"));
    }
}
