//! Dashboard statistics and recent activity

use std::sync::Arc;

use crate::{
    clock::Clock,
    error::AppResult,
    models::{Activity, DashboardStats, LoanStatus, ReservationStatus},
    repository::Repository,
};

/// Entries returned when no limit is requested
pub const DEFAULT_ACTIVITY_LIMIT: usize = 10;
const MAX_ACTIVITY_LIMIT: usize = 100;

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl DashboardService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let today = self.clock.today();
        let data = self.repository.read().await;

        let mut stats = DashboardStats {
            total_books: data.books.iter().map(|b| u64::from(b.total_copies)).sum(),
            available_books: data.books.iter().map(|b| u64::from(b.available_copies)).sum(),
            total_members: data.members.len() as u64,
            ..Default::default()
        };

        for loan in &data.loans {
            match loan.status_on(today) {
                LoanStatus::Issued => stats.active_loans += 1,
                LoanStatus::Overdue => {
                    stats.active_loans += 1;
                    stats.overdue_loans += 1;
                }
                LoanStatus::Returned => {}
            }
            if loan.issue_date == today {
                stats.today_issues += 1;
            }
            if loan.return_date == Some(today) {
                stats.today_returns += 1;
            }
        }

        stats.pending_reservations = data
            .reservations
            .iter()
            .filter(|r| r.status_on(today) == ReservationStatus::Pending)
            .count() as u64;

        Ok(stats)
    }

    /// Most recent journal entries, newest first
    pub async fn recent_activity(&self, limit: Option<usize>) -> AppResult<Vec<Activity>> {
        let limit = limit
            .filter(|l| (1..=MAX_ACTIVITY_LIMIT).contains(l))
            .unwrap_or(DEFAULT_ACTIVITY_LIMIT);
        Ok(self.repository.read().await.recent_activity(limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::FixedClock,
        config::LendingConfig,
        models::{loan::IssueLoan, ActivityKind},
        repository::seed,
        services::lending::LendingService,
    };
    use chrono::NaiveDate;

    fn setup() -> (DashboardService, LendingService) {
        let clock = Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()));
        let data = seed::demo_data(clock.today(), clock.now()).unwrap();
        let repository = Repository::new(data);
        (
            DashboardService::new(repository.clone(), clock.clone()),
            LendingService::new(repository, clock, LendingConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_seeded_stats() {
        let (dashboard, _) = setup();
        let stats = dashboard.stats().await.unwrap();
        assert_eq!(stats.total_books, 32);
        assert_eq!(stats.available_books, 22);
        assert_eq!(stats.total_members, 7);
        assert_eq!(stats.active_loans, 4);
        assert_eq!(stats.overdue_loans, 2);
        assert_eq!(stats.pending_reservations, 2);
        assert_eq!(stats.today_issues, 0);
        assert_eq!(stats.today_returns, 0);
    }

    #[tokio::test]
    async fn test_stats_follow_circulation() {
        let (dashboard, lending) = setup();
        lending
            .issue_book(IssueLoan {
                book_copy_id: Some("copy-013".to_string()),
                member_id: Some("mem-004".to_string()),
                due_date: NaiveDate::from_ymd_opt(2024, 12, 15),
            })
            .await
            .unwrap();

        let stats = dashboard.stats().await.unwrap();
        assert_eq!(stats.today_issues, 1);
        assert_eq!(stats.active_loans, 5);
        assert_eq!(stats.available_books, 21);

        let activity = dashboard.recent_activity(None).await.unwrap();
        assert_eq!(activity.len(), 6);
        assert_eq!(activity[0].kind, ActivityKind::Issue);
        assert_eq!(activity[0].description, "David Brown borrowed \"The Catcher in the Rye\"");
    }

    #[tokio::test]
    async fn test_activity_limit() {
        let (dashboard, _) = setup();
        let activity = dashboard.recent_activity(Some(2)).await.unwrap();
        let ids: Vec<_> = activity.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["act-001", "act-002"]);
    }
}
