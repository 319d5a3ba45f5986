//! Circulation activity journal and dashboard figures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    Issue,
    Return,
    Reservation,
    NewMember,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Activity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Copies in the catalog
    pub total_books: u64,
    /// Copies on the shelf
    pub available_books: u64,
    pub total_members: u64,
    /// Open loans, overdue included
    pub active_loans: u64,
    pub overdue_loans: u64,
    pub pending_reservations: u64,
    pub today_returns: u64,
    pub today_issues: u64,
}
