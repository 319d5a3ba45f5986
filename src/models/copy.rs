//! Book copy (physical instance) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Copy status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CopyStatus {
    Available,
    Issued,
    Reserved,
    Damaged,
    Lost,
}

impl CopyStatus {
    /// Whether a manual status change is allowed. ISSUED is entered and left
    /// only through loans.
    pub fn can_set_manually(&self, target: CopyStatus) -> bool {
        match (self, target) {
            (CopyStatus::Issued, _) | (_, CopyStatus::Issued) => false,
            _ => true,
        }
    }
}

impl std::fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CopyStatus::Available => "AVAILABLE",
            CopyStatus::Issued => "ISSUED",
            CopyStatus::Reserved => "RESERVED",
            CopyStatus::Damaged => "DAMAGED",
            CopyStatus::Lost => "LOST",
        };
        write!(f, "{}", label)
    }
}

/// Physical copy of a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookCopy {
    pub id: String,
    pub book_id: String,
    pub copy_number: String,
    pub status: CopyStatus,
    pub location: String,
    pub added_date: NaiveDate,
}

/// Add copy request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCopy {
    /// Defaults to the next `COPY-nnnn` number of the book
    pub copy_number: Option<String>,
    /// Defaults to "Main Library"
    pub location: Option<String>,
    /// Defaults to AVAILABLE
    pub status: Option<CopyStatus>,
}

/// Update copy request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCopy {
    pub copy_number: Option<String>,
    pub location: Option<String>,
    pub status: Option<CopyStatus>,
}

/// Format the n-th copy number of a book
pub fn copy_number(n: usize) -> String {
    format!("COPY-{:04}", n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_transitions() {
        assert!(CopyStatus::Available.can_set_manually(CopyStatus::Reserved));
        assert!(CopyStatus::Reserved.can_set_manually(CopyStatus::Available));
        assert!(CopyStatus::Available.can_set_manually(CopyStatus::Lost));
        assert!(CopyStatus::Damaged.can_set_manually(CopyStatus::Available));
        assert!(!CopyStatus::Available.can_set_manually(CopyStatus::Issued));
        assert!(!CopyStatus::Issued.can_set_manually(CopyStatus::Lost));
    }

    #[test]
    fn test_copy_number_format() {
        assert_eq!(copy_number(1), "COPY-0001");
        assert_eq!(copy_number(42), "COPY-0042");
    }
}
