//! Member (borrower profile) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipType {
    Standard,
    Premium,
    Student,
}

impl MembershipType {
    /// Borrowing limit applied when none is given explicitly
    pub fn default_max_books(&self) -> u32 {
        match self {
            MembershipType::Standard => 5,
            MembershipType::Student => 7,
            MembershipType::Premium => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberStatus {
    Active,
    Suspended,
    Expired,
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MemberStatus::Active => "ACTIVE",
            MemberStatus::Suspended => "SUSPENDED",
            MemberStatus::Expired => "EXPIRED",
        };
        write!(f, "{}", label)
    }
}

/// Borrower profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub membership_date: NaiveDate,
    pub membership_type: MembershipType,
    pub status: MemberStatus,
    pub max_books_allowed: u32,
    /// Open loans (ISSUED or OVERDUE), maintained by the lending engine
    pub current_borrowed: u32,
    /// Sign-in account, when the member has one
    pub user_id: Option<String>,
}

impl Member {
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle) || self.email.to_lowercase().contains(&needle)
    }

    pub fn apply(&mut self, update: UpdateMember) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(address) = update.address {
            self.address = address;
        }
        if let Some(membership_type) = update.membership_type {
            self.membership_type = membership_type;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(max) = update.max_books_allowed {
            self.max_books_allowed = max;
        }
    }
}

/// Member search parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MemberQuery {
    /// Case-insensitive match on name or email
    pub search: Option<String>,
    pub status: Option<MemberStatus>,
    pub membership_type: Option<MembershipType>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Create member request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMember {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    pub membership_type: MembershipType,
    pub membership_date: Option<NaiveDate>,
    pub status: Option<MemberStatus>,
    pub max_books_allowed: Option<u32>,
    /// When present a MEMBER sign-in account is created for the member
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
}

/// Update member request. `currentBorrowed` is not writable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMember {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Valid email is required"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Phone cannot be empty"))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub membership_type: Option<MembershipType>,
    pub status: Option<MemberStatus>,
    pub max_books_allowed: Option<u32>,
}
