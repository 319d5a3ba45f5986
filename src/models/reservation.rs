//! Reservation model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Fulfilled,
    Cancelled,
    /// Derived: a pending reservation past its expiry date
    Expired,
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Fulfilled => "FULFILLED",
            ReservationStatus::Cancelled => "CANCELLED",
            ReservationStatus::Expired => "EXPIRED",
        };
        write!(f, "{}", label)
    }
}

/// A member's claim on a title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub book_id: String,
    pub member_id: String,
    pub reservation_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub status: ReservationStatus,
    /// Loan created when the reservation was fulfilled
    pub loan_id: Option<String>,
}

impl Reservation {
    pub fn status_on(&self, today: NaiveDate) -> ReservationStatus {
        match self.status {
            ReservationStatus::Pending if self.expiry_date < today => ReservationStatus::Expired,
            status => status,
        }
    }

    pub fn resolved(&self, today: NaiveDate) -> Reservation {
        Reservation {
            status: self.status_on(today),
            ..self.clone()
        }
    }
}

/// Create reservation request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservation {
    pub book_id: Option<String>,
    /// Defaults to the caller's own member profile
    pub member_id: Option<String>,
}

/// Reservation search parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReservationQuery {
    pub member_id: Option<String>,
    pub book_id: Option<String>,
    /// Effective status (EXPIRED matches pending reservations past expiry)
    pub status: Option<ReservationStatus>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}
