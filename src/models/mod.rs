//! Data models for Bookdesk

pub mod activity;
pub mod book;
pub mod copy;
pub mod loan;
pub mod member;
pub mod reservation;
pub mod response;
pub mod user;

// Re-export commonly used types
pub use activity::{Activity, ActivityKind, DashboardStats};
pub use book::Book;
pub use copy::{BookCopy, CopyStatus};
pub use loan::{Loan, LoanStatus};
pub use member::{Member, MemberStatus, MembershipType};
pub use reservation::{Reservation, ReservationStatus};
pub use response::{Envelope, Page, PageLimits};
pub use user::{Role, User, UserClaims};
