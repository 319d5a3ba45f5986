//! In-memory entity store
//!
//! Every collection lives in one [`LibraryData`] behind a single
//! `tokio::sync::RwLock`. Services take the write guard for the whole of a
//! mutating operation so counters are always recomputed under the same lock
//! that changed the underlying copies and loans.

pub mod activity;
pub mod books;
pub mod copies;
pub mod loans;
pub mod members;
pub mod reservations;
pub mod seed;
pub mod users;

use std::sync::Arc;

use snowflaked::sync::Generator;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::{Activity, Book, BookCopy, Loan, Member, Reservation, User};

/// All collections of the store
#[derive(Debug, Default, Clone)]
pub struct LibraryData {
    pub users: Vec<User>,
    pub books: Vec<Book>,
    pub copies: Vec<BookCopy>,
    pub members: Vec<Member>,
    pub loans: Vec<Loan>,
    pub reservations: Vec<Reservation>,
    /// Newest entries last
    pub activity: Vec<Activity>,
}

/// Shared handle on the store
#[derive(Clone)]
pub struct Repository {
    data: Arc<RwLock<LibraryData>>,
    ids: Arc<Generator>,
}

impl Repository {
    pub fn new(data: LibraryData) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
            ids: Arc::new(Generator::new(0)),
        }
    }

    pub fn empty() -> Self {
        Self::new(LibraryData::default())
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, LibraryData> {
        self.data.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, LibraryData> {
        self.data.write().await
    }

    /// New runtime id such as `loan-7263011739471953920`
    pub fn next_id(&self, prefix: &str) -> String {
        let id: u64 = self.ids.generate();
        format!("{}-{}", prefix, id)
    }
}
