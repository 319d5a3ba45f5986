//! Reservation lookups

use chrono::NaiveDate;

use crate::{
    error::{AppError, AppResult},
    models::{reservation::ReservationQuery, Reservation, ReservationStatus},
};

use super::LibraryData;

impl LibraryData {
    pub fn reservation(&self, id: &str) -> AppResult<&Reservation> {
        self.reservations
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))
    }

    pub fn reservation_mut(&mut self, id: &str) -> AppResult<&mut Reservation> {
        self.reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))
    }

    /// Effective-PENDING reservation of the member for the book, if any
    pub fn pending_reservation(&self, book_id: &str, member_id: &str, today: NaiveDate) -> Option<&Reservation> {
        self.reservations.iter().find(|r| {
            r.book_id == book_id
                && r.member_id == member_id
                && r.status_on(today) == ReservationStatus::Pending
        })
    }

    /// Cancel every effective-PENDING reservation matching `holds`, returning how many changed
    pub fn cancel_pending_reservations(
        &mut self,
        today: NaiveDate,
        holds: impl Fn(&Reservation) -> bool,
    ) -> usize {
        let mut cancelled = 0;
        for reservation in self.reservations.iter_mut() {
            if holds(reservation) && reservation.status_on(today) == ReservationStatus::Pending {
                reservation.status = ReservationStatus::Cancelled;
                cancelled += 1;
            }
        }
        cancelled
    }

    /// Reservations matching the filters, newest first, with effective status
    pub fn search_reservations(&self, query: &ReservationQuery, today: NaiveDate) -> Vec<Reservation> {
        let mut reservations: Vec<Reservation> = self
            .reservations
            .iter()
            .filter(|r| query.member_id.as_deref().map_or(true, |m| r.member_id == m))
            .filter(|r| query.book_id.as_deref().map_or(true, |b| r.book_id == b))
            .map(|r| r.resolved(today))
            .filter(|r| query.status.map_or(true, |s| r.status == s))
            .collect();
        reservations.sort_by(|a, b| b.reservation_date.cmp(&a.reservation_date));
        reservations
    }
}
