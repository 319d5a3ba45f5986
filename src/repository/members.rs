//! Member lookups and the borrowed-count invariant

use crate::{
    error::{AppError, AppResult},
    models::{member::MemberQuery, Member},
};

use super::LibraryData;

impl LibraryData {
    pub fn member(&self, id: &str) -> AppResult<&Member> {
        self.members
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))
    }

    pub fn member_mut(&mut self, id: &str) -> AppResult<&mut Member> {
        self.members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))
    }

    pub fn member_by_email(&self, email: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.email.eq_ignore_ascii_case(email.trim()))
    }

    pub fn search_members(&self, query: &MemberQuery) -> Vec<Member> {
        let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

        self.members
            .iter()
            .filter(|m| search.map_or(true, |s| m.matches_search(s)))
            .filter(|m| query.status.map_or(true, |s| m.status == s))
            .filter(|m| query.membership_type.map_or(true, |t| m.membership_type == t))
            .cloned()
            .collect()
    }

    /// Recompute `currentBorrowed` from the member's open loans
    pub fn sync_member_borrowed(&mut self, member_id: &str) {
        let open = self
            .loans
            .iter()
            .filter(|l| l.member_id == member_id && l.is_open())
            .count() as u32;

        if let Some(member) = self.members.iter_mut().find(|m| m.id == member_id) {
            member.current_borrowed = open;
        }
    }

    pub fn remove_member(&mut self, id: &str) -> AppResult<Member> {
        let position = self
            .members
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))?;
        Ok(self.members.remove(position))
    }
}
