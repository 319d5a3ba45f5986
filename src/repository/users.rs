//! User account lookups

use crate::{
    error::{AppError, AppResult},
    models::User,
};

use super::LibraryData;

impl LibraryData {
    pub fn user(&self, id: &str) -> AppResult<&User> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    pub fn user_mut(&mut self, id: &str) -> AppResult<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Exact match on an already normalised email
    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    /// Email already used by a member or an account
    pub fn email_taken(&self, email: &str, except_member: Option<&str>) -> bool {
        let email = email.trim();
        let member_clash = self
            .members
            .iter()
            .any(|m| m.email.eq_ignore_ascii_case(email) && Some(m.id.as_str()) != except_member);
        let user_clash = self.users.iter().any(|u| {
            u.email.eq_ignore_ascii_case(email)
                && (except_member.is_none() || u.member_id.as_deref() != except_member)
        });
        member_clash || user_clash
    }
}
