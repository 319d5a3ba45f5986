//! Role policy consulted by every handler

use crate::{
    error::{AppError, AppResult},
    models::{Role, UserClaims},
};

/// Everything a caller can ask to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewCatalog,
    ViewDashboard,
    ManageCatalog,
    ViewMembers,
    ManageMembers,
    CirculateLoans,
    FulfillReservations,
    ViewLoans,
    Reserve,
    CancelReservation,
    DeleteRecords,
}

const EVERYONE: &[Role] = &[Role::Admin, Role::Librarian, Role::Member];
const STAFF: &[Role] = &[Role::Admin, Role::Librarian];
const ADMIN: &[Role] = &[Role::Admin];

impl Action {
    /// Roles allowed on any record
    pub fn roles(&self) -> &'static [Role] {
        match self {
            Action::ViewCatalog | Action::ViewDashboard => EVERYONE,
            Action::ManageCatalog
            | Action::ViewMembers
            | Action::ManageMembers
            | Action::CirculateLoans
            | Action::FulfillReservations
            | Action::ViewLoans
            | Action::Reserve
            | Action::CancelReservation => STAFF,
            Action::DeleteRecords => ADMIN,
        }
    }

    /// Actions a MEMBER may take on their own member record
    pub fn allows_owner(&self) -> bool {
        matches!(
            self,
            Action::ViewMembers | Action::ViewLoans | Action::Reserve | Action::CancelReservation
        )
    }
}

/// Check an action that is not tied to a member record
pub fn authorize(claims: &UserClaims, action: Action) -> AppResult<()> {
    if claims.has_role(action.roles()) {
        return Ok(());
    }

    tracing::warn!(user_id = %claims.sub, role = %claims.role, ?action, "Access denied");
    Err(AppError::Authorization(format!(
        "Role {} is not allowed to perform this action",
        claims.role
    )))
}

/// Check an action on the records of `member_id`
pub fn authorize_member(claims: &UserClaims, action: Action, member_id: &str) -> AppResult<()> {
    if claims.has_role(action.roles()) {
        return Ok(());
    }
    if action.allows_owner() && claims.owns_member(member_id) {
        return Ok(());
    }

    tracing::warn!(user_id = %claims.sub, role = %claims.role, ?action, member_id, "Access denied");
    Err(AppError::Authorization(
        "You can only access your own records".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role, member_id: Option<&str>) -> UserClaims {
        UserClaims {
            sub: "usr-x".to_string(),
            email: "x@library.com".to_string(),
            name: "X".to_string(),
            role,
            member_id: member_id.map(str::to_string),
            jti: "jti".to_string(),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_role_table() {
        let admin = claims(Role::Admin, None);
        let librarian = claims(Role::Librarian, None);
        let member = claims(Role::Member, Some("mem-007"));

        assert!(authorize(&member, Action::ViewCatalog).is_ok());
        assert!(authorize(&member, Action::ViewDashboard).is_ok());
        assert!(authorize(&member, Action::CirculateLoans).is_err());
        assert!(authorize(&member, Action::ManageCatalog).is_err());
        assert!(authorize(&librarian, Action::CirculateLoans).is_ok());
        assert!(authorize(&librarian, Action::FulfillReservations).is_ok());
        assert!(authorize(&librarian, Action::DeleteRecords).is_err());
        assert!(authorize(&admin, Action::DeleteRecords).is_ok());
    }

    #[test]
    fn test_members_act_on_their_own_records_only() {
        let member = claims(Role::Member, Some("mem-007"));

        assert!(authorize_member(&member, Action::ViewLoans, "mem-007").is_ok());
        assert!(authorize_member(&member, Action::Reserve, "mem-007").is_ok());
        assert!(authorize_member(&member, Action::CancelReservation, "mem-007").is_ok());
        assert!(authorize_member(&member, Action::ViewLoans, "mem-001").is_err());
        assert!(authorize_member(&member, Action::ManageMembers, "mem-007").is_err());
        assert!(authorize_member(&claims(Role::Librarian, None), Action::Reserve, "mem-001").is_ok());
    }

    #[test]
    fn test_member_without_profile_owns_nothing() {
        let member = claims(Role::Member, None);
        let err = authorize_member(&member, Action::ViewLoans, "mem-001").unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }
}
