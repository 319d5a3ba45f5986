//! Member management service

use std::sync::Arc;

use validator::Validate;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{
        member::{CreateMember, MemberQuery, UpdateMember},
        ActivityKind, Member, MemberStatus, Page, PageLimits, Role, User,
    },
    repository::Repository,
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
    clock: Arc<dyn Clock>,
    limits: PageLimits,
}

impl MembersService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>, limits: PageLimits) -> Self {
        Self {
            repository,
            clock,
            limits,
        }
    }

    pub async fn list_members(&self, query: &MemberQuery) -> AppResult<Page<Member>> {
        let data = self.repository.read().await;
        let members = data.search_members(query);
        Ok(self.limits.paginate(members, query.page, query.page_size))
    }

    pub async fn get_member(&self, id: &str) -> AppResult<Member> {
        let data = self.repository.read().await;
        data.member(id).cloned()
    }

    /// Register a borrower, with a sign-in account when a password is given
    pub async fn create_member(&self, request: CreateMember) -> AppResult<Member> {
        request.validate()?;

        // Hash outside the store lock
        let password_hash = request.password.as_deref().map(hash_password).transpose()?;
        let email = request.email.trim().to_lowercase();

        let mut data = self.repository.write().await;
        if data.email_taken(&email, None) {
            return Err(AppError::Conflict(format!(
                "Email {} is already registered",
                email
            )));
        }

        let today = self.clock.today();
        let mut member = Member {
            id: self.repository.next_id("mem"),
            name: request.name.trim().to_string(),
            email: email.clone(),
            phone: request.phone,
            address: request.address,
            membership_date: request.membership_date.unwrap_or(today),
            membership_type: request.membership_type,
            status: request.status.unwrap_or(MemberStatus::Active),
            max_books_allowed: request
                .max_books_allowed
                .unwrap_or_else(|| request.membership_type.default_max_books()),
            current_borrowed: 0,
            user_id: None,
        };

        if let Some(password_hash) = password_hash {
            let user = User {
                id: self.repository.next_id("usr"),
                email,
                name: member.name.clone(),
                role: Role::Member,
                phone: Some(member.phone.clone()),
                address: Some(member.address.clone()),
                membership_date: Some(member.membership_date),
                member_id: Some(member.id.clone()),
                password_hash,
            };
            member.user_id = Some(user.id.clone());
            data.users.push(user);
        }

        data.members.push(member.clone());
        let activity_id = self.repository.next_id("act");
        data.journal(
            activity_id,
            ActivityKind::NewMember,
            format!("New member registered: {}", member.name),
            self.clock.now(),
        );

        tracing::info!("Registered member {} ({})", member.id, member.name);
        Ok(member)
    }

    pub async fn update_member(&self, id: &str, update: UpdateMember) -> AppResult<Member> {
        update.validate()?;

        let mut data = self.repository.write().await;
        data.member(id)?;
        let email = update.email.as_deref().map(|e| e.trim().to_lowercase());
        if let Some(email) = &email {
            if data.email_taken(email, Some(id)) {
                return Err(AppError::Conflict(format!(
                    "Email {} is already registered",
                    email
                )));
            }
        }

        let member = data.member_mut(id)?;
        member.apply(UpdateMember { email, ..update });
        let member = member.clone();

        // Keep the linked account in step
        if let Some(user_id) = &member.user_id {
            if let Ok(user) = data.user_mut(user_id) {
                user.name = member.name.clone();
                user.email = member.email.clone();
                user.phone = Some(member.phone.clone());
                user.address = Some(member.address.clone());
            }
        }

        Ok(member)
    }

    /// Delete a member and the linked account. Refused while loans are open.
    pub async fn delete_member(&self, id: &str) -> AppResult<()> {
        let today = self.clock.today();
        let mut data = self.repository.write().await;
        data.member(id)?;
        if data.has_open_loans_for_member(id) {
            tracing::warn!("Refused to delete member {} with open loans", id);
            return Err(AppError::BusinessRule(
                "Cannot delete a member with books on loan".to_string(),
            ));
        }

        let member = data.remove_member(id)?;
        data.users.retain(|u| u.member_id.as_deref() != Some(id));
        let cancelled = data.cancel_pending_reservations(today, |r| r.member_id == id);
        tracing::info!(
            "Deleted member {} ({}), cancelled {} pending reservations",
            member.id, member.name, cancelled
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::FixedClock,
        models::{ActivityKind, MembershipType, ReservationStatus},
        repository::seed,
    };
    use chrono::NaiveDate;

    fn service() -> MembersService {
        let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        let data = seed::demo_data(clock.today(), clock.now()).unwrap();
        MembersService::new(Repository::new(data), Arc::new(clock), PageLimits::default())
    }

    fn new_member(email: &str, password: Option<&str>) -> CreateMember {
        CreateMember {
            name: "Grace Hopper".to_string(),
            email: email.to_string(),
            phone: "+1 (555) 777-7777".to_string(),
            address: "1 Navy Yard".to_string(),
            membership_type: MembershipType::Student,
            membership_date: None,
            status: None,
            max_books_allowed: None,
            password: password.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_member_defaults() {
        let members = service();
        let member = members.create_member(new_member("grace@navy.mil", None)).await.unwrap();
        assert_eq!(member.current_borrowed, 0);
        assert_eq!(member.max_books_allowed, 7);
        assert_eq!(member.status, MemberStatus::Active);
        assert_eq!(member.membership_date.to_string(), "2024-12-01");
        assert!(member.user_id.is_none());

        let data = members.repository.read().await;
        let latest = data.recent_activity(1);
        assert_eq!(latest[0].kind, ActivityKind::NewMember);
        assert_eq!(latest[0].description, "New member registered: Grace Hopper");
    }

    #[tokio::test]
    async fn test_create_member_with_password_links_an_account() {
        let members = service();
        let member = members
            .create_member(new_member("Grace@Navy.mil", Some("cobol60")))
            .await
            .unwrap();

        let data = members.repository.read().await;
        let user = data.user_by_email("grace@navy.mil").unwrap();
        assert_eq!(user.role, Role::Member);
        assert_eq!(user.member_id.as_deref(), Some(member.id.as_str()));
        assert_eq!(member.user_id.as_deref(), Some(user.id.as_str()));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_conflict() {
        let members = service();
        let err = members
            .create_member(new_member("BOB.SMITH@email.com", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = members
            .create_member(new_member("librarian@library.com", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_invalid_email_is_a_validation_error() {
        let err = service()
            .create_member(new_member("not-an-email", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_filters() {
        let members = service();
        let page = members
            .list_members(&MemberQuery {
                membership_type: Some(MembershipType::Premium),
                status: Some(MemberStatus::Active),
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<_> = page.items.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["mem-001", "mem-004"]);

        let page = members
            .list_members(&MemberQuery {
                search: Some("UNIVERSITY".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.items[0].id, "mem-003");
    }

    #[tokio::test]
    async fn test_update_keeps_linked_account_in_step() {
        let members = service();
        let member = members
            .update_member(
                "mem-007",
                UpdateMember {
                    email: Some("mike@library.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(member.email, "mike@library.com");
        assert_eq!(member.current_borrowed, 0);

        let data = members.repository.read().await;
        assert!(data.user_by_email("mike@library.com").is_some());
    }

    #[tokio::test]
    async fn test_delete_member_with_open_loans_is_refused() {
        let members = service();
        let err = members.delete_member("mem-001").await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));

        members.delete_member("mem-007").await.unwrap();
        let data = members.repository.read().await;
        assert!(data.user_by_email("member@library.com").is_none());
    }

    #[tokio::test]
    async fn test_delete_member_cancels_pending_reservations() {
        let members = service();
        members.delete_member("mem-004").await.unwrap();

        let data = members.repository.read().await;
        assert_eq!(data.reservation("res-002").unwrap().status, ReservationStatus::Cancelled);
        let today = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        let pending = data
            .reservations
            .iter()
            .filter(|r| r.status_on(today) == ReservationStatus::Pending)
            .count();
        assert_eq!(pending, 1);
    }
}
