//! Authentication, token lifecycle and own-profile management

use std::{collections::HashMap, sync::Arc};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use tokio::sync::RwLock;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{ChangePassword, LoginRequest, LoginResponse, UpdateProfile, User, UserClaims},
    repository::Repository,
};

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a password against a stored Argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
    /// Revoked token ids with their expiry timestamp
    revoked: Arc<RwLock<HashMap<String, i64>>>,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self {
            repository,
            config,
            revoked: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Authenticate with email and password
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let email = request.email.trim().to_lowercase();
        if email.is_empty() || request.password.is_empty() {
            return Err(AppError::Validation("Email and password are required".to_string()));
        }

        let user = {
            let data = self.repository.read().await;
            data.user_by_email(&email).cloned()
        };

        let user = match user {
            Some(user) if verify_password(&user.password_hash, &request.password)? => user,
            _ => {
                tracing::warn!(email = %email, "Rejected login attempt");
                return Err(AppError::Authentication("Invalid email or password".to_string()));
            }
        };

        let token = self.issue_token(&user)?;
        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

        Ok(LoginResponse { user, token })
    }

    fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            member_id: user.member_id.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
            exp: now + (self.config.jwt_expiration_hours as i64) * 3600,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Decode a bearer token and reject it if it was revoked
    pub async fn validate_token(&self, token: &str) -> AppResult<UserClaims> {
        let claims = UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        if self.revoked.read().await.contains_key(&claims.jti) {
            return Err(AppError::Authentication("Token has been revoked".to_string()));
        }

        Ok(claims)
    }

    /// Revoke the token the caller authenticated with
    pub async fn logout(&self, claims: &UserClaims) {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(claims.jti.clone(), claims.exp);
        tracing::info!(user_id = %claims.sub, "User logged out");
    }

    /// Account behind the token
    pub async fn me(&self, claims: &UserClaims) -> AppResult<User> {
        let data = self.repository.read().await;
        data.user(&claims.sub).cloned()
    }

    /// Update own name, phone and address. A linked member profile follows.
    pub async fn update_profile(&self, claims: &UserClaims, update: UpdateProfile) -> AppResult<User> {
        update.validate()?;

        let mut data = self.repository.write().await;
        let user = data.user_mut(&claims.sub)?;
        if let Some(name) = &update.name {
            user.name = name.clone();
        }
        if update.phone.is_some() {
            user.phone = update.phone.clone();
        }
        if update.address.is_some() {
            user.address = update.address.clone();
        }
        let user = user.clone();

        if let Some(member_id) = &user.member_id {
            if let Ok(member) = data.member_mut(member_id) {
                member.name = user.name.clone();
                if let Some(phone) = update.phone {
                    member.phone = phone;
                }
                if let Some(address) = update.address {
                    member.address = address;
                }
            }
        }

        Ok(user)
    }

    /// Change own password after checking the current one
    pub async fn change_password(&self, claims: &UserClaims, request: ChangePassword) -> AppResult<()> {
        request.validate()?;

        let current_hash = {
            let data = self.repository.read().await;
            data.user(&claims.sub)?.password_hash.clone()
        };
        if !verify_password(&current_hash, &request.current_password)? {
            return Err(AppError::Authentication("Current password is incorrect".to_string()));
        }

        let new_hash = hash_password(&request.new_password)?;
        let mut data = self.repository.write().await;
        data.user_mut(&claims.sub)?.password_hash = new_hash;
        tracing::info!(user_id = %claims.sub, "Password changed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::seed;
    use chrono::NaiveDate;
    use tokio_test::{assert_err, assert_ok};

    async fn service() -> AuthService {
        let today = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        let data = seed::demo_data(today, Utc::now()).unwrap();
        AuthService::new(Repository::new(data), AuthConfig::default())
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret!").unwrap();
        assert!(verify_password(&hash, "s3cret!").unwrap());
        assert!(!verify_password(&hash, "guess").unwrap());
    }

    #[tokio::test]
    async fn test_login_normalises_email() {
        let auth = service().await;
        let response = auth.login(login("  Admin@Library.COM ", "admin123")).await.unwrap();
        assert_eq!(response.user.id, "usr-001");
        let claims = auth.validate_token(&response.token).await.unwrap();
        assert_eq!(claims.email, "admin@library.com");
    }

    #[tokio::test]
    async fn test_wrong_password_is_an_authentication_error() {
        let auth = service().await;
        let err = auth.login(login("admin@library.com", "nope")).await.unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
        let err = auth.login(login("", "")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_logout_revokes_only_that_token() {
        let auth = service().await;
        let first = auth.login(login("member@library.com", "member123")).await.unwrap();
        let second = auth.login(login("member@library.com", "member123")).await.unwrap();
        let claims = auth.validate_token(&first.token).await.unwrap();

        auth.logout(&claims).await;

        assert_err!(auth.validate_token(&first.token).await);
        assert_ok!(auth.validate_token(&second.token).await);
    }

    #[tokio::test]
    async fn test_profile_update_follows_linked_member() {
        let auth = service().await;
        let response = auth.login(login("member@library.com", "member123")).await.unwrap();
        let claims = auth.validate_token(&response.token).await.unwrap();

        let user = auth
            .update_profile(
                &claims,
                UpdateProfile {
                    name: Some("Michael Member".to_string()),
                    phone: Some("+1 (555) 300-9999".to_string()),
                    address: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(user.name, "Michael Member");

        let data = auth.repository.read().await;
        let member = data.member("mem-007").unwrap();
        assert_eq!(member.name, "Michael Member");
        assert_eq!(member.phone, "+1 (555) 300-9999");
    }

    #[tokio::test]
    async fn test_change_password_checks_current() {
        let auth = service().await;
        let response = auth.login(login("librarian@library.com", "lib123")).await.unwrap();
        let claims = auth.validate_token(&response.token).await.unwrap();

        let err = auth
            .change_password(
                &claims,
                ChangePassword {
                    current_password: "wrong".to_string(),
                    new_password: "library2024".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));

        auth.change_password(
            &claims,
            ChangePassword {
                current_password: "lib123".to_string(),
                new_password: "library2024".to_string(),
            },
        )
        .await
        .unwrap();
        assert_ok!(auth.login(login("librarian@library.com", "library2024")).await);
        assert_err!(auth.login(login("librarian@library.com", "lib123")).await);
    }
}
