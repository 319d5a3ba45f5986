//! Authentication endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{
        user::{ChangePassword, LoginRequest, LoginResponse, UpdateProfile},
        Envelope, User,
    },
    AppState,
};

use super::{ApiJson, AuthenticatedUser};

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Email or password missing", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> AppResult<Json<Envelope<LoginResponse>>> {
    let response = state.services.auth.login(request).await?;
    Ok(Json(Envelope::ok_with_message(response, "Login successful")))
}

/// Revoke the current token
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Envelope<()>>> {
    state.services.auth.logout(&claims).await;
    Ok(Json(Envelope::done("Logged out successfully")))
}

/// Get current user info
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Envelope<User>>> {
    let user = state.services.auth.me(&claims).await?;
    Ok(Json(Envelope::ok(user)))
}

/// Update own name, phone and address
#[utoipa::path(
    put,
    path = "/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "Invalid profile", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(update): ApiJson<UpdateProfile>,
) -> AppResult<Json<Envelope<User>>> {
    let user = state.services.auth.update_profile(&claims, update).await?;
    Ok(Json(Envelope::ok_with_message(user, "Profile updated")))
}

/// Change own password
#[utoipa::path(
    put,
    path = "/auth/password",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = ChangePassword,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "New password too short", body = crate::error::ErrorResponse),
        (status = 401, description = "Current password is incorrect", body = crate::error::ErrorResponse)
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(request): ApiJson<ChangePassword>,
) -> AppResult<Json<Envelope<()>>> {
    state.services.auth.change_password(&claims, request).await?;
    Ok(Json(Envelope::done("Password changed")))
}
