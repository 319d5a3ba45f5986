//! API handlers for Bookdesk REST endpoints

pub mod auth;
pub mod books;
pub mod copies;
pub mod dashboard;
pub mod health;
pub mod loans;
pub mod members;
pub mod openapi;
pub mod reservations;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult},
    models::user::UserClaims,
    services::policy::{authorize_member, Action},
    AppState,
};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        // Signature, expiry and revocation
        let claims = state.services.auth.validate_token(token).await?;

        Ok(AuthenticatedUser(claims))
    }
}

/// JSON body whose parse failures render as a failure envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string whose parse failures render as a failure envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Member whose records a listing is restricted to. Staff see everything
/// unless they ask for one member; a MEMBER sees their own records.
pub(crate) fn member_scope(
    claims: &UserClaims,
    action: Action,
    requested: Option<String>,
) -> AppResult<Option<String>> {
    if claims.has_role(action.roles()) {
        return Ok(requested);
    }

    let member_id = requested
        .or_else(|| claims.member_id.clone())
        .ok_or_else(|| AppError::Authorization("No member profile is linked to this account".to_string()))?;
    authorize_member(claims, action, &member_id)?;
    Ok(Some(member_id))
}

/// Build the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/profile", put(auth::update_profile))
        .route("/auth/password", put(auth::change_password))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/categories", get(books::list_categories))
        .route(
            "/books/:id",
            get(books::get_book).put(books::update_book).delete(books::delete_book),
        )
        // Copies
        .route("/books/:id/copies", get(copies::list_copies).post(copies::create_copy))
        .route("/book-copies/:id", put(copies::update_copy).delete(copies::delete_copy))
        // Members
        .route("/members", get(members::list_members).post(members::create_member))
        .route(
            "/members/:id",
            get(members::get_member)
                .put(members::update_member)
                .delete(members::delete_member),
        )
        .route("/members/:id/loans", get(members::member_loans))
        .route("/members/:id/reservations", get(members::member_reservations))
        // Circulation
        .route("/loans", get(loans::list_loans))
        .route("/loans/issue", post(loans::issue_book))
        .route("/loans/return", post(loans::return_book))
        .route("/loans/overdue", get(loans::overdue_loans))
        .route("/loans/:id", get(loans::get_loan))
        // Reservations
        .route(
            "/reservations",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route(
            "/reservations/:id",
            get(reservations::get_reservation).delete(reservations::cancel_reservation),
        )
        .route("/reservations/:id/fulfill", post(reservations::fulfill_reservation))
        // Dashboard
        .route("/dashboard/stats", get(dashboard::get_stats))
        .route("/dashboard/activity", get(dashboard::get_activity))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
