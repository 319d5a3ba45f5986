//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, copies, dashboard, health, loans, members, reservations};

/// Registers the bearer token scheme referenced by the secured paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookdesk API",
        version = "0.3.0",
        description = "Library circulation REST API. Successful responses are wrapped in `{success, data, message}`, failures in `{success: false, error, message}`."
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::logout,
        auth::me,
        auth::update_profile,
        auth::change_password,
        // Books
        books::list_books,
        books::list_categories,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Copies
        copies::list_copies,
        copies::create_copy,
        copies::update_copy,
        copies::delete_copy,
        // Members
        members::list_members,
        members::get_member,
        members::create_member,
        members::update_member,
        members::delete_member,
        members::member_loans,
        members::member_reservations,
        // Loans
        loans::list_loans,
        loans::overdue_loans,
        loans::get_loan,
        loans::issue_book,
        loans::return_book,
        // Reservations
        reservations::list_reservations,
        reservations::get_reservation,
        reservations::create_reservation,
        reservations::cancel_reservation,
        reservations::fulfill_reservation,
        // Dashboard
        dashboard::get_stats,
        dashboard::get_activity,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::Role,
            crate::models::user::User,
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            crate::models::user::UpdateProfile,
            crate::models::user::ChangePassword,
            // Catalog
            crate::models::book::Book,
            crate::models::book::BookQuery,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::copy::BookCopy,
            crate::models::copy::CopyStatus,
            crate::models::copy::CreateCopy,
            crate::models::copy::UpdateCopy,
            // Members
            crate::models::member::Member,
            crate::models::member::MemberStatus,
            crate::models::member::MembershipType,
            crate::models::member::MemberQuery,
            crate::models::member::CreateMember,
            crate::models::member::UpdateMember,
            // Circulation
            crate::models::loan::Loan,
            crate::models::loan::LoanStatus,
            crate::models::loan::LoanQuery,
            crate::models::loan::IssueLoan,
            crate::models::loan::ReturnLoan,
            crate::models::reservation::Reservation,
            crate::models::reservation::ReservationStatus,
            crate::models::reservation::ReservationQuery,
            crate::models::reservation::CreateReservation,
            // Dashboard
            crate::models::activity::Activity,
            crate::models::activity::ActivityKind,
            crate::models::activity::DashboardStats,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorCode,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication and own profile"),
        (name = "books", description = "Catalog management"),
        (name = "copies", description = "Physical copies of catalog entries"),
        (name = "members", description = "Member management"),
        (name = "loans", description = "Issue, return and loan history"),
        (name = "reservations", description = "Reservations and fulfilment"),
        (name = "dashboard", description = "Statistics and recent activity")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_circulation_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/loans/issue"));
        assert!(doc.paths.paths.contains_key("/reservations/{id}/fulfill"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
