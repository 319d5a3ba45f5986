//! Circulation endpoints: issue, return and loan listings

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        loan::{IssueLoan, LoanQuery, ReturnLoan},
        Envelope, Loan, Page,
    },
    services::policy::{authorize, authorize_member, Action},
    AppState,
};

use super::{member_scope, ApiJson, ApiQuery, AuthenticatedUser};

/// List loans. Members only see their own.
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "One page of loans with effective status", body = Vec<Loan>),
        (status = 403, description = "Another member's loans", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_loans(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiQuery(query): ApiQuery<LoanQuery>,
) -> AppResult<Json<Envelope<Page<Loan>>>> {
    let member_id = member_scope(&claims, Action::ViewLoans, query.member_id.clone())?;
    let query = LoanQuery { member_id, ..query };
    let page = state.services.lending.list_loans(&query).await?;
    Ok(Json(Envelope::ok(page)))
}

/// Open loans past their due date
#[utoipa::path(
    get,
    path = "/loans/overdue",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue loans, most overdue first", body = Vec<Loan>),
        (status = 403, description = "Staff only", body = crate::error::ErrorResponse)
    )
)]
pub async fn overdue_loans(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Envelope<Vec<Loan>>>> {
    authorize(&claims, Action::ViewLoans)?;
    let loans = state.services.lending.overdue_loans().await?;
    Ok(Json(Envelope::ok(loans)))
}

/// Get loan by ID
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan with effective status", body = Loan),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<Loan>>> {
    let loan = state.services.lending.get_loan(&id).await?;
    authorize_member(&claims, Action::ViewLoans, &loan.member_id)?;
    Ok(Json(Envelope::ok(loan)))
}

/// Lend a copy to a member
#[utoipa::path(
    post,
    path = "/loans/issue",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = IssueLoan,
    responses(
        (status = 201, description = "Book issued", body = Loan),
        (status = 400, description = "Missing field or past due date", body = crate::error::ErrorResponse),
        (status = 404, description = "Copy or member not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Copy unavailable, member inactive or at limit", body = crate::error::ErrorResponse)
    )
)]
pub async fn issue_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(request): ApiJson<IssueLoan>,
) -> AppResult<(StatusCode, Json<Envelope<Loan>>)> {
    authorize(&claims, Action::CirculateLoans)?;
    let loan = state.services.lending.issue_book(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok_with_message(loan, "Book issued successfully")),
    ))
}

/// Return a borrowed copy
#[utoipa::path(
    post,
    path = "/loans/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = ReturnLoan,
    responses(
        (status = 200, description = "Book returned", body = Loan),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Loan already returned", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(request): ApiJson<ReturnLoan>,
) -> AppResult<Json<Envelope<Loan>>> {
    authorize(&claims, Action::CirculateLoans)?;
    let loan = state.services.lending.return_book(request).await?;
    Ok(Json(Envelope::ok_with_message(loan, "Book returned successfully")))
}
