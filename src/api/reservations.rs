//! Reservation endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        reservation::{CreateReservation, ReservationQuery},
        Envelope, Loan, Page, Reservation,
    },
    services::policy::{authorize, authorize_member, Action},
    AppState,
};

use super::{member_scope, ApiJson, ApiQuery, AuthenticatedUser};

/// List reservations. Members only see their own.
#[utoipa::path(
    get,
    path = "/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(ReservationQuery),
    responses(
        (status = 200, description = "One page of reservations with effective status", body = Vec<Reservation>)
    )
)]
pub async fn list_reservations(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiQuery(query): ApiQuery<ReservationQuery>,
) -> AppResult<Json<Envelope<Page<Reservation>>>> {
    let member_id = member_scope(&claims, Action::ViewLoans, query.member_id.clone())?;
    let query = ReservationQuery { member_id, ..query };
    let page = state.services.lending.list_reservations(&query).await?;
    Ok(Json(Envelope::ok(page)))
}

/// Get reservation by ID
#[utoipa::path(
    get,
    path = "/reservations/{id}",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation with effective status", body = Reservation),
        (status = 404, description = "Reservation not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_reservation(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<Reservation>>> {
    let reservation = state.services.lending.get_reservation(&id).await?;
    authorize_member(&claims, Action::ViewLoans, &reservation.member_id)?;
    Ok(Json(Envelope::ok(reservation)))
}

/// Reserve a book. `memberId` defaults to the caller's member profile.
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    request_body = CreateReservation,
    responses(
        (status = 201, description = "Book reserved", body = Reservation),
        (status = 404, description = "Book or member not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Member inactive or already waiting for this book", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_reservation(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(request): ApiJson<CreateReservation>,
) -> AppResult<(StatusCode, Json<Envelope<Reservation>>)> {
    let requested = request.member_id.clone().or_else(|| claims.member_id.clone());
    let member_id = member_scope(&claims, Action::Reserve, requested)?;
    let request = CreateReservation { member_id, ..request };

    let reservation = state.services.lending.reserve_book(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok_with_message(reservation, "Book reserved successfully")),
    ))
}

/// Cancel a pending reservation
#[utoipa::path(
    delete,
    path = "/reservations/{id}",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation cancelled", body = Reservation),
        (status = 404, description = "Reservation not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Reservation is not pending", body = crate::error::ErrorResponse)
    )
)]
pub async fn cancel_reservation(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<Reservation>>> {
    let reservation = state.services.lending.get_reservation(&id).await?;
    authorize_member(&claims, Action::CancelReservation, &reservation.member_id)?;

    let reservation = state.services.lending.cancel_reservation(&id).await?;
    Ok(Json(Envelope::ok_with_message(reservation, "Reservation cancelled")))
}

/// Lend the first available copy to the member who reserved the book
#[utoipa::path(
    post,
    path = "/reservations/{id}/fulfill",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Reservation ID")),
    responses(
        (status = 201, description = "Reservation fulfilled, loan created", body = Loan),
        (status = 409, description = "Reservation is not pending", body = crate::error::ErrorResponse),
        (status = 422, description = "No copy available", body = crate::error::ErrorResponse)
    )
)]
pub async fn fulfill_reservation(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<Envelope<Loan>>)> {
    authorize(&claims, Action::FulfillReservations)?;
    let loan = state.services.lending.fulfill_reservation(&id).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok_with_message(loan, "Reservation fulfilled")),
    ))
}
