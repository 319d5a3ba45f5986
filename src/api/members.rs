//! Member management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        loan::LoanQuery,
        member::{CreateMember, MemberQuery, UpdateMember},
        reservation::ReservationQuery,
        Envelope, Loan, Member, Page, Reservation,
    },
    services::policy::{authorize, authorize_member, Action},
    AppState,
};

use super::{ApiJson, ApiQuery, AuthenticatedUser};

/// List members with search, filters and pagination
#[utoipa::path(
    get,
    path = "/members",
    tag = "members",
    security(("bearer_auth" = [])),
    params(MemberQuery),
    responses(
        (status = 200, description = "One page of members", body = Vec<Member>),
        (status = 403, description = "Staff only", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_members(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiQuery(query): ApiQuery<MemberQuery>,
) -> AppResult<Json<Envelope<Page<Member>>>> {
    authorize(&claims, Action::ViewMembers)?;
    let page = state.services.members.list_members(&query).await?;
    Ok(Json(Envelope::ok(page)))
}

/// Get member by ID
#[utoipa::path(
    get,
    path = "/members/{id}",
    tag = "members",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member details", body = Member),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_member(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<Member>>> {
    authorize_member(&claims, Action::ViewMembers, &id)?;
    let member = state.services.members.get_member(&id).await?;
    Ok(Json(Envelope::ok(member)))
}

/// Register a member
#[utoipa::path(
    post,
    path = "/members",
    tag = "members",
    security(("bearer_auth" = [])),
    request_body = CreateMember,
    responses(
        (status = 201, description = "Member created", body = Member),
        (status = 400, description = "Invalid member", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_member(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(request): ApiJson<CreateMember>,
) -> AppResult<(StatusCode, Json<Envelope<Member>>)> {
    authorize(&claims, Action::ManageMembers)?;
    let member = state.services.members.create_member(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok_with_message(member, "Member created")),
    ))
}

/// Update a member
#[utoipa::path(
    put,
    path = "/members/{id}",
    tag = "members",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Member ID")),
    request_body = UpdateMember,
    responses(
        (status = 200, description = "Member updated", body = Member),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_member(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<UpdateMember>,
) -> AppResult<Json<Envelope<Member>>> {
    authorize(&claims, Action::ManageMembers)?;
    let member = state.services.members.update_member(&id, update).await?;
    Ok(Json(Envelope::ok_with_message(member, "Member updated")))
}

/// Delete a member without open loans
#[utoipa::path(
    delete,
    path = "/members/{id}",
    tag = "members",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member deleted"),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Member has books on loan", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_member(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<()>>> {
    authorize(&claims, Action::DeleteRecords)?;
    state.services.members.delete_member(&id).await?;
    Ok(Json(Envelope::done("Member deleted")))
}

/// Loans of one member
#[utoipa::path(
    get,
    path = "/members/{id}/loans",
    tag = "members",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Member ID"), LoanQuery),
    responses(
        (status = 200, description = "One page of the member's loans", body = Vec<Loan>),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn member_loans(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<LoanQuery>,
) -> AppResult<Json<Envelope<Page<Loan>>>> {
    authorize_member(&claims, Action::ViewLoans, &id)?;
    state.services.lending.ensure_member(&id).await?;
    let query = LoanQuery {
        member_id: Some(id),
        ..query
    };
    let page = state.services.lending.list_loans(&query).await?;
    Ok(Json(Envelope::ok(page)))
}

/// Reservations of one member
#[utoipa::path(
    get,
    path = "/members/{id}/reservations",
    tag = "members",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Member ID"), ReservationQuery),
    responses(
        (status = 200, description = "One page of the member's reservations", body = Vec<Reservation>),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn member_reservations(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<ReservationQuery>,
) -> AppResult<Json<Envelope<Page<Reservation>>>> {
    authorize_member(&claims, Action::ViewLoans, &id)?;
    state.services.lending.ensure_member(&id).await?;
    let query = ReservationQuery {
        member_id: Some(id),
        ..query
    };
    let page = state.services.lending.list_reservations(&query).await?;
    Ok(Json(Envelope::ok(page)))
}
