//! Book copy endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        copy::{CreateCopy, UpdateCopy},
        BookCopy, Envelope,
    },
    services::policy::{authorize, Action},
    AppState,
};

use super::{ApiJson, AuthenticatedUser};

/// List the copies of a book
#[utoipa::path(
    get,
    path = "/books/{id}/copies",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Copies ordered by copy number", body = Vec<BookCopy>),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_copies(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<String>,
) -> AppResult<Json<Envelope<Vec<BookCopy>>>> {
    authorize(&claims, Action::ViewCatalog)?;
    let copies = state.services.catalog.list_copies(&book_id).await?;
    Ok(Json(Envelope::ok(copies)))
}

/// Register a new copy
#[utoipa::path(
    post,
    path = "/books/{id}/copies",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Book ID")),
    request_body = CreateCopy,
    responses(
        (status = 201, description = "Copy added", body = BookCopy),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Copy number already used", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_copy(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<String>,
    ApiJson(request): ApiJson<CreateCopy>,
) -> AppResult<(StatusCode, Json<Envelope<BookCopy>>)> {
    authorize(&claims, Action::ManageCatalog)?;
    let copy = state.services.catalog.add_copy(&book_id, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok_with_message(copy, "Copy added")),
    ))
}

/// Update number, location or shelf status of a copy
#[utoipa::path(
    put,
    path = "/book-copies/{id}",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Copy ID")),
    request_body = UpdateCopy,
    responses(
        (status = 200, description = "Copy updated", body = BookCopy),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Status change reserved to circulation", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_copy(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<UpdateCopy>,
) -> AppResult<Json<Envelope<BookCopy>>> {
    authorize(&claims, Action::ManageCatalog)?;
    let copy = state.services.catalog.update_copy(&id, update).await?;
    Ok(Json(Envelope::ok_with_message(copy, "Copy updated")))
}

/// Delete a copy that is not on loan
#[utoipa::path(
    delete,
    path = "/book-copies/{id}",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Copy ID")),
    responses(
        (status = 200, description = "Copy deleted"),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Copy is on loan", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_copy(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<()>>> {
    authorize(&claims, Action::DeleteRecords)?;
    state.services.catalog.delete_copy(&id).await?;
    Ok(Json(Envelope::done("Copy deleted")))
}
