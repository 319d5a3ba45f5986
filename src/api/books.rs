//! Catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book::{BookQuery, CreateBook, UpdateBook},
        Book, Envelope, Page,
    },
    services::policy::{authorize, Action},
    AppState,
};

use super::{ApiJson, ApiQuery, AuthenticatedUser};

/// List books with search, category filter and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(BookQuery),
    responses(
        (status = 200, description = "One page of books", body = Vec<Book>)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiQuery(query): ApiQuery<BookQuery>,
) -> AppResult<Json<Envelope<Page<Book>>>> {
    authorize(&claims, Action::ViewCatalog)?;
    let page = state.services.catalog.list_books(&query).await?;
    Ok(Json(Envelope::ok(page)))
}

/// Distinct categories in the catalog
#[utoipa::path(
    get,
    path = "/books/categories",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sorted category names", body = Vec<String>)
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Envelope<Vec<String>>>> {
    authorize(&claims, Action::ViewCatalog)?;
    let categories = state.services.catalog.categories().await?;
    Ok(Json(Envelope::ok(categories)))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<Book>>> {
    authorize(&claims, Action::ViewCatalog)?;
    let book = state.services.catalog.get_book(&id).await?;
    Ok(Json(Envelope::ok(book)))
}

/// Create a book and its copies
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid book", body = crate::error::ErrorResponse),
        (status = 409, description = "ISBN already catalogued", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(request): ApiJson<CreateBook>,
) -> AppResult<(StatusCode, Json<Envelope<Book>>)> {
    authorize(&claims, Action::ManageCatalog)?;
    let book = state.services.catalog.create_book(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok_with_message(book, "Book created")),
    ))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<UpdateBook>,
) -> AppResult<Json<Envelope<Book>>> {
    authorize(&claims, Action::ManageCatalog)?;
    let book = state.services.catalog.update_book(&id, update).await?;
    Ok(Json(Envelope::ok_with_message(book, "Book updated")))
}

/// Delete a book and its copies
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Copies still on loan", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<()>>> {
    authorize(&claims, Action::DeleteRecords)?;
    state.services.catalog.delete_book(&id).await?;
    Ok(Json(Envelope::done("Book deleted")))
}
