//! Catalog management service: books and their copies

use std::sync::Arc;

use validator::Validate;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{
        book::{BookQuery, CreateBook, UpdateBook},
        copy::{CreateCopy, UpdateCopy},
        Book, BookCopy, CopyStatus, Page, PageLimits,
    },
    repository::Repository,
};

const DEFAULT_LOCATION: &str = "Main Library";

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    clock: Arc<dyn Clock>,
    limits: PageLimits,
}

impl CatalogService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>, limits: PageLimits) -> Self {
        Self {
            repository,
            clock,
            limits,
        }
    }

    /// Search books with filters
    pub async fn list_books(&self, query: &BookQuery) -> AppResult<Page<Book>> {
        let data = self.repository.read().await;
        let books = data.search_books(query);
        Ok(self.limits.paginate(books, query.page, query.page_size))
    }

    pub async fn get_book(&self, id: &str) -> AppResult<Book> {
        let data = self.repository.read().await;
        data.book(id).cloned()
    }

    pub async fn categories(&self) -> AppResult<Vec<String>> {
        Ok(self.repository.read().await.categories())
    }

    /// Create a title and register `totalCopies` copies of it
    pub async fn create_book(&self, mut request: CreateBook) -> AppResult<Book> {
        request.normalize();
        request.validate()?;

        let mut data = self.repository.write().await;
        if data.book_by_isbn(&request.isbn).is_some() {
            return Err(AppError::Conflict(format!(
                "A book with ISBN {} already exists",
                request.isbn
            )));
        }

        let today = self.clock.today();
        let book = Book {
            id: self.repository.next_id("book"),
            isbn: request.isbn,
            title: request.title,
            author: request.author,
            publisher: request.publisher,
            published_year: request.published_year,
            category: request.category,
            description: request.description,
            cover_image: request.cover_image,
            total_copies: 0,
            available_copies: 0,
        };
        let location = request
            .location
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

        data.books.push(book.clone());
        for _ in 0..request.total_copies {
            let copy = BookCopy {
                id: self.repository.next_id("copy"),
                book_id: book.id.clone(),
                copy_number: data.next_copy_number(&book.id),
                status: CopyStatus::Available,
                location: location.clone(),
                added_date: today,
            };
            data.copies.push(copy);
        }
        data.sync_book_counts(&book.id);

        tracing::info!("Created book {} ({}) with {} copies", book.id, book.title, request.total_copies);
        data.book(&book.id).cloned()
    }

    pub async fn update_book(&self, id: &str, mut update: UpdateBook) -> AppResult<Book> {
        update.normalize();
        update.validate()?;

        let mut data = self.repository.write().await;
        if let Some(isbn) = &update.isbn {
            if data.book_by_isbn(isbn).is_some_and(|b| b.id != id) {
                return Err(AppError::Conflict(format!(
                    "A book with ISBN {} already exists",
                    isbn
                )));
            }
        }

        let book = data.book_mut(id)?;
        book.apply(update);
        Ok(book.clone())
    }

    /// Delete a title and all its copies. Refused while a copy is on loan.
    pub async fn delete_book(&self, id: &str) -> AppResult<()> {
        let today = self.clock.today();
        let mut data = self.repository.write().await;
        data.book(id)?;

        let issued = data
            .copies
            .iter()
            .filter(|c| c.book_id == id && c.status == CopyStatus::Issued)
            .count();
        if issued > 0 {
            tracing::warn!("Refused to delete book {}: {} copies on loan", id, issued);
            return Err(AppError::BusinessRule(format!(
                "Cannot delete a book with {} copies on loan",
                issued
            )));
        }

        let book = data.remove_book(id)?;
        let cancelled = data.cancel_pending_reservations(today, |r| r.book_id == id);
        tracing::info!(
            "Deleted book {} ({}), cancelled {} pending reservations",
            book.id, book.title, cancelled
        );
        Ok(())
    }

    pub async fn list_copies(&self, book_id: &str) -> AppResult<Vec<BookCopy>> {
        let data = self.repository.read().await;
        data.book(book_id)?;
        Ok(data.copies_of(book_id))
    }

    /// Register a new copy of a title
    pub async fn add_copy(&self, book_id: &str, request: CreateCopy) -> AppResult<BookCopy> {
        let status = request.status.unwrap_or(CopyStatus::Available);
        if status == CopyStatus::Issued {
            return Err(AppError::Validation(
                "A new copy cannot be registered as ISSUED".to_string(),
            ));
        }

        let mut data = self.repository.write().await;
        data.book(book_id)?;

        let copy_number = match request.copy_number.map(|n| n.trim().to_string()) {
            Some(number) if !number.is_empty() => {
                if data.copy_number_taken(book_id, &number, None) {
                    return Err(AppError::Conflict(format!(
                        "Copy number {} is already used for this book",
                        number
                    )));
                }
                number
            }
            _ => data.next_copy_number(book_id),
        };

        let copy = BookCopy {
            id: self.repository.next_id("copy"),
            book_id: book_id.to_string(),
            copy_number,
            status,
            location: request
                .location
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            added_date: self.clock.today(),
        };
        data.copies.push(copy.clone());
        data.sync_book_counts(book_id);

        tracing::info!("Added copy {} to book {}", copy.copy_number, book_id);
        Ok(copy)
    }

    /// Change number, location or status of a copy. ISSUED is owned by lending.
    pub async fn update_copy(&self, id: &str, update: UpdateCopy) -> AppResult<BookCopy> {
        let mut data = self.repository.write().await;
        let current = data.copy(id)?.clone();

        if let Some(target) = update.status {
            if target != current.status && !current.status.can_set_manually(target) {
                tracing::warn!("Refused copy {} status change {} -> {}", id, current.status, target);
                return Err(AppError::BusinessRule(format!(
                    "Copy status cannot change from {} to {} outside of circulation",
                    current.status, target
                )));
            }
        }
        if let Some(number) = &update.copy_number {
            let number = number.trim();
            if number.is_empty() {
                return Err(AppError::Validation("Copy number cannot be empty".to_string()));
            }
            if data.copy_number_taken(&current.book_id, number, Some(id)) {
                return Err(AppError::Conflict(format!(
                    "Copy number {} is already used for this book",
                    number
                )));
            }
        }

        let copy = data.copy_mut(id)?;
        if let Some(number) = update.copy_number {
            copy.copy_number = number.trim().to_string();
        }
        if let Some(location) = update.location {
            copy.location = location;
        }
        if let Some(status) = update.status {
            copy.status = status;
        }
        let copy = copy.clone();
        data.sync_book_counts(&copy.book_id);

        Ok(copy)
    }

    pub async fn delete_copy(&self, id: &str) -> AppResult<()> {
        let mut data = self.repository.write().await;
        if data.copy(id)?.status == CopyStatus::Issued {
            return Err(AppError::BusinessRule(
                "Cannot delete a copy that is on loan".to_string(),
            ));
        }

        let copy = data.remove_copy(id)?;
        data.sync_book_counts(&copy.book_id);
        tracing::info!("Deleted copy {} of book {}", copy.copy_number, copy.book_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::FixedClock, models::ReservationStatus, repository::seed};
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
    }

    fn service() -> CatalogService {
        let clock = FixedClock(today());
        let data = seed::demo_data(clock.today(), clock.now()).unwrap();
        CatalogService::new(Repository::new(data), Arc::new(clock), PageLimits::default())
    }

    fn new_book(isbn: &str, copies: u32) -> CreateBook {
        CreateBook {
            isbn: isbn.to_string(),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            publisher: "Chilton Books".to_string(),
            published_year: 1965,
            category: "Science Fiction".to_string(),
            description: None,
            cover_image: None,
            total_copies: copies,
            location: None,
        }
    }

    #[tokio::test]
    async fn test_create_book_materialises_copies() {
        let catalog = service();
        let book = catalog.create_book(new_book("978-0-441-17271-9", 3)).await.unwrap();
        assert_eq!(book.total_copies, 3);
        assert_eq!(book.available_copies, 3);

        let copies = catalog.list_copies(&book.id).await.unwrap();
        let numbers: Vec<_> = copies.iter().map(|c| c.copy_number.as_str()).collect();
        assert_eq!(numbers, vec!["COPY-0001", "COPY-0002", "COPY-0003"]);
        assert!(copies.iter().all(|c| c.location == "Main Library" && c.added_date == today()));
    }

    #[tokio::test]
    async fn test_duplicate_isbn_is_a_conflict() {
        let catalog = service();
        let err = catalog.create_book(new_book("978-0-452-28423-4", 1)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_missing_title_is_a_validation_error() {
        let catalog = service();
        let mut request = new_book("111", 1);
        request.title = String::new();
        let err = catalog.create_book(request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected_and_values_are_trimmed() {
        let catalog = service();
        let mut request = new_book("   ", 1);
        request.title = "  ".to_string();
        let err = catalog.create_book(request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut request = new_book("  978-0-441-17271-9 ", 0);
        request.title = " Dune ".to_string();
        let book = catalog.create_book(request).await.unwrap();
        assert_eq!(book.isbn, "978-0-441-17271-9");
        assert_eq!(book.title, "Dune");

        let updated = catalog
            .update_book(
                &book.id,
                UpdateBook {
                    title: Some("  Dune Messiah  ".to_string()),
                    category: Some(" Classic".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Dune Messiah");
        assert_eq!(updated.category, "Classic");

        let err = catalog
            .update_book(
                &book.id,
                UpdateBook {
                    author: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_books_second_page() {
        let catalog = service();
        for n in 0..4 {
            catalog.create_book(new_book(&format!("isbn-{}", n), 0)).await.unwrap();
        }
        let page = catalog
            .list_books(&BookQuery {
                page: Some(2),
                page_size: Some(5),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 12);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_pages, 3);
    }

    #[tokio::test]
    async fn test_search_and_category_filters() {
        let catalog = service();
        let page = catalog
            .list_books(&BookQuery {
                search: Some("kill a".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 2);

        let page = catalog
            .list_books(&BookQuery {
                category: Some("Fantasy".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<_> = page.items.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["book-006", "book-007"]);
    }

    #[tokio::test]
    async fn test_categories_are_distinct_and_sorted() {
        let categories = service().categories().await.unwrap();
        assert_eq!(
            categories,
            vec!["Classic", "Dystopian", "Fantasy", "Fiction", "Philosophy", "Romance"]
        );
    }

    #[tokio::test]
    async fn test_add_copy_updates_counts() {
        let catalog = service();
        let copy = catalog.add_copy("book-008", CreateCopy::default()).await.unwrap();
        assert_eq!(copy.copy_number, "COPY-0003");
        let book = catalog.get_book("book-008").await.unwrap();
        assert_eq!((book.total_copies, book.available_copies), (3, 3));
    }

    #[tokio::test]
    async fn test_manual_status_changes_respect_circulation() {
        let catalog = service();

        let copy = catalog
            .update_copy(
                "copy-003",
                UpdateCopy {
                    status: Some(CopyStatus::Damaged),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(copy.status, CopyStatus::Damaged);
        assert_eq!(catalog.get_book("book-001").await.unwrap().available_copies, 2);

        let err = catalog
            .update_copy(
                "copy-002",
                UpdateCopy {
                    status: Some(CopyStatus::Available),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));

        let err = catalog
            .update_copy(
                "copy-001",
                UpdateCopy {
                    status: Some(CopyStatus::Issued),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn test_delete_book_with_copies_on_loan_is_refused() {
        let catalog = service();
        let err = catalog.delete_book("book-001").await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));

        catalog.delete_book("book-004").await.unwrap();
        assert!(matches!(catalog.get_book("book-004").await, Err(AppError::NotFound(_))));
        assert!(matches!(catalog.list_copies("book-004").await, Err(AppError::NotFound(_))));
        assert!(catalog
            .repository
            .read()
            .await
            .copies
            .iter()
            .all(|c| c.book_id != "book-004"));
    }

    #[tokio::test]
    async fn test_delete_book_cancels_pending_reservations() {
        let catalog = service();
        catalog.delete_book("book-006").await.unwrap();

        let data = catalog.repository.read().await;
        assert_eq!(data.reservation("res-002").unwrap().status, ReservationStatus::Cancelled);
        assert_eq!(data.reservation("res-001").unwrap().status, ReservationStatus::Pending);
    }
}
