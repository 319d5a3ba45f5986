//! Book (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Catalog entry. Copy counters are derived from the book's copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub published_year: i32,
    pub category: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub total_copies: u32,
    pub available_copies: u32,
}

/// Book search parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive match on title, author or ISBN
    pub search: Option<String>,
    /// Exact category
    pub category: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Create book request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub published_year: i32,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    /// Number of copies to register along with the title
    #[serde(default)]
    #[validate(range(max = 500, message = "At most 500 copies can be registered at once"))]
    pub total_copies: u32,
    /// Shelf for the registered copies
    pub location: Option<String>,
}

/// Update book request. Copy counters are not writable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "ISBN cannot be empty"))]
    pub isbn: Option<String>,
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Author cannot be empty"))]
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub published_year: Option<i32>,
    #[validate(length(min = 1, message = "Category cannot be empty"))]
    pub category: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
}

impl CreateBook {
    /// Trim text fields. Runs before validation so blank values are rejected.
    pub fn normalize(&mut self) {
        for field in [
            &mut self.isbn,
            &mut self.title,
            &mut self.author,
            &mut self.publisher,
            &mut self.category,
        ] {
            *field = field.trim().to_string();
        }
    }
}

impl UpdateBook {
    pub fn normalize(&mut self) {
        let fields = [
            &mut self.isbn,
            &mut self.title,
            &mut self.author,
            &mut self.publisher,
            &mut self.category,
        ];
        for field in fields.into_iter().flatten() {
            *field = field.trim().to_string();
        }
    }
}

impl Book {
    /// Case-insensitive substring match on title, author or ISBN
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.author.to_lowercase().contains(&needle)
            || self.isbn.to_lowercase().contains(&needle)
    }

    pub fn apply(&mut self, update: UpdateBook) {
        if let Some(isbn) = update.isbn {
            self.isbn = isbn;
        }
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(author) = update.author {
            self.author = author;
        }
        if let Some(publisher) = update.publisher {
            self.publisher = publisher;
        }
        if let Some(year) = update.published_year {
            self.published_year = year;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if update.description.is_some() {
            self.description = update.description;
        }
        if update.cover_image.is_some() {
            self.cover_image = update.cover_image;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gatsby() -> Book {
        Book {
            id: "book-003".to_string(),
            isbn: "978-0-7432-7356-5".to_string(),
            title: "The Great Gatsby".to_string(),
            author: "F. Scott Fitzgerald".to_string(),
            publisher: "Charles Scribner's Sons".to_string(),
            published_year: 1925,
            category: "Classic".to_string(),
            description: None,
            cover_image: None,
            total_copies: 3,
            available_copies: 1,
        }
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let book = gatsby();
        assert!(book.matches_search("GATSBY"));
        assert!(book.matches_search("fitzgerald"));
        assert!(book.matches_search("7356"));
        assert!(!book.matches_search("orwell"));
    }

    #[test]
    fn test_apply_keeps_counters() {
        let mut book = gatsby();
        book.apply(UpdateBook {
            title: Some("Gatsby".to_string()),
            ..Default::default()
        });
        assert_eq!(book.title, "Gatsby");
        assert_eq!(book.total_copies, 3);
        assert_eq!(book.available_copies, 1);
    }
}
