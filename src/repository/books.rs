//! Book lookups and derived copy counters

use std::collections::BTreeSet;

use crate::{
    error::{AppError, AppResult},
    models::{book::BookQuery, Book, CopyStatus},
};

use super::LibraryData;

impl LibraryData {
    pub fn book(&self, id: &str) -> AppResult<&Book> {
        self.books
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    pub fn book_mut(&mut self, id: &str) -> AppResult<&mut Book> {
        self.books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    pub fn book_by_isbn(&self, isbn: &str) -> Option<&Book> {
        let isbn = isbn.trim();
        self.books.iter().find(|b| b.isbn.eq_ignore_ascii_case(isbn))
    }

    /// Books matching the search text and category, in catalog order
    pub fn search_books(&self, query: &BookQuery) -> Vec<Book> {
        let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let category = query.category.as_deref().map(str::trim).filter(|s| !s.is_empty());

        self.books
            .iter()
            .filter(|b| search.map_or(true, |s| b.matches_search(s)))
            .filter(|b| category.map_or(true, |c| b.category == c))
            .cloned()
            .collect()
    }

    /// Distinct categories, sorted
    pub fn categories(&self) -> Vec<String> {
        self.books
            .iter()
            .map(|b| b.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Recompute `totalCopies` and `availableCopies` from the copies
    pub fn sync_book_counts(&mut self, book_id: &str) {
        let (total, available) = self
            .copies
            .iter()
            .filter(|c| c.book_id == book_id)
            .fold((0u32, 0u32), |(total, available), c| {
                let on_shelf = u32::from(c.status == CopyStatus::Available);
                (total + 1, available + on_shelf)
            });

        if let Some(book) = self.books.iter_mut().find(|b| b.id == book_id) {
            book.total_copies = total;
            book.available_copies = available;
        }
    }

    /// Remove a book together with its copies
    pub fn remove_book(&mut self, id: &str) -> AppResult<Book> {
        let position = self
            .books
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;
        self.copies.retain(|c| c.book_id != id);
        Ok(self.books.remove(position))
    }
}
