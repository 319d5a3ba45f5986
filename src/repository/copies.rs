//! Book copy lookups

use crate::{
    error::{AppError, AppResult},
    models::{copy::copy_number, BookCopy, CopyStatus},
};

use super::LibraryData;

impl LibraryData {
    pub fn copy(&self, id: &str) -> AppResult<&BookCopy> {
        self.copies
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))
    }

    pub fn copy_mut(&mut self, id: &str) -> AppResult<&mut BookCopy> {
        self.copies
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))
    }

    /// Copies of a book ordered by copy number
    pub fn copies_of(&self, book_id: &str) -> Vec<BookCopy> {
        let mut copies: Vec<BookCopy> = self
            .copies
            .iter()
            .filter(|c| c.book_id == book_id)
            .cloned()
            .collect();
        copies.sort_by(|a, b| a.copy_number.cmp(&b.copy_number));
        copies
    }

    /// First `COPY-nnnn` number not yet used by the book
    pub fn next_copy_number(&self, book_id: &str) -> String {
        let taken: Vec<&str> = self
            .copies
            .iter()
            .filter(|c| c.book_id == book_id)
            .map(|c| c.copy_number.as_str())
            .collect();
        let mut n = taken.len() + 1;
        loop {
            let candidate = copy_number(n);
            if !taken.contains(&candidate.as_str()) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn copy_number_taken(&self, book_id: &str, number: &str, except: Option<&str>) -> bool {
        self.copies
            .iter()
            .any(|c| c.book_id == book_id && c.copy_number == number && Some(c.id.as_str()) != except)
    }

    /// First AVAILABLE copy of a book by copy number
    pub fn first_available_copy(&self, book_id: &str) -> Option<BookCopy> {
        self.copies_of(book_id)
            .into_iter()
            .find(|c| c.status == CopyStatus::Available)
    }

    /// Remove one copy, returning it
    pub fn remove_copy(&mut self, id: &str) -> AppResult<BookCopy> {
        let position = self
            .copies
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))?;
        Ok(self.copies.remove(position))
    }
}
