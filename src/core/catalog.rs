use crate::domain::model::{Book, BookId};
use std::path::{Path, PathBuf};

/// The store's books in load order. Cart entries refer back here by [`BookId`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    books: Vec<Book>,
    source: Option<PathBuf>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_books(books: Vec<Book>) -> Self {
        Self {
            books,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// File this catalog was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, id: BookId) -> Option<&Book> {
        self.books.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: BookId) -> Option<&mut Book> {
        self.books.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (BookId, &Book)> {
        self.books.iter().enumerate().map(|(i, b)| (BookId(i), b))
    }

    pub fn ids(&self) -> impl Iterator<Item = BookId> {
        (0..self.books.len()).map(BookId)
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn find_by_name(&self, name: &str) -> Option<BookId> {
        self.books
            .iter()
            .position(|b| b.name() == name)
            .map(BookId)
    }

    /// Units on the shelf across every title.
    pub fn total_units(&self) -> u64 {
        self.books.iter().map(|b| u64::from(b.quantity())).sum()
    }
}
