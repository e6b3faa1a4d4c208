//! In-process store used for tests and for running without PostgreSQL
//!
//! Every write holds the table lock for its whole check-then-act sequence,
//! which gives the same guarantees as the unique index and the guarded delete
//! of the PostgreSQL store.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{unknown_book, BookInstanceStore, BookStore, GenreStore};
use crate::{
    error::AppResult,
    models::{
        Book, BookInstance, BookInstanceData, BookSummary, Genre, GenreDeletion, GenreWrite,
        RecordId,
    },
};

#[derive(Debug, Default)]
struct Tables {
    books: Vec<Book>,
    genres: Vec<Genre>,
    book_instances: Vec<BookInstance>,
}

impl Tables {
    fn book_title(&self, id: &RecordId) -> Option<String> {
        self.books
            .iter()
            .find(|b| &b.id == id)
            .map(|b| b.title.clone())
    }

    fn with_title(&self, instance: &BookInstance) -> BookInstance {
        BookInstance {
            book_title: self.book_title(&instance.book),
            ..instance.clone()
        }
    }

    /// Copies may only name existing books, like the `book_id` foreign key
    fn check_book(&self, id: &RecordId) -> AppResult<()> {
        if self.books.iter().any(|b| &b.id == id) {
            Ok(())
        } else {
            Err(unknown_book(id))
        }
    }

    fn genre_referenced(&self, id: &RecordId) -> bool {
        self.books.iter().any(|b| b.genres.contains(id))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a book
    pub async fn put_book(&self, book: Book) {
        let mut tables = self.tables.write().await;
        tables.books.retain(|b| b.id != book.id);
        tables.books.push(book);
    }

    /// Remove a book, releasing its genre references
    pub async fn remove_book(&self, id: &RecordId) -> bool {
        let mut tables = self.tables.write().await;
        let before = tables.books.len();
        tables.books.retain(|b| &b.id != id);
        tables.books.len() != before
    }

    /// Store preloaded with a few books so the forms have something to offer
    pub async fn with_sample_books() -> Self {
        let store = Self::new();
        for (id, title, author) in [
            ("sample-book-1", "The Name of the Wind", "Patrick Rothfuss"),
            ("sample-book-2", "Apes and Angels", "Ben Bova"),
            ("sample-book-3", "Death Wave", "Ben Bova"),
        ] {
            store
                .put_book(Book {
                    id: RecordId::from(id),
                    title: title.to_string(),
                    author: Some(author.to_string()),
                    summary: String::new(),
                    isbn: String::new(),
                    genres: Vec::new(),
                })
                .await;
        }
        store
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn book_list_summaries(&self) -> AppResult<Vec<BookSummary>> {
        let tables = self.tables.read().await;
        let mut books: Vec<BookSummary> = tables.books.iter().map(Book::to_summary).collect();
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books)
    }

    async fn book_list_by_genre(&self, genre_id: &RecordId) -> AppResult<Vec<BookSummary>> {
        let tables = self.tables.read().await;
        let mut books: Vec<BookSummary> = tables
            .books
            .iter()
            .filter(|b| b.genres.contains(genre_id))
            .map(Book::to_summary)
            .collect();
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books)
    }
}

#[async_trait]
impl GenreStore for MemoryStore {
    async fn genre_list(&self) -> AppResult<Vec<Genre>> {
        let tables = self.tables.read().await;
        let mut genres = tables.genres.clone();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    async fn genre_get(&self, id: &RecordId) -> AppResult<Option<Genre>> {
        let tables = self.tables.read().await;
        Ok(tables.genres.iter().find(|g| &g.id == id).cloned())
    }

    async fn genre_create_or_get(&self, name: &str) -> AppResult<GenreWrite> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.genres.iter().find(|g| g.name == name) {
            return Ok(GenreWrite::Existing(existing.clone()));
        }
        let genre = Genre {
            id: RecordId::generate(),
            name: name.to_string(),
        };
        tables.genres.push(genre.clone());
        Ok(GenreWrite::Saved(genre))
    }

    async fn genre_rename(&self, id: &RecordId, name: &str) -> AppResult<Option<GenreWrite>> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.genres.iter().find(|g| g.name == name && &g.id != id) {
            return Ok(Some(GenreWrite::Existing(existing.clone())));
        }
        Ok(tables.genres.iter_mut().find(|g| &g.id == id).map(|genre| {
            genre.name = name.to_string();
            GenreWrite::Saved(genre.clone())
        }))
    }

    async fn genre_delete_unreferenced(&self, id: &RecordId) -> AppResult<GenreDeletion> {
        let mut tables = self.tables.write().await;
        if !tables.genres.iter().any(|g| &g.id == id) {
            return Ok(GenreDeletion::Missing);
        }
        if tables.genre_referenced(id) {
            return Ok(GenreDeletion::Referenced);
        }
        tables.genres.retain(|g| &g.id != id);
        Ok(GenreDeletion::Deleted)
    }
}

#[async_trait]
impl BookInstanceStore for MemoryStore {
    async fn book_instance_list(&self) -> AppResult<Vec<BookInstance>> {
        let tables = self.tables.read().await;
        let mut instances: Vec<BookInstance> = tables
            .book_instances
            .iter()
            .map(|i| tables.with_title(i))
            .collect();
        instances.sort_by(|a, b| {
            a.book_title
                .cmp(&b.book_title)
                .then_with(|| a.imprint.cmp(&b.imprint))
        });
        Ok(instances)
    }

    async fn book_instance_get(&self, id: &RecordId) -> AppResult<Option<BookInstance>> {
        let tables = self.tables.read().await;
        Ok(tables
            .book_instances
            .iter()
            .find(|i| &i.id == id)
            .map(|i| tables.with_title(i)))
    }

    async fn book_instance_create(&self, data: &BookInstanceData) -> AppResult<BookInstance> {
        let mut tables = self.tables.write().await;
        tables.check_book(&data.book)?;
        let instance = BookInstance {
            id: RecordId::generate(),
            book: data.book.clone(),
            imprint: data.imprint.clone(),
            status: data.status,
            due_back: data.due_back,
            book_title: None,
        };
        tables.book_instances.push(instance.clone());
        Ok(instance)
    }

    async fn book_instance_replace(
        &self,
        id: &RecordId,
        data: &BookInstanceData,
    ) -> AppResult<Option<BookInstance>> {
        let mut tables = self.tables.write().await;
        if !tables.book_instances.iter().any(|i| &i.id == id) {
            return Ok(None);
        }
        tables.check_book(&data.book)?;
        Ok(tables
            .book_instances
            .iter_mut()
            .find(|i| &i.id == id)
            .map(|instance| {
                instance.book = data.book.clone();
                instance.imprint = data.imprint.clone();
                instance.status = data.status;
                instance.due_back = data.due_back;
                instance.clone()
            }))
    }

    async fn book_instance_delete(&self, id: &RecordId) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.book_instances.len();
        tables.book_instances.retain(|i| &i.id != id);
        Ok(tables.book_instances.len() != before)
    }
}
