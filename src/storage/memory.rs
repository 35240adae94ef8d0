//! In-memory book/user store with JSON snapshot persistence.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::storage::models::{Book, NewBook, NewUser, User};
use crate::storage::{BookStore, StoreError, StoreResult};

/// On-disk snapshot layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    books: Vec<Book>,
    users: Vec<User>,
}

/// A thread-safe store backed by concurrent maps.
#[derive(Clone, Default)]
pub struct MemoryStore {
    books: Arc<DashMap<i64, Book>>,
    users: Arc<DashMap<i64, User>>,
    next_book_id: Arc<AtomicI64>,
    next_user_id: Arc<AtomicI64>,
    persistence_path: Option<String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new(persistence_path: Option<String>) -> Self {
        Self {
            books: Arc::new(DashMap::new()),
            users: Arc::new(DashMap::new()),
            next_book_id: Arc::new(AtomicI64::new(1)),
            next_user_id: Arc::new(AtomicI64::new(1)),
            persistence_path,
        }
    }

    /// Load from file if it exists, otherwise start empty.
    pub fn load_from_file(path: &str) -> StoreResult<Self> {
        let store = Self::new(Some(path.to_string()));
        if Path::new(path).exists() {
            let reader = BufReader::new(File::open(path)?);
            let snapshot: Snapshot = serde_json::from_reader(reader)?;

            for book in snapshot.books {
                store.bump_id(&store.next_book_id, book.id);
                store.books.insert(book.id, book);
            }
            for user in snapshot.users {
                store.bump_id(&store.next_user_id, user.id);
                store.users.insert(user.id, user);
            }
            tracing::info!(
                books = store.books.len(),
                users = store.users.len(),
                path,
                "Loaded store snapshot"
            );
        }
        Ok(store)
    }

    /// Save to file, if a path was configured.
    pub fn save_to_file(&self) -> StoreResult<()> {
        if let Some(path) = &self.persistence_path {
            let mut snapshot = Snapshot {
                books: self.books.iter().map(|r| r.value().clone()).collect(),
                users: self.users.iter().map(|r| r.value().clone()).collect(),
            };
            snapshot.books.sort_by_key(|b| b.id);
            snapshot.users.sort_by_key(|u| u.id);

            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &snapshot)?;
            tracing::info!(books = snapshot.books.len(), users = snapshot.users.len(), path = %path, "Saved store snapshot");
        }
        Ok(())
    }

    fn bump_id(&self, counter: &AtomicI64, seen: i64) {
        counter.fetch_max(seen + 1, Ordering::Relaxed);
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn get_book(&self, id: i64) -> StoreResult<Option<Book>> {
        Ok(self.books.get(&id).map(|r| r.value().clone()))
    }

    async fn list_books(&self, skip: usize, limit: usize) -> StoreResult<Vec<Book>> {
        let mut books: Vec<Book> = self.books.iter().map(|r| r.value().clone()).collect();
        books.sort_by_key(|b| b.id);
        Ok(books.into_iter().skip(skip).take(limit).collect())
    }

    async fn create_book(&self, book: NewBook) -> StoreResult<Book> {
        let id = self.next_book_id.fetch_add(1, Ordering::Relaxed);
        let book = book.into_book(id);
        self.books.insert(id, book.clone());
        Ok(book)
    }

    async fn save_bid(&self, book_id: i64, expected_current: f64, amount: f64) -> StoreResult<Book> {
        // The entry guard holds the shard lock for the whole compare-and-set.
        let mut entry = self
            .books
            .get_mut(&book_id)
            .ok_or(StoreError::BookNotFound(book_id))?;

        if entry.current_bid.to_bits() != expected_current.to_bits() {
            return Err(StoreError::Conflict {
                book_id,
                expected: expected_current,
                actual: entry.current_bid,
            });
        }

        entry.current_bid = amount;
        Ok(entry.clone())
    }

    async fn count_users(&self) -> StoreResult<usize> {
        Ok(self.users.len())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        if self.users.iter().any(|r| r.value().username == user.username) {
            return Err(StoreError::DuplicateUser(user.username));
        }

        let id = self.next_user_id.fetch_add(1, Ordering::Relaxed);
        let user = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
        };
        self.users.insert(id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.users.get(&id).map(|r| r.value().clone()))
    }

    async fn find_user(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|r| r.value().username == username)
            .map(|r| r.value().clone()))
    }
}
