//! Book and user storage.
//!
//! # Data Flow
//! ```text
//! HTTP handlers / auction engine
//!     → BookStore trait (narrow load/save interface)
//!     → memory.rs (concurrent map, JSON snapshot on disk)
//! ```
//!
//! # Design Decisions
//! - `save_bid` is a compare-and-swap keyed on the previously read
//!   `current_bid`; a stale read surfaces as `StoreError::Conflict`
//! - The trait is async so a remote store can slot in; callers bound
//!   every call with a timeout

pub mod memory;
pub mod models;
pub mod seed;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use models::{Book, NewBook, NewUser, Role, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("book {0} not found")]
    BookNotFound(i64),

    /// `current_bid` changed between read and write.
    #[error("book {book_id}: expected current bid {expected}, found {actual}")]
    Conflict {
        book_id: i64,
        expected: f64,
        actual: f64,
    },

    #[error("username '{0}' is already taken")]
    DuplicateUser(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence collaborator for books and users.
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn get_book(&self, id: i64) -> StoreResult<Option<Book>>;

    /// Books ordered by id.
    async fn list_books(&self, skip: usize, limit: usize) -> StoreResult<Vec<Book>>;

    async fn create_book(&self, book: NewBook) -> StoreResult<Book>;

    /// Set `current_bid = amount` only if it still equals `expected_current`.
    async fn save_bid(&self, book_id: i64, expected_current: f64, amount: f64) -> StoreResult<Book>;

    async fn count_users(&self) -> StoreResult<usize>;

    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn get_user(&self, id: i64) -> StoreResult<Option<User>>;

    async fn find_user(&self, username: &str) -> StoreResult<Option<User>>;
}
