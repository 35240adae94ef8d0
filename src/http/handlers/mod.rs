//! Route handlers.

pub mod auth;
pub mod bid;
pub mod books;
pub mod dashboard;
