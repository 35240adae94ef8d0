//! BookSwap backend library.
//!
//! Request tracing, live dashboard state, auction bidding and host health
//! sampling behind an Axum HTTP API.

pub mod auction;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod storage;

pub use config::AppConfig;
pub use error::AppError;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
