//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → middleware/request_trace.rs (trace id, timing, dashboard counters)
//!     → handlers/ (bid, login, books, dashboard stats, metrics)
//!     → error.rs (structured error bodies)
//! ```

pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{AppState, HttpServer};
