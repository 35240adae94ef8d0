//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     broadcast → HTTP server drains → sampler exits
//!
//! Persist (persist.rs):
//!     server future done (ok or error) → snapshot saved → error surfaced
//! ```

pub mod persist;
pub mod shutdown;
pub mod signals;

pub use persist::{serve_then_persist, ExitError};
pub use shutdown::Shutdown;
pub use signals::{spawn_signal_handler, wait_for_signal};
