//! Snapshot on exit.
//!
//! The store snapshot is written once the server future finishes, whether it
//! drained cleanly or failed.

use std::future::Future;
use std::io;

use thiserror::Error;

use crate::storage::{MemoryStore, StoreError};

#[derive(Debug, Error)]
pub enum ExitError {
    #[error("server error: {0}")]
    Serve(#[from] io::Error),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] StoreError),
}

/// Await `serve`, then save the store. A serve error is returned after the save.
pub async fn serve_then_persist<F>(serve: F, store: &MemoryStore) -> Result<(), ExitError>
where
    F: Future<Output = io::Result<()>>,
{
    let served = serve.await;
    if let Err(e) = &served {
        tracing::error!(error = %e, "HTTP server failed, saving snapshot before exit");
    }

    store.save_to_file()?;
    served?;
    Ok(())
}
