//! Bid placement.
//!
//! One call is one atomic accept-or-reject: look up the book, wait out the
//! flow's processing delay, validate, then commit with a compare-and-swap on
//! the `current_bid` that was read. Every call is timed into the bid latency
//! histogram, whatever its outcome.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time;

use crate::auction::rules::{validate_bid, BidRejection};
use crate::config::BiddingConfig;
use crate::observability::MetricsRegistry;
use crate::storage::{Book, BookStore, StoreError};

#[derive(Debug, Error)]
pub enum BidError {
    #[error("book {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Rejected(#[from] BidRejection),

    /// Another bid was committed after this one read the book. Retryable.
    #[error("book {book_id} received a concurrent bid, retry against the new state")]
    Conflict { book_id: i64 },

    #[error("storage failure: {message}")]
    Storage { message: String, is_timeout: bool },
}

pub struct AuctionBidEngine {
    store: Arc<dyn BookStore>,
    metrics: Arc<MetricsRegistry>,
    bidding: BiddingConfig,
    storage_timeout: Duration,
}

impl AuctionBidEngine {
    pub fn new(
        store: Arc<dyn BookStore>,
        metrics: Arc<MetricsRegistry>,
        bidding: BiddingConfig,
        storage_timeout: Duration,
    ) -> Self {
        Self {
            store,
            metrics,
            bidding,
            storage_timeout,
        }
    }

    /// Validate and commit a bid, returning the updated book.
    pub async fn place_bid(&self, book_id: i64, amount: f64) -> Result<Book, BidError> {
        let _timer = self.metrics.time_bid();
        tracing::info!(
            book_id,
            amount,
            "Received bid for book_id {} with amount {}",
            book_id,
            amount
        );

        let book = self
            .bounded(book_id, "load", self.store.get_book(book_id))
            .await?
            .ok_or(BidError::NotFound(book_id))?;

        self.simulate_processing().await;

        if let Err(rejection) = validate_bid(&book, amount) {
            tracing::info!(book_id, amount, reason = rejection.code(), "Bid rejected: {}", rejection);
            return Err(rejection.into());
        }

        tracing::info!("Connecting to database to save bid...");
        let updated = self
            .bounded(book_id, "save", self.store.save_bid(book_id, book.current_bid, amount))
            .await?;
        tracing::info!(book_id, current_bid = updated.current_bid, "Successfully saved bid to database.");

        Ok(updated)
    }

    async fn simulate_processing(&self) {
        let delay_ms = if self.bidding.one_click_enabled {
            tracing::info!("Processing with 'One-Click Bid' flow (Feature ON)");
            self.bidding.fast_path_delay_ms
        } else {
            tracing::info!("Processing with 'Traditional Bid' flow (Feature OFF)");
            self.bidding.standard_delay_ms
        };

        if delay_ms > 0 {
            time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    /// Run a storage call under the configured timeout and map its errors.
    async fn bounded<T, F>(&self, book_id: i64, operation: &'static str, call: F) -> Result<T, BidError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match time::timeout(self.storage_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(StoreError::BookNotFound(id))) => Err(BidError::NotFound(id)),
            Ok(Err(StoreError::Conflict { expected, actual, .. })) => {
                tracing::warn!(
                    book_id,
                    expected,
                    actual,
                    "Bid lost a race with a concurrent bid"
                );
                Err(BidError::Conflict { book_id })
            }
            Ok(Err(e)) => {
                tracing::error!(
                    book_id,
                    operation,
                    error = %e,
                    is_timeout = false,
                    "Failed to {} bid for book_id {}",
                    operation,
                    book_id
                );
                Err(BidError::Storage {
                    message: e.to_string(),
                    is_timeout: false,
                })
            }
            Err(_) => {
                tracing::error!(
                    book_id,
                    operation,
                    timeout_ms = self.storage_timeout.as_millis() as u64,
                    is_timeout = true,
                    "Failed to {} bid for book_id {}",
                    operation,
                    book_id
                );
                Err(BidError::Storage {
                    message: format!("storage {} timed out", operation),
                    is_timeout: true,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::metrics::sample_value;
    use crate::storage::{MemoryStore, NewBook, NewUser, StoreResult, User};
    use async_trait::async_trait;

    const COUNT: &str = "bookswap_bid_latency_seconds_count";

    fn no_delay() -> BiddingConfig {
        BiddingConfig {
            one_click_enabled: true,
            fast_path_delay_ms: 0,
            standard_delay_ms: 0,
        }
    }

    async fn setup(bidding: BiddingConfig) -> (AuctionBidEngine, Arc<MemoryStore>, Arc<MetricsRegistry>, i64) {
        let store = Arc::new(MemoryStore::new(None));
        let book = store
            .create_book(NewBook {
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                price: 200.0,
                starting_bid: 50.0,
                bid_increment: 10.0,
                description: None,
                cover_image: None,
                owner_id: None,
            })
            .await
            .unwrap();
        let metrics = Arc::new(MetricsRegistry::new().unwrap());
        let engine = AuctionBidEngine::new(
            store.clone(),
            metrics.clone(),
            bidding,
            Duration::from_millis(500),
        );
        (engine, store, metrics, book.id)
    }

    fn observations(metrics: &MetricsRegistry) -> f64 {
        sample_value(&metrics.render(), COUNT).unwrap_or(0.0)
    }

    #[tokio::test]
    async fn test_bid_sequence() {
        let (engine, store, _, id) = setup(no_delay()).await;

        assert!(matches!(
            engine.place_bid(id, 49.0).await,
            Err(BidError::Rejected(BidRejection::BelowStartingBid { .. }))
        ));
        assert_eq!(engine.place_bid(id, 50.0).await.unwrap().current_bid, 50.0);
        assert!(matches!(
            engine.place_bid(id, 59.99).await,
            Err(BidError::Rejected(BidRejection::BelowMinIncrement { .. }))
        ));
        assert_eq!(engine.place_bid(id, 60.0).await.unwrap().current_bid, 60.0);
        assert!(matches!(
            engine.place_bid(id, 200.5).await,
            Err(BidError::Rejected(BidRejection::ExceedsCeiling { .. }))
        ));

        let stored = store.get_book(id).await.unwrap().unwrap();
        assert_eq!(stored.current_bid, 60.0);
    }

    #[tokio::test]
    async fn test_buy_now_bid_always_succeeds() {
        let (engine, store, _, id) = setup(no_delay()).await;
        store.save_bid(id, 0.0, 195.0).await.unwrap();

        let book = engine.place_bid(id, 200.0).await.unwrap();
        assert_eq!(book.current_bid, 200.0);
    }

    #[tokio::test]
    async fn test_unknown_book() {
        let (engine, _, metrics, _) = setup(no_delay()).await;
        assert!(matches!(engine.place_bid(404, 10.0).await, Err(BidError::NotFound(404))));
        assert_eq!(observations(&metrics), 1.0);
    }

    #[tokio::test]
    async fn test_every_outcome_is_observed_once() {
        let (engine, _, metrics, id) = setup(no_delay()).await;

        let _ = engine.place_bid(id, 75.0).await;
        assert_eq!(observations(&metrics), 1.0);
        let _ = engine.place_bid(id, 1.0).await;
        assert_eq!(observations(&metrics), 2.0);
        let _ = engine.place_bid(id, 9_999.0).await;
        assert_eq!(observations(&metrics), 3.0);
    }

    #[tokio::test]
    async fn test_concurrent_bids_one_commits() {
        // The processing delay makes both bids read current_bid = 100
        // before either writes.
        let bidding = BiddingConfig {
            one_click_enabled: true,
            fast_path_delay_ms: 20,
            standard_delay_ms: 0,
        };
        let (engine, store, _, id) = setup(bidding).await;
        store.save_bid(id, 0.0, 100.0).await.unwrap();

        let (a, b) = tokio::join!(engine.place_bid(id, 110.0), engine.place_bid(id, 115.0));

        let committed: Vec<f64> = [&a, &b]
            .into_iter()
            .filter_map(|r| match r {
                Ok(book) => Some(book.current_bid),
                Err(_) => None,
            })
            .collect();
        assert_eq!(committed.len(), 1);
        assert!(
            matches!(a, Err(BidError::Conflict { .. })) || matches!(b, Err(BidError::Conflict { .. }))
        );

        let stored = store.get_book(id).await.unwrap().unwrap();
        assert_eq!(stored.current_bid, committed[0]);
    }

    #[tokio::test]
    async fn test_standard_flow_is_slower() {
        let bidding = BiddingConfig {
            one_click_enabled: false,
            fast_path_delay_ms: 0,
            standard_delay_ms: 60,
        };
        let (engine, _, _, id) = setup(bidding).await;

        let start = std::time::Instant::now();
        engine.place_bid(id, 50.0).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    /// Store whose writes never complete.
    struct StalledStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl BookStore for StalledStore {
        async fn get_book(&self, id: i64) -> StoreResult<Option<Book>> {
            self.inner.get_book(id).await
        }
        async fn list_books(&self, skip: usize, limit: usize) -> StoreResult<Vec<Book>> {
            self.inner.list_books(skip, limit).await
        }
        async fn create_book(&self, book: NewBook) -> StoreResult<Book> {
            self.inner.create_book(book).await
        }
        async fn save_bid(&self, _: i64, _: f64, _: f64) -> StoreResult<Book> {
            std::future::pending().await
        }
        async fn count_users(&self) -> StoreResult<usize> {
            self.inner.count_users().await
        }
        async fn create_user(&self, user: NewUser) -> StoreResult<User> {
            self.inner.create_user(user).await
        }
        async fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
            self.inner.get_user(id).await
        }
        async fn find_user(&self, username: &str) -> StoreResult<Option<User>> {
            self.inner.find_user(username).await
        }
    }

    #[tokio::test]
    async fn test_stalled_storage_times_out() {
        let inner = MemoryStore::new(None);
        let book = inner
            .create_book(NewBook {
                title: "Slow".to_string(),
                author: "Anon".to_string(),
                price: 100.0,
                starting_bid: 10.0,
                bid_increment: 1.0,
                description: None,
                cover_image: None,
                owner_id: None,
            })
            .await
            .unwrap();
        let metrics = Arc::new(MetricsRegistry::new().unwrap());
        let engine = AuctionBidEngine::new(
            Arc::new(StalledStore { inner }),
            metrics.clone(),
            no_delay(),
            Duration::from_millis(30),
        );

        let err = engine.place_bid(book.id, 20.0).await.unwrap_err();
        assert!(matches!(err, BidError::Storage { is_timeout: true, .. }));
        assert_eq!(observations(&metrics), 1.0);
    }
}
