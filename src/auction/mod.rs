//! Auction bidding.
//!
//! # Data Flow
//! ```text
//! POST /bid
//!     → engine.rs (lookup, processing delay, commit)
//!     → rules.rs (ceiling, starting bid, increment)
//!     → storage (compare-and-swap on current_bid)
//! ```
//!
//! # Design Decisions
//! - No pending or cancelled states: a bid is accepted or rejected in one call
//! - Stale reads are rejected as conflicts, never retried internally

pub mod engine;
pub mod rules;

pub use engine::{AuctionBidEngine, BidError};
pub use rules::{validate_bid, BidRejection};
