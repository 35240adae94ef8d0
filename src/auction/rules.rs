//! Bid validation rules.
//!
//! Checked in this order, the first failure wins:
//! 1. A bid may never exceed the buy-now `price`.
//! 2. With no bid yet, the bid must reach `starting_bid`.
//! 3. Otherwise it must reach `current_bid + bid_increment`, unless it is
//!    exactly `price` (buying outright skips the increment rule).

use thiserror::Error;

use crate::storage::Book;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BidRejection {
    #[error("bid of {amount} exceeds the buy-now price of {price}")]
    ExceedsCeiling { amount: f64, price: f64 },

    #[error("first bid of {amount} is below the starting bid of {starting_bid}")]
    BelowStartingBid { amount: f64, starting_bid: f64 },

    #[error("bid of {amount} is below the minimum next bid of {min_next}")]
    BelowMinIncrement { amount: f64, min_next: f64 },
}

impl BidRejection {
    /// Stable code returned to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            BidRejection::ExceedsCeiling { .. } => "BID_EXCEEDS_CEILING",
            BidRejection::BelowStartingBid { .. } => "BELOW_STARTING_BID",
            BidRejection::BelowMinIncrement { .. } => "BELOW_MIN_INCREMENT",
        }
    }
}

pub fn validate_bid(book: &Book, amount: f64) -> Result<(), BidRejection> {
    if amount > book.price {
        return Err(BidRejection::ExceedsCeiling {
            amount,
            price: book.price,
        });
    }

    if !book.has_bids() {
        if amount < book.starting_bid {
            return Err(BidRejection::BelowStartingBid {
                amount,
                starting_bid: book.starting_bid,
            });
        }
        return Ok(());
    }

    let min_next = book.current_bid + book.bid_increment;
    if amount < min_next && amount != book.price {
        return Err(BidRejection::BelowMinIncrement { amount, min_next });
    }

    Ok(())
}
