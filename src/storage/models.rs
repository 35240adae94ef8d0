//! Book and user records.

use serde::{Deserialize, Serialize};

/// A listed book and its auction state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Fixed buy-now price. No bid may exceed it.
    pub price: f64,
    /// Highest accepted bid; `0.0` means no bid yet.
    #[serde(default)]
    pub current_bid: f64,
    /// Floor for the first bid.
    #[serde(default)]
    pub starting_bid: f64,
    /// Minimum step above `current_bid` for later bids.
    #[serde(default = "default_bid_increment")]
    pub bid_increment: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub owner_id: Option<i64>,
}

impl Book {
    pub fn has_bids(&self) -> bool {
        self.current_bid != 0.0
    }
}

fn default_bid_increment() -> f64 {
    1.0
}

/// Fields accepted when listing a new book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub price: f64,
    #[serde(default)]
    pub starting_bid: f64,
    #[serde(default = "default_bid_increment")]
    pub bid_increment: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub owner_id: Option<i64>,
}

impl NewBook {
    /// Check the auction parameters; returns a human-readable reason.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err("price must be a positive number".to_string());
        }
        if !self.starting_bid.is_finite() || self.starting_bid < 0.0 {
            return Err("starting_bid must not be negative".to_string());
        }
        if !self.bid_increment.is_finite() || self.bid_increment <= 0.0 {
            return Err("bid_increment must be a positive number".to_string());
        }
        if self.starting_bid > self.price {
            return Err("starting_bid must not exceed price".to_string());
        }
        Ok(())
    }

    pub(crate) fn into_book(self, id: i64) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            price: self.price,
            current_bid: 0.0,
            starting_bid: self.starting_bid,
            bid_increment: self.bid_increment,
            description: self.description,
            cover_image: self.cover_image,
            owner_id: self.owner_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Buyer,
    Seller,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string, never the plain password.
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}
