//! Demo data for an empty store.

use crate::security::password::hash_password;
use crate::storage::models::{NewBook, NewUser, Role};
use crate::storage::{BookStore, StoreError, StoreResult};

pub const DEMO_USERNAME: &str = "demo-seller";
pub const DEMO_PASSWORD: &str = "correct-password";

/// Seed a demo seller and three listings when no users exist yet.
///
/// Returns `true` if anything was written.
pub async fn seed_demo_data(store: &dyn BookStore) -> StoreResult<bool> {
    if store.count_users().await? > 0 {
        return Ok(false);
    }

    let password_hash = hash_password(DEMO_PASSWORD)
        .map_err(|e| StoreError::Unavailable(format!("cannot hash demo password: {}", e)))?;
    let seller = store
        .create_user(NewUser {
            username: DEMO_USERNAME.to_string(),
            email: "seller@bookswap.example".to_string(),
            password_hash,
            role: Role::Seller,
        })
        .await?;

    let listings = [
        ("The Pragmatic Programmer", "Hunt & Thomas", 300.0, 100.0, 10.0),
        ("Dune", "Frank Herbert", 150.0, 20.0, 5.0),
        ("Clean Architecture", "Robert C. Martin", 80.0, 10.0, 1.0),
    ];
    for (title, author, price, starting_bid, bid_increment) in listings {
        store
            .create_book(NewBook {
                title: title.to_string(),
                author: author.to_string(),
                price,
                starting_bid,
                bid_increment,
                description: None,
                cover_image: None,
                owner_id: Some(seller.id),
            })
            .await?;
    }

    tracing::info!(books = listings.len(), seller = %seller.username, "Seeded demo data");
    Ok(true)
}
