//! Concurrency tests: request counting and racing bids.

use bookswap::storage::{BookStore, NewBook};
use reqwest::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn test_concurrent_requests_are_all_counted() {
    let app = common::spawn_app(|_| {}).await;

    let requests: Vec<_> = (0..40)
        .map(|i| {
            let client = app.client.clone();
            let url = if i % 2 == 0 {
                app.url("/health")
            } else {
                app.url("/api/books")
            };
            tokio::spawn(async move { client.get(url).send().await.unwrap().status() })
        })
        .collect();

    for request in requests {
        assert_eq!(request.await.unwrap(), StatusCode::OK);
    }

    let snapshot = app.dashboard.snapshot();
    assert_eq!(snapshot.total_requests, 40);
    assert_eq!(snapshot.total_errors, 0);

    app.stop().await;
}

#[tokio::test]
async fn test_racing_bids_commit_exactly_once() {
    // Both bids read the book before either commits.
    let app = common::spawn_app(|config| {
        config.bidding.fast_path_delay_ms = 100;
        config.storage.seed_demo_data = false;
    })
    .await;

    let book = app
        .store
        .create_book(NewBook {
            title: "Neuromancer".to_string(),
            author: "William Gibson".to_string(),
            price: 200.0,
            starting_bid: 50.0,
            bid_increment: 10.0,
            description: None,
            cover_image: None,
            owner_id: None,
        })
        .await
        .unwrap();
    app.store.save_bid(book.id, 0.0, 100.0).await.unwrap();

    let place = |amount: f64| {
        let client = app.client.clone();
        let url = app.url("/bid");
        let body = json!({ "book_id": book.id, "amount": amount });
        async move { client.post(url).json(&body).send().await.unwrap() }
    };
    let (a, b) = tokio::join!(place(110.0), place(115.0));

    let statuses = [a.status(), b.status()];
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 1);
    assert!(statuses.contains(&StatusCode::CONFLICT));

    let winner = if a.status() == StatusCode::OK { a } else { b };
    let body: serde_json::Value = winner.json().await.unwrap();
    let stored = app.store.get_book(book.id).await.unwrap().unwrap();
    assert_eq!(body["current_bid"], stored.current_bid);

    app.stop().await;
}

#[tokio::test]
async fn test_shutdown_drains_server() {
    let app = common::spawn_app(|_| {}).await;
    let addr = app.addr;
    app.stop().await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    assert!(client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .is_err());
}
