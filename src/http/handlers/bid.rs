//! `POST /bid`.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct BidRequest {
    pub book_id: i64,
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct BidResponse {
    pub message: String,
    pub current_bid: f64,
}

pub async fn place_bid(
    State(state): State<AppState>,
    payload: Result<Json<BidRequest>, JsonRejection>,
) -> Result<Json<BidResponse>, AppError> {
    let Json(bid) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    let book = state.engine.place_bid(bid.book_id, bid.amount).await?;

    Ok(Json(BidResponse {
        message: format!(
            "Bid for book {} of ${} placed successfully.",
            bid.book_id, bid.amount
        ),
        current_bid: book.current_bid,
    }))
}
