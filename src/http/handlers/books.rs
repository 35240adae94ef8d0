//! Book catalogue endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::http::server::AppState;
use crate::storage::{Book, NewBook, Role};

const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_PAGE_SIZE
}

pub async fn list_books(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Book>>, AppError> {
    let books = state.store.list_books(page.skip, page.limit).await?;
    Ok(Json(books))
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Book>, AppError> {
    state
        .store
        .get_book(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
}

pub async fn create_book(
    State(state): State<AppState>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let Json(listing) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    listing.validate().map_err(AppError::InvalidRequest)?;

    if let Some(owner_id) = listing.owner_id {
        let owner = state
            .store
            .get_user(owner_id)
            .await?
            .ok_or_else(|| AppError::InvalidRequest(format!("owner {} does not exist", owner_id)))?;
        if owner.role != Role::Seller {
            tracing::warn!(owner_id, "Listing rejected: owner is not a seller");
            return Err(AppError::Forbidden("only sellers can list books".to_string()));
        }
    }

    let book = state.store.create_book(listing).await?;
    tracing::info!(book_id = book.id, title = %book.title, "Listed new book");
    Ok((StatusCode::CREATED, Json(book)))
}
