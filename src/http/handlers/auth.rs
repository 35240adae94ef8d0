//! `POST /login`.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::http::server::AppState;
use crate::observability::metrics::INVALID_PASSWORD;
use crate::security::password::{verify_password, PasswordError};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(credentials) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    // Unknown users go through the same failure path as a wrong password.
    let stored_hash = state
        .store
        .find_user(&credentials.username)
        .await?
        .map(|user| user.password_hash);

    let verified = match stored_hash {
        Some(hash) => {
            let password = credentials.password;
            tokio::task::spawn_blocking(move || verify_password(&password, &hash))
                .await
                .map_err(|e| AppError::Internal(format!("password check failed: {}", e)))?
        }
        None => Err(PasswordError::Mismatch),
    };

    match verified {
        Ok(()) => {
            tracing::info!(username = %credentials.username, "Successful login");
            Ok(Json(LoginResponse {
                message: "Login successful".to_string(),
            }))
        }
        Err(PasswordError::InvalidHashFormat) => {
            tracing::error!(username = %credentials.username, "Stored password hash is unreadable");
            Err(AppError::Internal("stored credentials are corrupt".to_string()))
        }
        Err(_) => {
            state.metrics.increment_login_error(INVALID_PASSWORD);
            tracing::warn!(reason = "Invalid password", "Failed login attempt");
            Err(AppError::Unauthorized("Invalid credentials".to_string()))
        }
    }
}
