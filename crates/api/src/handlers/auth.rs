//! Handler for the `/token` resource.

use std::sync::Arc;

use axum::extract::State;
use axum::{Form, Json};
use serde::Deserialize;

use crate::auth::service::IssuedToken;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Form body for `POST /token` (OAuth2 password grant fields; extra fields
/// such as `grant_type` and `scope` are ignored).
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/v1/token
///
/// Authenticate with username + password. Returns a bearer access token.
pub async fn issue_token(
    State(state): State<AppState>,
    Form(input): Form<TokenRequest>,
) -> AppResult<Json<IssuedToken>> {
    // Argon2 verification is CPU-bound.
    let service = Arc::clone(&state.token_service);
    let issued = tokio::task::spawn_blocking(move || {
        service.issue_token(&input.username, &input.password)
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Token task failed: {e}")))??;

    Ok(Json(issued))
}
