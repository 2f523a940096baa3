//! Route definitions for the `/predict` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::predict;
use crate::state::AppState;

/// ```text
/// POST /predict  -> generate_profile (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/predict", post(predict::generate_profile))
}
