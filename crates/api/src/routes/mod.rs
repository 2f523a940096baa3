pub mod auth;
pub mod health;
pub mod predict;
pub mod pricing;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /token                                           issue bearer token (public)
/// /predict                                         generate profile (requires auth)
/// /pricing                                         day-ahead hourly rates (requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(predict::router())
        .merge(pricing::router())
}
