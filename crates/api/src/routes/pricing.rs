//! Route definitions for the `/pricing` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::pricing;
use crate::state::AppState;

/// ```text
/// GET /pricing   -> fetch_pricing (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/pricing", get(pricing::fetch_pricing))
}
