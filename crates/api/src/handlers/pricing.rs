//! Handler for the `/pricing` resource.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Hourly rates for the target day; missing hours serialize as `null`.
#[derive(Debug, Serialize)]
pub struct PricingResponse {
    pub hourly_rates: Vec<Option<f64>>,
}

/// GET /api/v1/pricing
///
/// Fetch the day-ahead hourly price curve. Requires a bearer token.
pub async fn fetch_pricing(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<PricingResponse>> {
    tracing::debug!(username = %user.username, "Pricing requested");
    let hourly_rates = state.price_source.hourly_rates().await?;
    Ok(Json(PricingResponse { hourly_rates }))
}
