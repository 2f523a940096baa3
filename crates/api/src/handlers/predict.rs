//! Handler for the `/predict` resource.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chargeplan_core::types::PredictionRequest;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /predict`.
///
/// `null` hourly rates (as returned by the pricing endpoint for missing
/// hours) are accepted here and rejected by pipeline validation with a
/// message naming the hour.
#[derive(Debug, Deserialize)]
pub struct PredictBody {
    pub hourly_rates: Vec<Option<f64>>,
    pub total_energy: f64,
    pub curtailment_limit: f64,
}

impl From<PredictBody> for PredictionRequest {
    fn from(body: PredictBody) -> Self {
        Self {
            hourly_rates: body
                .hourly_rates
                .into_iter()
                .map(|r| r.unwrap_or(f64::NAN))
                .collect(),
            total_energy: body.total_energy,
            curtailment_limit: body.curtailment_limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub generated_profile: Vec<f64>,
}

/// POST /api/v1/predict
///
/// Generate an energy-conserving charging profile. Requires a bearer token.
pub async fn generate_profile(
    user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<PredictBody>,
) -> AppResult<Json<PredictResponse>> {
    let request = PredictionRequest::from(body);
    tracing::debug!(username = %user.username, total_energy = request.total_energy, "Profile requested");

    let pipeline = Arc::clone(&state.pipeline);
    let adjusted = tokio::task::spawn_blocking(move || pipeline.generate_profile(&request))
        .await
        .map_err(|e| AppError::InternalError(format!("Inference task failed: {e}")))??;

    Ok(Json(PredictResponse {
        generated_profile: adjusted.values,
    }))
}
