use std::sync::Arc;

use chargeplan_pipeline::InferencePipeline;

use crate::auth::service::TokenService;
use crate::pricing::PriceSource;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Everything is loaded once at startup and only read afterwards, so the
/// state is cheaply cloneable and needs no locking.
#[derive(Clone)]
pub struct AppState {
    /// Bearer token issuance and validation.
    pub token_service: Arc<TokenService>,
    /// Loaded scalers and frozen model.
    pub pipeline: Arc<InferencePipeline>,
    /// Day-ahead hourly price source.
    pub price_source: Arc<dyn PriceSource>,
}
