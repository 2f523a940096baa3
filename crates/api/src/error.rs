use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chargeplan_core::error::PipelineError;
use serde_json::json;

use crate::auth::service::AuthError;
use crate::pricing::PricingError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain errors of each component and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Authentication or token validation failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A failure inside the inference pipeline.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The upstream price source failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- Auth ---
            AppError::Auth(auth) => match auth {
                AuthError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_CREDENTIALS",
                    auth.to_string(),
                ),
                AuthError::InvalidToken => {
                    (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", auth.to_string())
                }
                AuthError::Signing(msg) => {
                    tracing::error!(error = %msg, "Token signing failed");
                    internal()
                }
            },

            // --- Pipeline ---
            AppError::Pipeline(err) => match err {
                PipelineError::InvalidRequest(msg) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "INVALID_REQUEST",
                    msg.clone(),
                ),
                PipelineError::ShapeMismatch { .. } => {
                    tracing::error!(error = %err, "Model artifacts are inconsistent");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "SHAPE_MISMATCH",
                        err.to_string(),
                    )
                }
                PipelineError::ModelInvocation(_) => {
                    tracing::error!(error = %err, "Model invocation failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "MODEL_INVOCATION_ERROR",
                        err.to_string(),
                    )
                }
                PipelineError::DegenerateProfile(_) => {
                    tracing::warn!(error = %err, "Model produced a degenerate profile");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "DEGENERATE_PROFILE",
                        err.to_string(),
                    )
                }
            },

            // --- Pricing ---
            AppError::Pricing(err) => {
                tracing::error!(error = %err, "Price source failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "PRICING_UNAVAILABLE",
                    "Day-ahead prices are currently unavailable".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        let mut response = (status, axum::Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
