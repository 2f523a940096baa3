//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use chargeplan_api::auth::service::AuthError;
use chargeplan_api::error::AppError;
use chargeplan_api::pricing::PricingError;
use chargeplan_core::error::PipelineError;
use http_body_util::BodyExt;

/// Helper: convert an `AppError` into its status code, headers and parsed JSON body.
async fn error_to_response(
    err: AppError,
) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, headers, json)
}

#[tokio::test]
async fn invalid_credentials_returns_401_with_challenge() {
    let (status, headers, json) =
        error_to_response(AppError::Auth(AuthError::InvalidCredentials)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers["www-authenticate"], "Bearer");
    assert_eq!(json["code"], "INVALID_CREDENTIALS");
    assert_eq!(json["error"], "Incorrect username or password");
}

#[tokio::test]
async fn invalid_token_returns_401() {
    let (status, _, json) = error_to_response(AppError::Auth(AuthError::InvalidToken)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn signing_failure_is_sanitized_500() {
    let (status, headers, json) =
        error_to_response(AppError::Auth(AuthError::Signing("key rejected".into()))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(headers.get("www-authenticate").is_none());
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn invalid_request_returns_422() {
    let err = PipelineError::InvalidRequest("hourly_rates must contain 24 values, got 3".into());
    let (status, _, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "INVALID_REQUEST");
    assert_eq!(json["error"], "hourly_rates must contain 24 values, got 3");
}

#[tokio::test]
async fn shape_mismatch_returns_500() {
    let err = PipelineError::ShapeMismatch {
        stage: "profile scaler",
        expected: 24,
        actual: 12,
    };
    let (status, _, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "SHAPE_MISMATCH");
}

#[tokio::test]
async fn model_invocation_returns_500() {
    let err = PipelineError::ModelInvocation("model output 'dense' not found".into());
    let (status, _, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "MODEL_INVOCATION_ERROR");
}

#[tokio::test]
async fn degenerate_profile_returns_500() {
    let err = PipelineError::DegenerateProfile("profile sums to zero".into());
    let (status, _, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "DEGENERATE_PROFILE");
}

#[tokio::test]
async fn pricing_failure_returns_502() {
    let err = PricingError::Upstream {
        status: 404,
        url: "http://prices.invalid/x.csv".into(),
    };
    let (status, _, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "PRICING_UNAVAILABLE");
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("secret model path leaked".into());
    let (status, _, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}
