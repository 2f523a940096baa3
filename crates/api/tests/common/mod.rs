#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chargeplan_core::pricing::HourlyRates;
use chargeplan_core::scaler::{LinearScaler, ScalerSet};
use chargeplan_pipeline::config::{ModelBackend, ModelConfig};
use chargeplan_pipeline::model::{Activation, DenseModel};
use chargeplan_pipeline::InferencePipeline;
use http_body_util::BodyExt;
use ndarray::{Array1, Array2};
use tower::ServiceExt;

use chargeplan_api::auth::credentials::{CredentialRecord, InMemoryCredentialStore};
use chargeplan_api::auth::jwt::JwtConfig;
use chargeplan_api::auth::password::hash_password;
use chargeplan_api::auth::service::TokenService;
use chargeplan_api::config::ServerConfig;
use chargeplan_api::pricing::{PriceSource, PricingConfig, PricingError};
use chargeplan_api::router::build_app_router;
use chargeplan_api::state::AppState;

pub const TEST_USER: &str = "testuser";
pub const TEST_PASSWORD: &str = "testpassword";
pub const TEST_SECRET: &str = "integration-test-secret-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
///
/// Artifact paths are placeholders; the test app builds its pipeline and
/// credential store in memory.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expiry_mins: 30,
        },
        credentials_file: PathBuf::from("unused.json"),
        model: ModelConfig {
            dir: PathBuf::from("unused"),
            backend: ModelBackend::Dense,
            output_key: "dense".to_string(),
        },
        pricing: PricingConfig::default(),
    }
}

/// Argon2 hash of [`TEST_PASSWORD`], computed once per test binary.
fn test_password_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(TEST_PASSWORD).expect("hashing should succeed"))
}

/// A 26-feature, 24-slot dense model with small positive weights so every
/// generated profile has a positive sum.
pub fn test_pipeline() -> InferencePipeline {
    let scalers = ScalerSet {
        hourly_rates: LinearScaler::new("hourly_rates scaler", vec![50.0; 24], vec![25.0; 24])
            .unwrap(),
        total_energy: LinearScaler::new("total_energy scaler", vec![100.0], vec![50.0]).unwrap(),
        curtailment: LinearScaler::new("curtailment scaler", vec![50.0], vec![25.0]).unwrap(),
        profile: LinearScaler::new("profile scaler", vec![5.0; 24], vec![2.0; 24]).unwrap(),
    };
    let weights = Array2::from_shape_fn((24, 26), |(i, j)| 0.01 * ((i + j) % 5) as f32);
    let model = DenseModel::new(
        "dense",
        Activation::Sigmoid,
        weights,
        Array1::from_elem(24, 0.1),
    )
    .unwrap();
    InferencePipeline::new(scalers, Arc::new(model), "dense").unwrap()
}

/// Price source returning a fixed curve.
pub struct StubPriceSource(pub HourlyRates);

#[async_trait]
impl PriceSource for StubPriceSource {
    async fn hourly_rates(&self) -> Result<HourlyRates, PricingError> {
        Ok(self.0.clone())
    }
}

/// Price source whose upstream always answers 503.
pub struct UnavailablePriceSource;

#[async_trait]
impl PriceSource for UnavailablePriceSource {
    async fn hourly_rates(&self) -> Result<HourlyRates, PricingError> {
        Err(PricingError::Upstream {
            status: 503,
            url: "http://prices.invalid/20240115damlbmp_zone.csv".to_string(),
        })
    }
}

/// A curve with 22 known hours and the last two missing.
pub fn partial_curve() -> HourlyRates {
    (0..24)
        .map(|h| (h < 22).then(|| 30.0 + h as f64))
        .collect()
}

/// Build the full application router with all middleware layers.
///
/// Uses the same router builder as `main.rs` so integration tests exercise
/// the production middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery).
pub fn build_test_app() -> Router {
    build_test_app_with(Arc::new(StubPriceSource(partial_curve())))
}

pub fn build_test_app_with(price_source: Arc<dyn PriceSource>) -> Router {
    let config = test_config();
    let store = InMemoryCredentialStore::from_records([CredentialRecord {
        username: TEST_USER.to_string(),
        password_hash: test_password_hash().to_string(),
    }])
    .unwrap();

    let state = AppState {
        token_service: Arc::new(TokenService::new(config.jwt.clone(), Arc::new(store))),
        pipeline: Arc::new(test_pipeline()),
        price_source,
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_form(app: Router, uri: &str, form: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Request a token for the test user and return the access token string.
pub async fn login(app: Router) -> String {
    let form = format!("username={TEST_USER}&password={TEST_PASSWORD}");
    let response = post_form(app, "/api/v1/token", &form).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["access_token"].as_str().unwrap().to_string()
}
