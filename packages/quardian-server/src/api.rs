//! HTTP handlers.
//!
//! - `GET  /`  Service banner
//! - `GET  /metrics`  Prometheus text exposition
//! - `POST /api/encrypt`  AES-GCM encrypt under a fresh key
//! - `POST /api/decrypt`  Authenticate and decrypt
//! - `POST /api/sign`  Ed25519 sign under a fresh keypair
//! - `POST /api/verify`  Check a detached signature
//! - `GET  /api/stats`  Job counts from the store
//! - `GET  /api/system`  Host load and memory
//! - `GET  /api/latency`  p95 of encrypt/decrypt latency
//!
//! Request bodies are validated here before the core is called. Service
//! calls run on the blocking pool because the job sink may touch disk. Every
//! failure is answered with `{ "ok": false, "error": "..." }`, plus a numeric
//! `code` when the core raised it.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use quardian_core::{CryptoService, DecryptionInput, EncryptionResult, SignatureResult};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinError;

use crate::exporter::CONTENT_TYPE;
use crate::state::AppState;
use crate::system::SystemSnapshot;

// ── Response Types ───────────────────────────────────────────────────────────

/// Successful response: `ok`, an optional message, and the flattened payload.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(flatten)]
    pub data: T,
}

fn ok<T: Serialize>(message: Option<&'static str>, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        ok: true,
        message,
        data,
    })
}

#[derive(Serialize)]
struct ErrorBody {
    ok: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<i32>,
}

// ── Errors ───────────────────────────────────────────────────────────────────

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required field is missing or empty
    #[error("{0}")]
    Validation(&'static str),

    /// The body is not acceptable JSON
    #[error(transparent)]
    Body(#[from] JsonRejection),

    #[error(transparent)]
    Core(#[from] quardian_core::Error),

    /// Host statistics could not be read
    #[error("Failed to read system metrics: {0}")]
    System(String),

    /// The blocking task running a service call panicked or was cancelled
    #[error("Service task failed: {0}")]
    Task(#[from] JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Body(rejection) => rejection.status(),
            ApiError::Core(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Core(_) | ApiError::System(_) | ApiError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Core error code, if the core raised this error
    pub fn code(&self) -> Option<i32> {
        match self {
            ApiError::Core(e) => Some(e.code()),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let error = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
            self.to_string()
        };

        (status, Json(ErrorBody { ok: false, error, code })).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn require(value: &str, message: &'static str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::Validation(message));
    }
    Ok(())
}

/// Run `op` against the service on the blocking pool.
async fn run_blocking<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&CryptoService) -> quardian_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let service = state.service.clone();
    let result = tokio::task::spawn_blocking(move || op(&service)).await?;
    Ok(result?)
}

// ── Request Types ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EncryptRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub algorithm: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DecryptRequest {
    #[serde(default)]
    pub ciphertext: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub iv: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub algorithm: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub signature: String,
}

// ── Response Payloads ────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptPayload {
    pub plain_text: String,
}

#[derive(Serialize)]
pub struct VerifyPayload {
    pub valid: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsPayload {
    pub encrypts: u64,
    pub decrypts: u64,
    pub signs: u64,
    pub verifies: u64,
    pub efficiency: f64,
    /// Share of requests served without a server error
    pub uptime_percent: f64,
    pub uptime_seconds: u64,
}

#[derive(Serialize)]
pub struct LatencyPayload {
    pub p95: f64,
    pub samples: usize,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "name": "Quardian-Safe API",
        "message": "Backend running successfully.",
    }))
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state.exporter.render(state.metrics());
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], body)
}

/// POST /api/encrypt
///
/// `algorithm` defaults to `AES-GCM`. The returned key is the only copy.
pub async fn encrypt(
    State(state): State<AppState>,
    payload: Result<Json<EncryptRequest>, JsonRejection>,
) -> ApiResult<EncryptionResult> {
    let Json(req) = payload?;
    require(&req.text, "Text is required")?;

    let input_bytes = req.text.len();
    let result = run_blocking(&state, move |service| {
        service.encrypt(&req.text, req.algorithm.as_deref())
    })
    .await?;

    tracing::debug!(
        kind = "encrypt",
        scheme = result.scheme.as_str(),
        input_bytes,
        "Operation completed"
    );
    Ok(ok(Some("Encryption successful"), result))
}

/// POST /api/decrypt
pub async fn decrypt(
    State(state): State<AppState>,
    payload: Result<Json<DecryptRequest>, JsonRejection>,
) -> ApiResult<DecryptPayload> {
    let Json(req) = payload?;
    let input = DecryptionInput {
        ciphertext: req.ciphertext,
        key: req.key,
        iv: req.iv,
        tag: req.tag,
    };
    let algorithm = req.algorithm;

    let plain_text = run_blocking(&state, move |service| {
        service.decrypt(&input, algorithm.as_deref())
    })
    .await?;

    tracing::debug!(
        kind = "decrypt",
        output_bytes = plain_text.len(),
        "Operation completed"
    );
    Ok(ok(Some("Decryption successful"), DecryptPayload { plain_text }))
}

/// POST /api/sign
pub async fn sign(
    State(state): State<AppState>,
    payload: Result<Json<SignRequest>, JsonRejection>,
) -> ApiResult<SignatureResult> {
    let Json(req) = payload?;
    require(&req.message, "Message is required")?;

    let input_bytes = req.message.len();
    let result = run_blocking(&state, move |service| service.sign(&req.message)).await?;

    tracing::debug!(
        kind = "sign",
        scheme = result.scheme.as_str(),
        input_bytes,
        "Operation completed"
    );
    Ok(ok(Some("Signature generated"), result))
}

/// POST /api/verify
///
/// A signature that does not match is a successful call with `valid: false`.
pub async fn verify(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> ApiResult<VerifyPayload> {
    let Json(req) = payload?;
    require(&req.message, "Message is required")?;
    require(&req.public_key, "Public key is required")?;
    require(&req.signature, "Signature is required")?;

    let valid = run_blocking(&state, move |service| {
        service.verify(&req.message, &req.public_key, &req.signature)
    })
    .await?;

    tracing::debug!(kind = "verify", valid, "Operation completed");
    Ok(ok(Some("Verification completed"), VerifyPayload { valid }))
}

/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<StatsPayload> {
    let stats = run_blocking(&state, |service| service.stats()).await?;
    Ok(ok(
        None,
        StatsPayload {
            encrypts: stats.encrypts,
            decrypts: stats.decrypts,
            signs: stats.signs,
            verifies: stats.verifies,
            efficiency: stats.efficiency,
            uptime_percent: state.exporter.availability_percent(),
            uptime_seconds: state.uptime_seconds(),
        },
    ))
}

/// GET /api/system
pub async fn system() -> ApiResult<SystemSnapshot> {
    let snapshot = SystemSnapshot::collect().map_err(|e| ApiError::System(e.to_string()))?;
    Ok(ok(None, snapshot))
}

/// GET /api/latency
pub async fn latency(State(state): State<AppState>) -> ApiResult<LatencyPayload> {
    let window = &state.metrics().latency;
    Ok(ok(
        None,
        LatencyPayload {
            p95: window.percentile95(),
            samples: window.len(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quardian_core::Error;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation("Text is required").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(Error::malformed("iv must be 12 bytes, got 3")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(Error::AuthenticationFailed).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(Error::CryptoFailure("rng".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(Error::Storage("locked".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::System("no /proc".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_panicked_task_is_server_error() {
        let join_error = tokio::task::spawn_blocking(|| panic!("worker died"))
            .await
            .unwrap_err();
        let err = ApiError::from(join_error);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_core_errors_carry_code() {
        assert_eq!(ApiError::from(Error::AuthenticationFailed).code(), Some(200));
        assert_eq!(ApiError::from(Error::Storage("locked".into())).code(), Some(400));
        assert_eq!(ApiError::Validation("Text is required").code(), None);
    }

    #[test]
    fn test_response_flattens_payload() {
        let Json(body) = ok(Some("Verification completed"), VerifyPayload { valid: false });
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, json!({ "ok": true, "message": "Verification completed", "valid": false }));
    }

    #[test]
    fn test_stats_payload_without_message() {
        let Json(body) = ok(
            None,
            StatsPayload {
                encrypts: 3,
                decrypts: 0,
                signs: 1,
                verifies: 1,
                efficiency: 0.75,
                uptime_percent: 100.0,
                uptime_seconds: 9,
            },
        );
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("message").is_none());
        assert_eq!(json["uptimeSeconds"], 9);
        assert_eq!(json["uptimePercent"], 100.0);
        assert_eq!(json["efficiency"], 0.75);
    }
}
