//! Quardian Server
//!
//! HTTP front end for the Quardian cryptographic core:
//!
//! 1. **Operations**: encrypt/decrypt under a fresh AES-256-GCM key, and
//!    sign/verify with a fresh Ed25519 keypair per call. Keys are returned to
//!    the caller and never kept.
//!
//! 2. **Job log**: every completed operation leaves a metadata row in SQLite
//!    (kind, scheme, sizes, timestamp). Counts back the `/api/stats` summary.
//!
//! 3. **Observability**: Prometheus exposition on `/metrics`, p95 latency on
//!    `/api/latency`, host load and memory on `/api/system`.

mod api;
mod exporter;
mod state;
mod store;
mod system;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use metrics_exporter_prometheus::BuildError;
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use exporter::PrometheusExporter;
use state::{AppState, ServerConfig, MAX_BODY_BYTES};
use store::SqliteJobStore;

// ── CLI Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "quardian-server", version, about = "Quardian crypto API server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8080, env = "PORT")]
    port: u16,

    /// SQLite database path (":memory:" keeps jobs in memory)
    #[arg(long, default_value = state::DEFAULT_DATABASE_PATH, env = "DATABASE_PATH")]
    database: String,

    /// CORS origins (comma-separated). Defaults to the dashboard origins.
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    allowed_origins: Vec<String>,

    /// Number of latency samples kept for the p95 statistic
    #[arg(long, default_value_t = quardian_core::metrics::DEFAULT_LATENCY_WINDOW, env = "LATENCY_WINDOW")]
    latency_window: usize,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        let origins: Vec<String> = self
            .allowed_origins
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        ServerConfig {
            port: self.port,
            database_path: self.database,
            allowed_origins: if origins.is_empty() {
                defaults.allowed_origins
            } else {
                origins
            },
            latency_window: self.latency_window.max(1),
            log_json: self.log_json,
        }
    }
}

/// Failures that stop the server from starting.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("failed to open job store: {0}")]
    Store(#[from] quardian_core::Error),

    #[error("failed to build metrics exporter: {0}")]
    Exporter(#[from] BuildError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

// ── Entry Point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let config = Args::parse().into_config();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "quardian_server=info,tower_http=info".into());
    if config.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Quardian server stopped");
        std::process::exit(1);
    }
}

async fn run(config: ServerConfig) -> Result<(), StartupError> {
    let store = SqliteJobStore::open(&config.database_path)?;
    let exporter = PrometheusExporter::new()?;

    tracing::info!(
        database = config.database_path.as_str(),
        latency_window = config.latency_window,
        origins = config.allowed_origins.len(),
        "Configuration loaded"
    );

    let addr = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(config, Arc::new(store), exporter);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind {
            addr: addr.clone(),
            source,
        })?;
    tracing::info!("Quardian server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(StartupError::Serve)
}

// ── Router ────────────────────────────────────────────────────────────────────

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::root))
        .route("/health", get(health_handler))
        .route("/metrics", get(api::metrics))
        .route("/api/encrypt", post(api::encrypt))
        .route("/api/decrypt", post(api::decrypt))
        .route("/api/sign", post(api::sign))
        .route("/api/verify", post(api::verify))
        .route("/api/stats", get(api::stats))
        .route("/api/system", get(api::system))
        .route("/api/latency", get(api::latency))
        .route_layer(middleware::from_fn_with_state(
            state.exporter.clone(),
            exporter::track_requests,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(cors_layer(&state.config.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = origin.as_str(), "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Health check endpoint.
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "quardian-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
