//! Server configuration and shared state.
//!
//! Every handler receives a clone of [`AppState`]; the clone is cheap because
//! all shared parts sit behind `Arc`s.

use std::sync::Arc;
use std::time::Instant;

use quardian_core::metrics::DEFAULT_LATENCY_WINDOW;
use quardian_core::{CryptoService, JobSink, MetricsContext};

use crate::exporter::PrometheusExporter;

/// Default SQLite database file.
pub const DEFAULT_DATABASE_PATH: &str = "quardian.db";

/// Origins allowed by CORS when none are configured.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 5] = [
    "https://vishnu2707.github.io",
    "http://127.0.0.1:5500",
    "http://localhost:5500",
    "http://localhost:8080",
    "http://127.0.0.1:8080",
];

/// Maximum accepted request body (1 MiB).
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// SQLite path; `:memory:` keeps jobs in memory
    pub database_path: String,
    pub allowed_origins: Vec<String>,
    /// Number of latency samples retained for the p95 statistic
    pub latency_window: usize,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
            latency_window: DEFAULT_LATENCY_WINDOW,
            log_json: false,
        }
    }
}

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Operation pipeline; owns the metrics context and the job sink.
    pub service: CryptoService,
    pub exporter: Arc<PrometheusExporter>,
    pub started_at: Instant,
}

impl AppState {
    /// Wire a service around `sink` with a fresh metrics context.
    pub fn new(config: ServerConfig, sink: Arc<dyn JobSink>, exporter: PrometheusExporter) -> Self {
        let metrics = Arc::new(MetricsContext::new(config.latency_window));
        Self {
            service: CryptoService::new(metrics, sink),
            config: Arc::new(config),
            exporter: Arc::new(exporter),
            started_at: Instant::now(),
        }
    }

    pub fn metrics(&self) -> &MetricsContext {
        self.service.metrics()
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
