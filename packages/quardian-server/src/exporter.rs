//! Prometheus exposition for `/metrics`.
//!
//! The recorder is built but never installed as the global `metrics`
//! recorder, so every exporter instance (one per server, one per test) owns
//! its own registry. Operation counters live in the core's
//! [`MetricsContext`] and are mirrored into the registry at scrape time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use metrics::{Counter, Gauge, Key, KeyName, Label, Recorder, SharedString, Unit};
use metrics_exporter_prometheus::{
    BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};
use quardian_core::{MetricsContext, OperationKind};

/// Histogram of HTTP request durations.
pub const REQUEST_DURATION: &str = "http_request_duration_seconds";

/// Bucket bounds for [`REQUEST_DURATION`], in seconds.
pub const REQUEST_DURATION_BUCKETS: [f64; 9] = [0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0];

const ENCRYPT_TOTAL: &str = "quardian_encrypt_total";
const DECRYPT_TOTAL: &str = "quardian_decrypt_total";
const SIGN_TOTAL: &str = "quardian_sign_total";
const VERIFY_TOTAL: &str = "quardian_verify_total";
const LAST_CIPHERTEXT_BYTES: &str = "quardian_last_ciphertext_bytes";
const LATENCY_P95: &str = "quardian_latency_p95_seconds";

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Owns a Prometheus registry and the handles registered in it.
pub struct PrometheusExporter {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    operations: [(OperationKind, Counter); 4],
    last_ciphertext_bytes: Gauge,
    latency_p95: Gauge,
    requests: AtomicU64,
    server_errors: AtomicU64,
}

impl PrometheusExporter {
    pub fn new() -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(REQUEST_DURATION.to_string()),
                &REQUEST_DURATION_BUCKETS,
            )?
            .build_recorder();
        let handle = recorder.handle();

        describe_counter(&recorder, ENCRYPT_TOTAL, "Total encryption operations");
        describe_counter(&recorder, DECRYPT_TOTAL, "Total decryption operations");
        describe_counter(&recorder, SIGN_TOTAL, "Total signature operations");
        describe_counter(&recorder, VERIFY_TOTAL, "Total verification operations");
        recorder.describe_gauge(
            KeyName::from(LAST_CIPHERTEXT_BYTES),
            Some(Unit::Bytes),
            SharedString::from("Length of the last ciphertext in bytes"),
        );
        recorder.describe_gauge(
            KeyName::from(LATENCY_P95),
            Some(Unit::Seconds),
            SharedString::from("95th percentile encrypt/decrypt latency"),
        );
        recorder.describe_histogram(
            KeyName::from(REQUEST_DURATION),
            Some(Unit::Seconds),
            SharedString::from("Duration of HTTP requests in seconds"),
        );

        let counter = |name: &'static str| recorder.register_counter(&Key::from_static_name(name));
        let operations = [
            (OperationKind::Encrypt, counter(ENCRYPT_TOTAL)),
            (OperationKind::Decrypt, counter(DECRYPT_TOTAL)),
            (OperationKind::Sign, counter(SIGN_TOTAL)),
            (OperationKind::Verify, counter(VERIFY_TOTAL)),
        ];
        let last_ciphertext_bytes =
            recorder.register_gauge(&Key::from_static_name(LAST_CIPHERTEXT_BYTES));
        let latency_p95 = recorder.register_gauge(&Key::from_static_name(LATENCY_P95));

        Ok(Self {
            recorder,
            handle,
            operations,
            last_ciphertext_bytes,
            latency_p95,
            requests: AtomicU64::new(0),
            server_errors: AtomicU64::new(0),
        })
    }

    /// Record one HTTP request in the duration histogram.
    pub fn observe_request(&self, method: &str, route: &str, status: u16, seconds: f64) {
        let key = Key::from_parts(
            REQUEST_DURATION,
            vec![
                Label::new("method", method.to_string()),
                Label::new("route", route.to_string()),
                Label::new("status_code", status.to_string()),
            ],
        );
        self.recorder.register_histogram(&key).record(seconds);

        self.requests.fetch_add(1, Ordering::Relaxed);
        if status >= 500 {
            self.server_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Share of observed requests answered without a 5xx, as a percentage
    /// rounded to two decimals. 100 before the first request.
    pub fn availability_percent(&self) -> f64 {
        let total = self.requests.load(Ordering::Relaxed);
        if total == 0 {
            return 100.0;
        }
        let failed = self.server_errors.load(Ordering::Relaxed).min(total);
        let percent = (total - failed) as f64 * 100.0 / total as f64;
        (percent * 100.0).round() / 100.0
    }

    /// Mirror `metrics` into the registry and render the text exposition.
    pub fn render(&self, metrics: &MetricsContext) -> String {
        for (kind, counter) in &self.operations {
            counter.absolute(metrics.counters.get(*kind));
        }
        self.last_ciphertext_bytes
            .set(metrics.counters.last_ciphertext_bytes() as f64);
        self.latency_p95.set(metrics.latency.percentile95());

        self.handle.render()
    }
}

fn describe_counter(recorder: &PrometheusRecorder, name: &'static str, help: &'static str) {
    recorder.describe_counter(KeyName::from(name), None, SharedString::from(help));
}

/// Middleware feeding [`REQUEST_DURATION`], labelled by the matched route.
pub async fn track_requests(
    State(exporter): State<Arc<PrometheusExporter>>,
    req: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();
    let route = match req.extensions().get::<MatchedPath>() {
        Some(path) => path.as_str().to_owned(),
        None => req.uri().path().to_owned(),
    };

    let response = next.run(req).await;

    exporter.observe_request(
        &method,
        &route,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}
