//! Prometheus metrics for the A/B analyzer.
//!
//! Exposes:
//! - `abtest_command_duration_seconds` (histogram)
//! - `abtest_command_total` (counter with status)
//! - `abtest_command_inflight` (gauge)
//! - `abtest_dashboard_requests_total` (counter by route and status)
//! - `abtest_significance_tests_total` (counter by outcome)
//! - process metrics via `process` collector

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use once_cell::sync::Lazy;
use prometheus::process_collector::ProcessCollector;
use prometheus::{
    default_registry, register_histogram_vec, register_int_counter_vec, register_int_gauge_vec,
    Encoder, HistogramVec, IntCounterVec, IntGaugeVec, TextEncoder,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

static PROCESS_COLLECTOR: Lazy<()> = Lazy::new(|| {
    if let Err(err) = default_registry().register(Box::new(ProcessCollector::for_self())) {
        warn!("Failed to register process collector: {}", err);
    }
});

static COMMAND_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    // Exponential buckets from 5ms up to ~40 seconds.
    let buckets =
        prometheus::exponential_buckets(0.005, 2.0, 14).expect("failed to create histogram buckets");
    register_histogram_vec!(
        "abtest_command_duration_seconds",
        "CLI command duration in seconds",
        &["command"],
        buckets
    )
    .expect("failed to register command duration histogram")
});

static COMMAND_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "abtest_command_total",
        "Total command executions by status",
        &["command", "status"]
    )
    .expect("failed to register command counter")
});

static COMMAND_INFLIGHT: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        "abtest_command_inflight",
        "Number of in-flight commands",
        &["command"]
    )
    .expect("failed to register inflight gauge")
});

static DASHBOARD_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "abtest_dashboard_requests_total",
        "Dashboard HTTP requests by route and status code",
        &["route", "status"]
    )
    .expect("failed to register dashboard request counter")
});

static SIGNIFICANCE_TESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "abtest_significance_tests_total",
        "Two-proportion z-tests run, by outcome",
        &["outcome"]
    )
    .expect("failed to register significance test counter")
});

/// Ensure collectors are registered.
fn init_collectors() {
    Lazy::force(&PROCESS_COLLECTOR);
    Lazy::force(&COMMAND_DURATION);
    Lazy::force(&COMMAND_TOTAL);
    Lazy::force(&COMMAND_INFLIGHT);
    Lazy::force(&DASHBOARD_REQUESTS);
    Lazy::force(&SIGNIFICANCE_TESTS);
}

/// Increment inflight gauge for a command.
pub fn record_command_start(command: &'static str) {
    init_collectors();
    COMMAND_INFLIGHT.with_label_values(&[command]).inc();
}

/// Record command completion with duration and status.
pub fn record_command_result(command: &'static str, duration: Duration, success: bool) {
    init_collectors();
    COMMAND_INFLIGHT.with_label_values(&[command]).dec();
    COMMAND_DURATION
        .with_label_values(&[command])
        .observe(duration.as_secs_f64());
    COMMAND_TOTAL
        .with_label_values(&[command, if success { "ok" } else { "error" }])
        .inc();
}

/// Count a served dashboard request.
pub fn record_dashboard_request(route: &'static str, status: StatusCode) {
    init_collectors();
    DASHBOARD_REQUESTS
        .with_label_values(&[route, status.as_str()])
        .inc();
}

/// Count a completed significance test.
pub fn record_significance_test(significant: bool) {
    init_collectors();
    SIGNIFICANCE_TESTS
        .with_label_values(&[if significant {
            "significant"
        } else {
            "not_significant"
        }])
        .inc();
}

/// Encode every registered metric in the Prometheus text format.
pub fn encode_metrics() -> Result<(String, Vec<u8>), prometheus::Error> {
    init_collectors();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok((encoder.format_type().to_string(), buffer))
}

/// Build the `/metrics` response.
pub fn metrics_response() -> Response<Full<Bytes>> {
    let built = match encode_metrics() {
        Ok((content_type, buffer)) => Response::builder()
            .status(StatusCode::OK)
            .header(hyper::header::CONTENT_TYPE, content_type)
            .body(Full::from(buffer)),
        Err(err) => {
            error!("Failed to encode metrics: {}", err);
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Full::from("encode error"))
        }
    };
    built.unwrap_or_else(|err| {
        error!("Failed to build metrics response: {}", err);
        let mut response = Response::new(Full::new(Bytes::new()));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}

async fn handle_request(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    let response = match req.uri().path() {
        "/metrics" => metrics_response(),
        _ => {
            let mut response = Response::new(Full::new(Bytes::new()));
            *response.status_mut() = StatusCode::NOT_FOUND;
            response
        }
    };
    Ok(response)
}

async fn serve(addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Prometheus metrics endpoint started");

    loop {
        let (stream, peer) = listener.accept().await?;
        let service = service_fn(handle_request);
        let io = TokioIo::new(stream);

        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                warn!(?peer, "Metrics connection error: {}", err);
            }
        });
    }
}

/// Spawn the metrics HTTP endpoint on the given address.
pub fn spawn_metrics_server(addr: SocketAddr) {
    init_collectors();
    tokio::spawn(async move {
        if let Err(err) = serve(addr).await {
            error!(%addr, "Metrics server failed: {}", err);
        }
    });
}
