//! Dashboard HTTP server.
//!
//! Routes:
//! - `GET /` page with group checkboxes
//! - `GET /api/view?groups=A,B` JSON view model
//! - `GET /chart.svg?groups=A,B` bar chart
//! - `GET /health`
//! - `GET /metrics` Prometheus metrics

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{header, Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};
use url::form_urlencoded;

use super::page::render_page;
use super::view::{render_view, DashboardSettings};
use crate::chart::BarChart;
use crate::dataset::{Dataset, GroupLabel};
use crate::metrics;

pub const DASHBOARD_TITLE: &str = "A/B Test Dashboard";

/// Read-only state shared by every connection.
#[derive(Debug, Clone)]
pub struct DashboardState {
    dataset: Arc<Dataset>,
    settings: Arc<DashboardSettings>,
    groups: Arc<Vec<GroupLabel>>,
}

impl DashboardState {
    pub fn new(dataset: Arc<Dataset>, settings: DashboardSettings) -> Self {
        let groups = dataset.groups();
        Self {
            dataset,
            settings: Arc::new(settings),
            groups: Arc::new(groups),
        }
    }

    pub fn groups(&self) -> &[GroupLabel] {
        &self.groups
    }

    /// Selection from a query string; all groups when `groups` is absent.
    pub fn selection(&self, query: Option<&str>) -> Vec<GroupLabel> {
        parse_groups_param(query).unwrap_or_else(|| self.groups.to_vec())
    }
}

/// Parse `groups=A,B` (or repeated `groups=` pairs) from a query string.
///
/// Returns `None` when the parameter is absent and an empty list when it
/// is present but empty.
pub fn parse_groups_param(query: Option<&str>) -> Option<Vec<GroupLabel>> {
    let query = query?;

    let mut found = false;
    let mut selection: Vec<GroupLabel> = Vec::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if key != "groups" {
            continue;
        }
        found = true;
        for label in value.split(',').filter_map(|raw| GroupLabel::new(raw).ok()) {
            if !selection.contains(&label) {
                selection.push(label);
            }
        }
    }

    found.then_some(selection)
}

fn respond(status: StatusCode, content_type: &str, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    if let Ok(value) = header::HeaderValue::from_str(content_type) {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    response
}

fn text(status: StatusCode, body: impl Into<String>) -> Response<Full<Bytes>> {
    respond(status, "text/plain; charset=utf-8", body.into())
}

/// Route a request. Returns the route name (for metrics) and the response.
pub fn route(
    state: &DashboardState,
    method: &Method,
    path: &str,
    query: Option<&str>,
) -> (&'static str, Response<Full<Bytes>>) {
    if method != Method::GET {
        return (
            "other",
            text(StatusCode::METHOD_NOT_ALLOWED, "method not allowed"),
        );
    }

    match path {
        "/" | "/index.html" => (
            "page",
            respond(
                StatusCode::OK,
                "text/html; charset=utf-8",
                render_page(DASHBOARD_TITLE, state.groups()),
            ),
        ),
        "/api/view" => ("view", view_response(state, query)),
        "/chart.svg" => ("chart", chart_response(state, query)),
        "/health" => ("health", text(StatusCode::OK, "ok")),
        "/metrics" => ("metrics", metrics::metrics_response()),
        _ => ("other", text(StatusCode::NOT_FOUND, "not found")),
    }
}

fn view_response(state: &DashboardState, query: Option<&str>) -> Response<Full<Bytes>> {
    let selection = state.selection(query);
    let view = render_view(&state.dataset, &selection, &state.settings);
    match serde_json::to_vec(&view) {
        Ok(body) => respond(StatusCode::OK, "application/json", body),
        Err(err) => {
            error!("Failed to serialize dashboard view: {}", err);
            text(StatusCode::INTERNAL_SERVER_ERROR, "serialization error")
        }
    }
}

fn chart_response(state: &DashboardState, query: Option<&str>) -> Response<Full<Bytes>> {
    let selection = state.selection(query);
    let view = render_view(&state.dataset, &selection, &state.settings);
    let svg = view.chart_svg.unwrap_or_else(|| {
        BarChart::new("Conversion Rate by Group", super::view::DASHBOARD_Y_MAX).render_svg()
    });
    respond(StatusCode::OK, "image/svg+xml", svg)
}

async fn handle_request(
    state: DashboardState,
    req: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    let (route_name, response) = route(&state, req.method(), req.uri().path(), req.uri().query());
    debug!(
        method = %req.method(),
        path = req.uri().path(),
        status = response.status().as_u16(),
        "Dashboard request"
    );
    metrics::record_dashboard_request(route_name, response.status());
    Ok(response)
}

/// Serve the dashboard until the listener fails or Ctrl-C is received.
pub async fn serve(addr: SocketAddr, state: DashboardState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, groups = state.groups().len(), "Dashboard started");

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down dashboard");
                return Ok(());
            }
        };

        let state = state.clone();
        let service = service_fn(move |req| handle_request(state.clone(), req));
        let io = TokioIo::new(stream);

        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                warn!(?peer, "Dashboard connection error: {}", err);
            }
        });
    }
}
