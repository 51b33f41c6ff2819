//! HTTP API handlers.

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tracing::{debug, info};

use crate::cms::{ContentApi, QueryOptions, ABOUT, EVENT};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::render;

/// Id of the single About record.
pub const ABOUT_ID: u64 = 1;

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Content API backing every page.
    pub cms: Arc<dyn ContentApi>,
    /// Prometheus handle when metrics are enabled.
    pub metrics: Option<PrometheusHandle>,
    /// Maximum accepted request body size for form posts.
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create new app state around a content client.
    pub fn new(cms: Arc<dyn ContentApi>) -> Self {
        Self {
            cms,
            metrics: None,
            max_upload_bytes: Config::default().max_upload_bytes,
        }
    }

    /// Create app state using limits from config.
    pub fn from_config(config: &Config, cms: Arc<dyn ContentApi>) -> Self {
        Self {
            max_upload_bytes: config.max_upload_bytes,
            ..Self::new(cms)
        }
    }

    /// Expose metrics through the given handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Prometheus scrape handler - 404 when metrics are disabled.
pub async fn metrics_text(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Landing page.
pub async fn index() -> Html<String> {
    metrics::inc_pages_rendered("index");
    Html(render::index_page())
}

/// About page.
pub async fn about(State(state): State<AppState>) -> Result<Html<String>> {
    let about = state.cms.content(ABOUT, ABOUT_ID).await?;
    let record = about.first_record(ABOUT, Some(ABOUT_ID))?;

    metrics::inc_pages_rendered("about");
    Ok(Html(render::about_page(record)))
}

/// Events list as HTML, or the raw CMS JSON with `?format=json`.
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response> {
    let events = state.cms.contents(EVENT, &QueryOptions::all()).await?;

    if first_param(&params, "format") == Some("json") {
        return Ok(([(header::CONTENT_TYPE, "application/json")], events.json).into_response());
    }

    metrics::inc_pages_rendered("events");
    Ok(Html(render::events_page(&events.data)).into_response())
}

/// Create an event from the submission form and redirect to it.
pub async fn create_event(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Response> {
    let fields = read_text_fields(multipart?).await?;

    let created = state.cms.create(EVENT, &fields, Vec::new()).await?;
    info!(records = ?created.data, "event created");

    let id = created.created_id(EVENT)?;
    metrics::inc_events_created();

    Ok((StatusCode::FOUND, [(header::LOCATION, format!("/event/{}", id))]).into_response())
}

/// Single event page.
pub async fn show_event(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Html<String>> {
    let id: u64 = raw_id.parse().map_err(|source| AppError::InvalidId {
        value: raw_id.clone(),
        source,
    })?;

    let event = state.cms.content(EVENT, id).await?;
    let record = event.first_record(EVENT, Some(id))?;

    metrics::inc_pages_rendered("event");
    Ok(Html(render::event_page(record)))
}

/// First value of a repeated query key.
fn first_param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
}

/// Collect the text fields of a multipart form in order. File parts are skipped.
async fn read_text_fields(mut multipart: Multipart) -> Result<Vec<(String, String)>> {
    let mut fields = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if let Some(file_name) = field.file_name() {
            debug!(field = %name, file = %file_name, "skipping file part");
            continue;
        }

        let value = field.text().await?;
        fields.push((name, value));
    }

    Ok(fields)
}
