use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::error_handling::HandleErrorLayer;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::{BoxError, Router};
use serde::Serialize;
use tower::ServiceBuilder;

use crate::analysis::FilterSpec;
use crate::api::{self, ChannelReport, CompareReport, Upload};
use crate::config::AppConfig;
use crate::error::ErrorCode;

/// Shared application state for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    config: Arc<AppConfig>,
}

impl HttpState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// HTTP error variants mapped to JSON responses.
#[derive(Debug)]
pub enum HttpServerError {
    BadRequest(String),
    Timeout,
    Internal(String),
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Timeout => (StatusCode::REQUEST_TIMEOUT, "request timed out".into()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Health endpoint response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Build the Axum router with all handlers.
pub fn build_router(state: HttpState) -> Router {
    let server = &state.config().server;
    let timeout = Duration::from_secs(server.request_timeout_secs.max(1));
    let body_limit = server.max_upload_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/api/analyze", post(analyze))
        .route("/api/compare", post(compare))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(timeout),
        )
        .with_state(state)
}

/// Run the HTTP server loop until Ctrl-C.
pub async fn run_http_server(state: HttpState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding HTTP listener on {addr}"))?;
    log::info!("[HTTP] listening on http://{}", addr);

    let router = build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("[HTTP] shutdown requested");
            }
        })
        .await
        .context("serving HTTP router")?;
    Ok(())
}

async fn handle_middleware_error(err: BoxError) -> HttpServerError {
    if err.is::<tower::timeout::error::Elapsed>() {
        HttpServerError::Timeout
    } else {
        HttpServerError::Internal(format!("unhandled middleware error: {err}"))
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn analyze(
    State(state): State<HttpState>,
    multipart: Multipart,
) -> Result<Json<ChannelReport>, HttpServerError> {
    let form = read_form(multipart, state.config().filter).await?;
    let upload = form
        .uploads
        .into_iter()
        .next()
        .ok_or_else(|| HttpServerError::BadRequest("No file uploaded".into()))?;

    let filter = form.filter;
    let display = state.config().display.clone();
    let name = upload.name.clone();
    let outcome =
        tokio::task::spawn_blocking(move || api::report_upload(&upload, &filter, &display))
            .await
            .map_err(|err| HttpServerError::Internal(format!("analysis task failed: {err}")))?;

    match outcome {
        Ok(report) => Ok(Json(report)),
        Err(err) => {
            log::warn!("[HTTP] analyze {} failed: {}", name, err);
            Err(HttpServerError::Internal(err.message()))
        }
    }
}

pub async fn compare(
    State(state): State<HttpState>,
    multipart: Multipart,
) -> Result<Json<CompareReport>, HttpServerError> {
    let form = read_form(multipart, state.config().filter).await?;
    if form.uploads.is_empty() {
        return Err(HttpServerError::BadRequest("No file uploaded".into()));
    }

    let filter = form.filter;
    let display = state.config().display.clone();
    let uploads = form.uploads;
    let report =
        tokio::task::spawn_blocking(move || api::compare_uploads(&uploads, &filter, &display))
            .await
            .map_err(|err| HttpServerError::Internal(format!("comparison task failed: {err}")))?;

    Ok(Json(report))
}

/// Uploaded files plus the filter parameters from the same form
#[derive(Debug)]
struct UploadForm {
    uploads: Vec<Upload>,
    filter: FilterSpec,
}

/// Collect `file` parts and the optional `low_cut`, `high_cut` and
/// `filter_order` fields, starting from `defaults`.
async fn read_form(
    mut multipart: Multipart,
    defaults: FilterSpec,
) -> Result<UploadForm, HttpServerError> {
    let mut uploads = Vec::new();
    let mut filter = defaults;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| HttpServerError::BadRequest(format!("invalid multipart body: {err}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "file" | "files" => {
                // A part without a filename attribute is a plain field, not a file
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    continue;
                };
                if file_name.is_empty() {
                    return Err(HttpServerError::BadRequest("Empty filename".into()));
                }
                let bytes = field.bytes().await.map_err(|err| {
                    HttpServerError::BadRequest(format!("failed to read {file_name}: {err}"))
                })?;
                uploads.push(Upload::new(file_name, bytes.to_vec()));
            }
            "low_cut" => filter.low_cut_hz = parse_int_field(field, "low_cut").await?,
            "high_cut" => filter.high_cut_hz = parse_int_field(field, "high_cut").await?,
            "filter_order" => filter.order = parse_int_field(field, "filter_order").await?,
            other => log::debug!("[HTTP] ignoring form field {}", other),
        }
    }

    Ok(UploadForm { uploads, filter })
}

async fn parse_int_field(
    field: axum::extract::multipart::Field<'_>,
    label: &str,
) -> Result<u32, HttpServerError> {
    let text = field
        .text()
        .await
        .map_err(|err| HttpServerError::BadRequest(format!("failed to read {label}: {err}")))?;
    text.trim()
        .parse::<u32>()
        .map_err(|_| HttpServerError::BadRequest(format!("Invalid {label}: {text:?}")))
}
