//! HTTP server for uploading captures and retrieving chart-ready reports.
//!
//! Exposes a health probe plus `/api/analyze` (one file) and `/api/compare`
//! (several files) over multipart form uploads. Analysis runs on the
//! blocking pool so the async workers only handle I/O.

mod routes;

pub use routes::{build_router, run_http_server, HealthResponse, HttpServerError, HttpState};

use anyhow::Context;
use std::net::SocketAddr;

use crate::config::AppConfig;

/// Build a tokio runtime and serve until Ctrl-C.
pub fn serve_blocking(config: AppConfig, addr: SocketAddr) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime for HTTP server")?;

    log::info!(
        "[HTTP] starting (filter {}-{} Hz, order {})",
        config.filter.low_cut_hz,
        config.filter.high_cut_hz,
        config.filter.order
    );

    runtime.block_on(run_http_server(HttpState::new(config), addr))
}
