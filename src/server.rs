//! HTTP server for the output directory.
//!
//! `/` lists the rendered videos, newest first. Every other path is served
//! from the output directory except `/health` and `/metrics`. The directory
//! is public; nothing secret should live there.

use crate::metrics::MetricsRegistry;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Errors that can occur during server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be bound.
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    /// The server stopped with an error.
    #[error("server error: {0}")]
    Server(String),
}

/// Configuration for the output server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,
    /// Directory served to clients.
    pub root: PathBuf,
    /// Extension of the videos listed on `/`.
    pub container: String,
}

impl ServerConfig {
    /// Serves `root` on the given port on all interfaces.
    pub fn with_port(root: impl Into<PathBuf>, port: u16) -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], port).into(),
            root: root.into(),
            container: "avi".to_string(),
        }
    }

    /// Lists videos with `container` extension on `/`.
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = container.into();
        self
    }
}

#[derive(Clone)]
struct AppState {
    metrics: Arc<MetricsRegistry>,
    root: Arc<PathBuf>,
    container: Arc<str>,
}

/// Serves rendered timelapses, health and metrics.
pub struct TimelapseServer {
    config: ServerConfig,
    metrics: Arc<MetricsRegistry>,
}

impl TimelapseServer {
    /// Creates a new server.
    pub fn new(config: ServerConfig, metrics: Arc<MetricsRegistry>) -> Self {
        Self { config, metrics }
    }

    /// Builds the request router.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(index_handler))
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .fallback_service(ServeDir::new(&self.config.root))
            .layer(TraceLayer::new_for_http())
            .with_state(AppState {
                metrics: Arc::clone(&self.metrics),
                root: Arc::new(self.config.root.clone()),
                container: Arc::from(self.config.container.as_str()),
            })
    }

    /// Starts the HTTP server.
    ///
    /// Runs until `shutdown` resolves, then finishes in-flight requests.
    pub async fn run<S>(self, shutdown: S) -> Result<(), ServerError>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        tracing::info!(
            addr = %self.config.bind_addr,
            root = %self.config.root.display(),
            "Serving timelapses"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Server(e.to_string()))?;

        Ok(())
    }
}

/// Handler for the / endpoint.
async fn index_handler(State(state): State<AppState>) -> Response {
    let root = Arc::clone(&state.root);
    let container = Arc::clone(&state.container);
    let listed = tokio::task::spawn_blocking(move || list_videos(&root, &container)).await;

    match listed {
        Ok(Ok(names)) => Html(render_index(&names)).into_response(),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Failed to list output directory");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to list timelapses").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Directory listing task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Video filenames in `root`, newest day first.
fn list_videos(root: &Path, container: &str) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some(container) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_string());
        }
    }

    // Day keys sort chronologically as strings.
    names.sort_unstable_by(|a, b| b.cmp(a));
    Ok(names)
}

fn render_index(names: &[String]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head><title>Timelapses</title></head>\n<body>\n<h1>Timelapses</h1>\n<ul>\n",
    );
    for name in names {
        let escaped = escape_html(name);
        html.push_str(&format!("<li><a href=\"/{0}\">{0}</a></li>\n", escaped));
    }
    html.push_str("</ul>\n</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Handler for the /metrics endpoint.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(output) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            output,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {}", e),
        ),
    }
}

/// Handler for the /health endpoint.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
