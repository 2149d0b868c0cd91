//! Page server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use tower_http::services::ServeDir;

use strata_render::{
    load_metadata, ContentPath, DiagnosticSink, Metadata, MetadataPolicy, PageRenderer,
    TracingSink,
};

use crate::preload::preload_links;

/// Configuration for the page server.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Content root
    pub content_dir: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("site"),
            port: 3000,
            host: "127.0.0.1".to_string(),
            open: false,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("Server error: {0}")]
    ServeError(String),
}

/// Shared server state. Holds no per-request data.
struct ServerState {
    renderer: PageRenderer,
    sink: Arc<dyn DiagnosticSink>,
}

/// Page server.
pub struct PageServer {
    config: ServeConfig,
}

impl PageServer {
    /// Create a new page server.
    pub fn new(config: ServeConfig) -> Self {
        Self { config }
    }

    /// Bind and serve until the process is stopped.
    pub async fn start(self) -> Result<(), ServerError> {
        let raw = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = raw
            .parse()
            .map_err(|_| ServerError::InvalidAddress(raw.clone()))?;

        let app = router(
            self.config.content_dir.clone(),
            Arc::new(TracingSink::new("serve")),
        );

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        tracing::info!(
            "Serving {} at http://{}",
            self.config.content_dir.display(),
            addr
        );

        if self.config.open {
            let url = format!("http://{}", addr);
            let _ = open::that(&url);
        }

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()))?;

        Ok(())
    }
}

/// Build the application router.
///
/// Pages are rendered by a middleware in front of a [`ServeDir`] over the
/// same root, so any request that does not name an existing page falls
/// through to static file serving (and its 404).
pub fn router(content_dir: impl Into<PathBuf>, sink: Arc<dyn DiagnosticSink>) -> Router {
    let content_dir = content_dir.into();

    let state = Arc::new(ServerState {
        renderer: PageRenderer::new(&content_dir),
        sink,
    });

    Router::new()
        .fallback_service(ServeDir::new(&content_dir))
        .layer(middleware::from_fn_with_state(state, render_pages))
}

/// Render the request if it names a page, otherwise pass it on.
async fn render_pages(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method();
    if *method != Method::GET && *method != Method::HEAD {
        return next.run(request).await;
    }

    let Some(content) = request_content_path(request.uri().path()) else {
        return next.run(request).await;
    };

    if !state.renderer.has_page(&content) {
        return next.run(request).await;
    }

    let page = content.clone();
    match tokio::task::spawn_blocking(move || render_page(&state, &page)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Render task for {} failed: {}", content, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Map a raw request path to a content path.
fn request_content_path(raw: &str) -> Option<ContentPath> {
    let decoded = urlencoding::decode(raw).ok()?;
    ContentPath::from_url(&decoded)
}

/// Render one page into a response.
///
/// Metadata problems and render failures are logged, never surfaced as an
/// error status: whatever was rendered before a failure is sent as the body.
fn render_page(state: &ServerState, content: &ContentPath) -> Response {
    let metadata = load_metadata(
        state.renderer.root(),
        content,
        MetadataPolicy::Lenient,
        state.sink.as_ref(),
    )
    .unwrap_or_else(|e| {
        tracing::warn!("{}", e);
        Metadata::new()
    });

    let mut body = Vec::new();
    if let Err(e) = state
        .renderer
        .render(content, &metadata, Arc::clone(&state.sink), &mut body)
    {
        tracing::warn!("{}", e);
    }

    let mut response = (
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        body,
    )
        .into_response();

    for link in preload_links(&metadata) {
        if let Ok(value) = HeaderValue::from_str(&link) {
            response.headers_mut().append(header::LINK, value);
        }
    }

    response
}
