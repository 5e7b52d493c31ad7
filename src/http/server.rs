//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the file handler
//! - Wire up middleware (tracing, timeout, request ID, concurrency limit)
//! - Bind server to listener
//! - Resolve each request through the alias router
//! - Stream the resolved file or map the outcome to a status code
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{ConfigError, ServerConfig};
use crate::http::request::{propagate_request_id, request_id, set_request_id};
use crate::http::response::{serve_path, ServeError};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::routing::{AliasRouter, Exchange, RequestInfo, Resolution};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<AliasRouter>,
    pub index_file: Arc<str>,
}

/// HTTP server for the static alias layer.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a server whose alias rules come from `config`.
    pub fn new(config: ServerConfig) -> Result<Self, ConfigError> {
        let alias_router = Arc::new(AliasRouter::from_config(&config)?);
        Ok(Self::with_router(config, alias_router))
    }

    /// Create a server around an already built alias router, e.g. one
    /// carrying predicates or producers supplied in code.
    pub fn with_router(config: ServerConfig, alias_router: Arc<AliasRouter>) -> Self {
        let state = AppState {
            router: alias_router,
            index_file: Arc::from(config.index_file.as_str()),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(serve_handler))
            .route("/{*path}", get(serve_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(propagate_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            root = %self.config.root.display(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Resolve the request path and serve whatever it resolves to.
async fn serve_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (parts, _body) = request.into_parts();
    let method = parts.method.clone();
    let request_id = request_id(&parts.headers).to_string();

    let info = RequestInfo::from_parts(&parts);
    let exchange = Exchange::new(parts);

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %info.path,
        "Serving request"
    );

    let mut response = match resolve_and_serve(&state, &info, &exchange, &request_id).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };

    let extra = exchange.response().take();
    response.headers_mut().extend(extra);

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}

async fn resolve_and_serve(
    state: &AppState,
    info: &RequestInfo,
    exchange: &Exchange,
    request_id: &str,
) -> Result<Response, ServeError> {
    let resolution = match state.router.resolve(info, exchange).await {
        Ok(resolution) => resolution,
        Err(e) => {
            tracing::error!(request_id = %request_id, path = %info.path, error = %e, "Alias resolution failed");
            metrics::record_resolution("error");
            return Err(ServeError::Internal);
        }
    };
    metrics::record_resolution(resolution.kind());

    let path = match resolution {
        Resolution::Alias { path, .. } | Resolution::Fallthrough { path } => path,
        Resolution::Rejected { .. } => return Err(ServeError::Forbidden),
    };

    let result = serve_path(&path, &state.index_file, exchange.request()).await;
    if let Err(e) = &result {
        tracing::debug!(request_id = %request_id, path = %path.display(), outcome = %e, "Not served");
    }
    result
}
