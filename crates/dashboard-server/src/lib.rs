//! HTTP and WebSocket front end for the risk dashboard.
//!
//! The table loads once at startup; every browser session then drives its own
//! control state over the shared table and view graph.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use risk_core::RiskTable;
use risk_loader::RiskLoader;
use risk_views::{dashboard_graph, DashboardGraph};

use request_id::RequestId;

pub mod config;
pub mod dashboard_routes;
pub mod embedded_frontend;
pub mod request_id;
pub mod security_headers;
pub mod ws_routes;

pub use config::{ConfigError, DashboardConfig};

/// Shared, read-only server state.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RiskTable>,
    pub graph: Arc<DashboardGraph>,
}

impl AppState {
    pub fn new(table: RiskTable) -> Self {
        Self {
            table: Arc::new(table),
            graph: Arc::new(dashboard_graph()),
        }
    }
}

/// JSON envelope for every API response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Handler error carrying the status it maps to. Anything convertible into
/// `anyhow::Error` becomes a 500.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn with_status(status: StatusCode, error: anyhow::Error) -> Self {
        Self { status, error }
    }

    pub fn bad_request(error: impl Into<anyhow::Error>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, error.into())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("Request failed: {:#}", self.error);
        } else {
            tracing::debug!("Rejected request: {:#}", self.error);
        }
        (self.status, Json(ApiResponse::failure(format!("{:#}", self.error)))).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub rows: usize,
    pub years: usize,
}

async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::success(HealthStatus {
        status: "ok",
        rows: state.table.len(),
        years: state.table.years().len(),
    }))
}

/// Assemble every route and middleware layer over `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(dashboard_routes::dashboard_routes())
        .merge(ws_routes::ws_routes())
        .merge(embedded_frontend::frontend_routes())
        .layer(middleware::from_fn(security_headers::security_headers_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
            let request_id = req
                .extensions()
                .get::<RequestId>()
                .map(|id| id.0.as_str())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %req.method(),
                uri = %req.uri(),
                request_id = %request_id,
            )
        }))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}

/// Load the table, bind the listener and serve until ctrl-c or SIGTERM.
pub async fn run_server(config: DashboardConfig) -> anyhow::Result<()> {
    tracing::info!("Loading risk scores from {}", config.source);
    let loader = RiskLoader::new(config.fetch_timeout);
    let table = loader
        .load(&config.source)
        .await
        .with_context(|| format!("Failed to load risk scores from {}", config.source))?;
    tracing::info!(
        "Loaded {} rows across {} years (latest: {})",
        table.len(),
        table.years().len(),
        table.latest_year().unwrap_or("none")
    );

    let app = build_router(AppState::new(table));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Risk dashboard listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
