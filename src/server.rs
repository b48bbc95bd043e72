//! HTTP surface: `/sync`, `/health` and a root descriptor.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, SyncConfig};
use crate::providers::trello::TrelloClient;
use crate::providers::BoardSource;
use crate::sync::{now_iso, BoardFlattener, LookupContext, SyncError, SyncReport};

/// Shared across requests. The lookup context is locked for a whole sync pass,
/// so concurrent `/sync` calls run one after another.
#[derive(Clone)]
pub struct AppState {
    source: Option<Arc<dyn BoardSource>>,
    context: Arc<Mutex<LookupContext>>,
    options: SyncConfig,
}

impl AppState {
    /// `source` is `None` when no credentials are configured.
    pub fn new(source: Option<Arc<dyn BoardSource>>, options: SyncConfig) -> Self {
        Self {
            source,
            context: Arc::new(Mutex::new(LookupContext::new())),
            options,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let source: Option<Arc<dyn BoardSource>> = match config.trello.credentials() {
            Some(credentials) => Some(Arc::new(
                TrelloClient::new(
                    credentials,
                    config.trello.base_url.clone(),
                    config.trello.request_timeout(),
                )
                .context("Failed to build HTTP client")?,
            )),
            None => {
                tracing::warn!("TRELLO_API_KEY / TRELLO_TOKEN not set; /sync will reject requests");
                None
            }
        };
        Ok(Self::new(source, config.sync))
    }

    /// Run one flatten pass against the configured source.
    pub async fn sync(&self) -> Result<SyncReport, SyncError> {
        let source = self.source.as_deref().ok_or(SyncError::MissingCredentials)?;
        let mut context = self.context.lock().await;
        BoardFlattener::new(source, &mut context, self.options)
            .run()
            .await
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for SyncError {
    fn into_response(self) -> Response {
        let status = match &self {
            SyncError::MissingCredentials => StatusCode::BAD_REQUEST,
            SyncError::NoBoards => StatusCode::NOT_FOUND,
            SyncError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "Sync failed");
        } else {
            tracing::info!(error = %self, "Sync rejected");
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/sync", get(sync_handler).post(sync_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: &AppConfig) -> Result<()> {
    let state = AppState::from_config(config)?;
    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, create_router(state))
        .await
        .context("Server error")?;
    Ok(())
}

/// GET|POST /sync
async fn sync_handler(State(state): State<AppState>) -> Result<Json<SyncReport>, SyncError> {
    state.sync().await.map(Json)
}

/// GET /health
async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": now_iso(),
    }))
}

/// GET /
async fn index_handler() -> Json<serde_json::Value> {
    Json(json!({
        "service": "Trello Sync API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/sync": "Main sync endpoint",
            "/health": "Health check",
        },
    }))
}
