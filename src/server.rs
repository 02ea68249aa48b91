use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::pipeline::{self, CycleConfig};
use crate::render;
use crate::store;

/// Shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<CycleConfig>,
    pub secret: Option<Arc<str>>,
    pub client: Client,
    /// One update cycle at a time.
    pub cycle_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: CycleConfig, secret: Option<String>, client: Client) -> Self {
        Self {
            config: Arc::new(config),
            secret: secret.filter(|s| !s.is_empty()).map(Arc::from),
            client,
            cycle_lock: Arc::new(Mutex::new(())),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TriggerQuery {
    pub req: Option<String>,
}

/// The trigger only fires for an exact match against a configured secret.
pub fn secret_matches(secret: Option<&str>, provided: Option<&str>) -> bool {
    match (secret, provided) {
        (Some(secret), Some(provided)) => !secret.is_empty() && secret == provided,
        _ => false,
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/cron", get(trigger_handler))
        .with_state(state)
}

pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    if state.secret.is_none() {
        info!("No trigger secret configured; /cron will never run an update");
    }
    info!("Registering routes:");
    info!("  GET /");
    info!("  GET /cron?req=<secret>");

    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index_handler(State(state): State<AppState>) -> Response {
    match store::load(&state.config.store_path) {
        Ok(records) => Html(render::html_page(&records.unwrap_or_default())).into_response(),
        Err(e) => {
            error!("Failed to load store: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "store unavailable").into_response()
        }
    }
}

/// Mismatches are a silent no-op: same status, empty body, no state change.
async fn trigger_handler(State(state): State<AppState>, Query(query): Query<TriggerQuery>) -> StatusCode {
    if !secret_matches(state.secret.as_deref(), query.req.as_deref()) {
        debug!("Ignoring trigger without a matching secret");
        return StatusCode::OK;
    }

    let _guard = state.cycle_lock.lock().await;
    match pipeline::run_cycle(&state.client, &state.config).await {
        Ok(report) => info!(?report, "Triggered update finished"),
        Err(e) => error!("Triggered update failed: {}", e),
    }
    StatusCode::OK
}
