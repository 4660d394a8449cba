//! HTTP server feeding the browser visualizer.
//!
//! - `GET /data?file=<path>` solves a colony and returns its rooms and moves as JSON
//! - `GET /health` reports liveness
//! - anything else is served from the web directory

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use lemin_engine::{format_turn, solve, Colony, LemInError, LemInResult, SolveOptions};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

/// Settings shared by every request.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Colony solved when a request names no file.
    pub default_file: Option<PathBuf>,
    pub web_dir: PathBuf,
    /// Deadline for solving one colony.
    pub timeout: Duration,
    pub options: SolveOptions,
}

#[derive(Debug, Deserialize)]
struct DataQuery {
    file: Option<String>,
}

/// A room as the browser visualizer expects it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomData {
    pub name: String,
    pub x: i64,
    pub y: i64,
    pub is_start: bool,
    pub is_end: bool,
    pub links: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColonyData {
    pub rooms: Vec<RoomData>,
    pub moves: Vec<String>,
}

/// Failures of the `/data` endpoint.
#[derive(Debug)]
enum ApiError {
    MissingFile,
    Colony(LemInError),
    Timeout(Duration),
    Worker(String),
}

impl From<LemInError> for ApiError {
    fn from(error: LemInError) -> Self {
        ApiError::Colony(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingFile => (
                StatusCode::BAD_REQUEST,
                "no colony file given".to_string(),
            ),
            ApiError::Colony(error) => (StatusCode::BAD_REQUEST, error.to_string()),
            ApiError::Timeout(timeout) => (
                StatusCode::GATEWAY_TIMEOUT,
                format!("solving took longer than {} ms", timeout.as_millis()),
            ),
            ApiError::Worker(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!(status = %status, error = %message, "Request failed");

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Builds the application router.
pub fn create_router(config: ServerConfig) -> Router {
    let static_files = ServeDir::new(&config.web_dir);

    Router::new()
        .route("/health", get(health_handler))
        .route("/data", get(data_handler))
        .fallback_service(static_files)
        .with_state(Arc::new(config))
        .layer(TraceLayer::new_for_http())
}

/// Serves the router on `addr` until Ctrl+C or SIGTERM.
pub async fn serve(config: ServerConfig, addr: &str) -> Result<()> {
    let web_dir = config.web_dir.clone();
    let app = create_router(config);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(addr, web_dir = %web_dir.display(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server shutting down");

    Ok(())
}

/// Solves the colony in `file` and lays it out for the browser.
pub fn colony_data(file: &Path, options: &SolveOptions) -> LemInResult<ColonyData> {
    let colony = Colony::load(file)?;
    let solution = solve(&colony, options)?;

    let rooms = colony
        .rooms()
        .iter()
        .map(|room| RoomData {
            name: room.name.clone(),
            x: room.x,
            y: room.y,
            is_start: room.name == colony.start(),
            is_end: room.name == colony.end(),
            links: colony.graph().neighbors(&room.name).to_vec(),
        })
        .collect();

    Ok(ColonyData {
        rooms,
        moves: solution.turns.iter().map(|turn| format_turn(turn)).collect(),
    })
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn data_handler(
    State(config): State<Arc<ServerConfig>>,
    Query(query): Query<DataQuery>,
) -> Result<Json<ColonyData>, ApiError> {
    let file = query
        .file
        .filter(|file| !file.is_empty())
        .map(PathBuf::from)
        .or_else(|| config.default_file.clone())
        .ok_or(ApiError::MissingFile)?;

    let options = config.options.clone();
    let task = tokio::task::spawn_blocking(move || colony_data(&file, &options));

    match tokio::time::timeout(config.timeout, task).await {
        Err(_) => Err(ApiError::Timeout(config.timeout)),
        Ok(Err(error)) => Err(ApiError::Worker(error.to_string())),
        Ok(Ok(data)) => Ok(Json(data?)),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
