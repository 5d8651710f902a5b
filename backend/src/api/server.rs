//! HTTP Server for the GDP trends API.
//!
//! Provides REST endpoints for CSV upload and analysis. Chart rendering is
//! left to the client, which receives chart descriptors in the report.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                               |
//! |--------|-------------------|-------------------------------------------|
//! | GET    | `/health`         | Health check                              |
//! | POST   | `/api/analyze`    | Upload CSV (+ optional config) for a report |
//! | GET    | `/api/logs`       | SSE stream for real-time logs             |

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{error_response, AnalyzeResponse};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, ServerError, ServerResult};
use crate::transform::pipeline::analyze_bytes;

/// Largest accepted upload (the full OECD export is a few hundred KB).
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone)]
struct AppState {
    config: Arc<AnalysisConfig>,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Analysis(AnalysisError::Load(_))
            | ServerError::Analysis(AnalysisError::Config(_))
            | ServerError::Analysis(AnalysisError::EmptyInput) => StatusCode::BAD_REQUEST,
            ServerError::Analysis(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(error_response(&self.to_string()))).into_response()
    }
}

/// Build the router. `static_dir`, if given, is served for every other path.
pub fn router(config: AnalysisConfig, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let state = AppState {
        config: Arc::new(config),
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/analyze", post(analyze_csv))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state);

    match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app.route("/", get(health)),
    }
}

/// Start the HTTP server
pub async fn start_server(
    port: u16,
    config: AnalysisConfig,
    static_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(ref dir) = static_dir {
        eprintln!("📁 Serving static files from {}", dir.display());
    }
    let app = router(config, static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    eprintln!("🚀 GDP trends server running on http://localhost:{}", port);
    eprintln!("   POST /api/analyze - Upload CSV file");
    eprintln!("   GET  /api/logs    - SSE log stream");
    eprintln!("   GET  /health      - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "gdp-trends",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "analyze": "POST /api/analyze",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload endpoint: multipart `file` (CSV) and optional `config` (JSON).
async fn analyze_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ServerResult<Json<AnalyzeResponse>> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut config: Option<AnalysisConfig> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        match field.name().unwrap_or("") {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                file_data = Some(bytes.to_vec());
            }
            "config" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                let parsed = AnalysisConfig::from_json(&text).map_err(AnalysisError::from)?;
                config = Some(parsed);
            }
            _ => {}
        }
    }

    let bytes = file_data.ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))?;
    let config = config.unwrap_or_else(|| state.config.as_ref().clone());

    log_info(format!(
        "📄 New upload: {} ({} bytes)",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    ));

    let report = tokio::task::spawn_blocking(move || analyze_bytes(&bytes, &config))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
        .map_err(|e| {
            log_error(format!("Analysis failed: {}", e));
            ServerError::from(e)
        })?;

    Ok(Json(AnalyzeResponse::from(report)))
}
