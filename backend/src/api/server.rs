//! HTTP Server for the autoclean API.
//!
//! # API Endpoints
//!
//! | Method | Path                  | Description                              |
//! |--------|-----------------------|------------------------------------------|
//! | GET    | `/health`             | Health check                             |
//! | POST   | `/api/inspect`        | Download a link and summarize it         |
//! | POST   | `/api/clean`          | Clean a link, return JSON with CSV text  |
//! | POST   | `/api/clean/download` | Clean a link, return `cleaned_data.csv`  |
//! | GET    | `/api/logs`           | SSE stream for real-time logs            |

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, LOG_BROADCASTER};
use super::types::{error_response, CleanRequest, CleanResponse, InspectRequest};
use crate::error::{ImputeError, PipelineError, ServerResult};
use crate::transform::pipeline::{clean_link, inspect_link, CleanOptions, Inspection, CLEANED_FILE_NAME, CLEANED_MIME};

type ApiError = (StatusCode, Json<Value>);

/// Build the router with its shared options.
pub fn router(options: CleanOptions) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/inspect", post(inspect))
        .route("/api/clean", post(clean))
        .route("/api/clean/download", post(clean_download))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(options)
}

/// Start the HTTP server
pub async fn start_server(port: u16, options: CleanOptions) -> ServerResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    eprintln!("🚀 Autoclean server running on http://localhost:{}", port);
    eprintln!("   POST /api/inspect        - Summarize a linked CSV");
    eprintln!("   POST /api/clean          - Clean a linked CSV (JSON)");
    eprintln!("   POST /api/clean/download - Clean a linked CSV (file)");
    eprintln!("   GET  /api/logs           - SSE log stream");
    eprintln!("   GET  /health             - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(options)).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "autoclean",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "inspect": "POST /api/inspect",
            "clean": "POST /api/clean",
            "download": "POST /api/clean/download",
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

async fn inspect(
    State(options): State<CleanOptions>,
    Json(request): Json<InspectRequest>,
) -> Result<Json<Inspection>, ApiError> {
    let options = CleanOptions {
        delimiter: request.delimiter.or(options.delimiter),
        ..options
    };
    inspect_link(&request.link, &options)
        .await
        .map(Json)
        .map_err(api_error)
}

async fn clean(
    State(options): State<CleanOptions>,
    Json(request): Json<CleanRequest>,
) -> Result<Json<CleanResponse>, ApiError> {
    let preview_rows = options.preview_rows;
    let result = run_clean(options, request).await?;
    Ok(Json(CleanResponse::new(result, preview_rows)))
}

async fn clean_download(
    State(options): State<CleanOptions>,
    Json(request): Json<CleanRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = run_clean(options, request).await?;
    let headers = [
        (header::CONTENT_TYPE, CLEANED_MIME.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", CLEANED_FILE_NAME),
        ),
    ];
    Ok((headers, result.csv))
}

async fn run_clean(
    options: CleanOptions,
    request: CleanRequest,
) -> Result<crate::transform::pipeline::CleanResult, ApiError> {
    let options = CleanOptions {
        delimiter: request.delimiter.or(options.delimiter),
        ..options
    };
    let mut presets = request.presets();
    clean_link(&request.link, &mut presets, &options)
        .await
        .map_err(api_error)
}

/// HTTP status for a pipeline failure.
pub fn error_status(error: &PipelineError) -> StatusCode {
    match error {
        PipelineError::Link(_) | PipelineError::Config(_) => StatusCode::BAD_REQUEST,
        PipelineError::Impute(ImputeError::NoStrategy(_)) => StatusCode::BAD_REQUEST,
        PipelineError::Impute(ImputeError::NothingToImpute { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::Impute(ImputeError::Provider(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        PipelineError::Load(_) => StatusCode::BAD_GATEWAY,
        PipelineError::Csv(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(error: PipelineError) -> ApiError {
    log_error(error.to_string());
    (error_status(&error), Json(error_response(&error.to_string())))
}
