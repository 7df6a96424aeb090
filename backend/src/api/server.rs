//! HTTP Server for the apload API.
//!
//! Provides REST endpoints for previewing an FBL1N export and committing it to
//! the destination table.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                              |
//! |--------|-------------------|------------------------------------------|
//! | GET    | `/health`         | Health check                             |
//! | POST   | `/api/preview`    | Filter an upload, list its clients       |
//! | POST   | `/api/load`       | Filter, exclude and load into the table  |
//! | GET    | `/api/logs`       | SSE stream for real-time logs            |

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::{AllowOrigin, CorsLayer};
use uuid::Uuid;

use super::logs::{log_error, LOG_BROADCASTER};
use super::types::{error_response, LoadResponse, PreviewResponse};
use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::load::load_into_mysql;
use crate::models::ExclusionSet;
use crate::transform::pipeline::{plan_load, preview};

type ApiError = (StatusCode, Json<Value>);

#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    /// Held for a whole load; the destination is one shared table.
    load_guard: Arc<Mutex<()>>,
}

/// One multipart upload.
struct UploadForm {
    file_name: String,
    bytes: Vec<u8>,
    /// Raw `clientesExcluir` field, if sent.
    exclusions: Option<String>,
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let allow_origin = match &config.server.cors_origin {
        Some(origin) => AllowOrigin::exact(HeaderValue::from_str(origin)?),
        None => AllowOrigin::any(),
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let port = config.server.port;
    let body_limit = config.server.max_upload_bytes;
    let destination = format!("{}.{}", config.destination.database, config.destination.table);

    let state = AppState {
        config: Arc::new(config),
        load_guard: Arc::new(Mutex::new(())),
    };

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/preview", post(preview_upload))
        .route("/api/load", post(load_upload))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 apload server running on http://localhost:{}", port);
    println!("   POST /api/preview - Preview an FBL1N export");
    println!("   POST /api/load    - Load it into {}", destination);
    println!("   GET  /api/logs    - SSE log stream");
    println!("   GET  /health      - Health check");
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": "apload",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers skip what they missed
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Preview endpoint
async fn preview_upload(multipart: Multipart) -> Result<Json<PreviewResponse>, ApiError> {
    let form = read_upload(multipart).await?;
    let request_id = banner("PREVIEW", &form);

    let UploadForm { file_name, bytes, .. } = form;
    let report = run_blocking(move || preview(&file_name, &bytes)).await?;

    println!("\n{}", "=".repeat(70));
    println!("📊 PREVIEW SUMMARY [{}]", request_id);
    println!("{}", "=".repeat(70));
    println!("   Removed (no sociedad): {}", report.removed);
    println!("   Retained rows:         {}", report.total);
    println!("   Distinct clients:      {}", report.unique_clients.len());
    println!("   Column o total:        {:.2}", report.amount_total);
    println!("{}\n", "=".repeat(70));

    Ok(Json(PreviewResponse::from(report)))
}

/// Load endpoint
async fn load_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<LoadResponse>, ApiError> {
    let form = read_upload(multipart).await?;
    let request_id = banner("LOAD", &form);

    let exclusions = match form.exclusions.as_deref() {
        Some(raw) => ExclusionSet::from_json(raw)
            .map_err(|e| reject(PipelineError::InvalidExclusions(e.to_string())))?,
        None => ExclusionSet::new(),
    };

    let UploadForm { file_name, bytes, .. } = form;
    let plan = run_blocking(move || plan_load(&file_name, &bytes, &exclusions)).await?;

    let _guard = state.load_guard.lock().await;
    let report = load_into_mysql(&state.config.destination, &plan)
        .await
        .map_err(reject)?;

    println!("\n{}", "=".repeat(70));
    println!("📊 LOAD SUMMARY [{}]", request_id);
    println!("{}", "=".repeat(70));
    println!("   Removed (no sociedad): {}", report.removed_sociedad);
    println!("   Excluded:              {}", report.excluded);
    println!("   Loaded:                {}", report.loaded);
    println!("   Invalid dates purged:  {}", report.outcome.inconsistent);
    println!("   Rows in destination:   {}", report.outcome.total_final);
    println!("{}\n", "=".repeat(70));

    Ok(Json(LoadResponse::from(report)))
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut exclusions: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Multipart error: {}", e)))?
    {
        match field.name().unwrap_or("") {
            "file" => {
                let name = field.file_name().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Read error: {}", e)))?;
                file = Some((name, bytes.to_vec()));
            }
            "clientesExcluir" => {
                exclusions = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| bad_request(format!("Read error: {}", e)))?,
                );
            }
            _ => {}
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| bad_request("No file uploaded".to_string()))?;

    Ok(UploadForm {
        file_name,
        bytes,
        exclusions,
    })
}

/// Decode and filter off the async workers; uploads can be large.
async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> PipelineResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(reject),
        Err(e) => {
            let message = format!("Worker failed: {}", e);
            log_error(&message);
            Err((StatusCode::INTERNAL_SERVER_ERROR, Json(error_response(&message))))
        }
    }
}

fn banner(kind: &str, form: &UploadForm) -> Uuid {
    let request_id = Uuid::new_v4();
    println!("\n{}", "=".repeat(70));
    println!(
        "📄 {} [{}]: {} ({} bytes)",
        kind,
        request_id,
        form.file_name,
        form.bytes.len()
    );
    println!("{}\n", "=".repeat(70));
    request_id
}

fn bad_request(message: String) -> ApiError {
    log_error(&message);
    (StatusCode::BAD_REQUEST, Json(error_response(&message)))
}

fn reject(err: PipelineError) -> ApiError {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    log_error(format!("{} {}", status.as_u16(), err));
    (status, Json(error_response(&err.to_string())))
}
