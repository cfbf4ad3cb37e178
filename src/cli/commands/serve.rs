//! HTTP API server for integration with other front-ends.
//!
//! Exposes the library over REST: caption extraction, listing, the merged
//! study data, and the raw per-video files.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::TerpError;
use crate::ingest::ingest_video;
use crate::library::{VideoEntry, VideoLibrary};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    library: VideoLibrary,
    settings: Settings,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let library = VideoLibrary::from_settings(&settings);

    let state = Arc::new(AppState { library, settings });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/videos", get(list_videos))
        .route("/videos/process", post(process_video))
        .route("/videos/{video_id}/data", get(video_data))
        .route("/videos/{video_id}/script", get(video_script))
        .route("/videos/{video_id}/translation", get(video_translation))
        .route("/videos/{video_id}/analysis", get(video_analysis))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Terp API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("List Videos", "GET  /videos");
    Output::kv("Process", "POST /videos/process");
    Output::kv("Study Data", "GET  /videos/:video_id/data");
    Output::kv("Raw Files", "GET  /videos/:video_id/{script,translation,analysis}");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ProcessRequest {
    /// YouTube URL or video ID
    url: String,
    /// Re-fetch captions even if already processed
    #[serde(default)]
    force: bool,
}

#[derive(Serialize)]
struct ProcessResponse {
    video_id: String,
    title: String,
    line_count: usize,
    already_processed: bool,
    needs_translation: bool,
}

#[derive(Serialize)]
struct VideoListResponse {
    videos: Vec<VideoEntry>,
    total: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: String) -> axum::response::Response {
    (status, Json(ErrorResponse { error: message })).into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn process_video(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessRequest>,
) -> impl IntoResponse {
    let result = ingest_video(
        &state.library,
        &req.url,
        &state.settings.captions.language,
        req.force,
    )
    .await;

    match result {
        Ok(result) => Json(ProcessResponse {
            video_id: result.video_id,
            title: result.title,
            line_count: result.line_count,
            already_processed: result.already_processed,
            needs_translation: result.needs_translation,
        })
        .into_response(),
        Err(e @ TerpError::InvalidInput(_)) => {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e @ TerpError::Captions(_)) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn list_videos(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.library.list() {
        Ok(videos) => Json(VideoListResponse {
            total: videos.len(),
            videos,
        })
        .into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// The merged study collection, or 404 while any source file is missing.
async fn video_data(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> impl IntoResponse {
    match state.library.load_collection(&video_id) {
        Ok(collection) => Json(collection.lines().to_vec()).into_response(),
        Err(e @ TerpError::VideoNotFound(_)) => {
            error_response(StatusCode::NOT_FOUND, e.to_string())
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn video_script(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> impl IntoResponse {
    raw_file(state.library.script_path(&video_id)).await
}

async fn video_translation(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> impl IntoResponse {
    raw_file(state.library.translation_path(&video_id)).await
}

async fn video_analysis(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> impl IntoResponse {
    raw_file(state.library.analysis_path(&video_id)).await
}

async fn raw_file(path: std::path::PathBuf) -> axum::response::Response {
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => content.into_response(),
        Err(_) => error_response(
            StatusCode::NOT_FOUND,
            format!("File not found: {}", path.display()),
        ),
    }
}
