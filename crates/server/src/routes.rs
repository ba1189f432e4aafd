use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use pumpslip_core::ResultPayload;
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::pipeline::{InputError, PipelineError, ReceiptPipeline, Upload};

/// Multipart field carrying the receipt photo.
pub const IMAGE_FIELD: &str = "image";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: ReceiptPipeline,
}

pub fn router(pipeline: ReceiptPipeline, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/process-receipt", post(process_receipt))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { pipeline })
}

/// Handler for `GET /api/health`
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Handler for `POST /api/process-receipt`
async fn process_receipt(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ResultPayload>, PipelineError> {
    let multipart = multipart.map_err(|e| upload_error(e.status(), e.body_text()))?;
    let upload = read_image_field(multipart).await?;
    Ok(Json(state.pipeline.process(upload).await?))
}

async fn read_image_field(mut multipart: Multipart) -> Result<Upload, InputError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        if file_name.trim().is_empty() {
            return Err(InputError::NoFileSelected);
        }
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Upload { file_name, bytes: bytes.to_vec() });
    }
    Err(InputError::MissingImage)
}

fn multipart_error(e: MultipartError) -> InputError {
    upload_error(e.status(), e.body_text())
}

/// Body-limit overruns keep their 413; every other multipart problem is malformed input.
fn upload_error(status: StatusCode, text: String) -> InputError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        InputError::TooLarge
    } else {
        InputError::Malformed(text)
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_response: Option<&'a str>,
}

fn status_for(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::Input(InputError::TooLarge) => StatusCode::PAYLOAD_TOO_LARGE,
        PipelineError::Input(_) => StatusCode::BAD_REQUEST,
        PipelineError::ModelUnavailable(_) => StatusCode::BAD_GATEWAY,
        PipelineError::Ocr(_) | PipelineError::Parse(_) | PipelineError::Worker(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            error!(error = %self, cause = ?self, "Receipt request failed");
        } else {
            warn!(error = %self, "Receipt request rejected");
        }
        let body = ErrorBody { error: self.to_string(), raw_response: self.raw_response() };
        (status, Json(body)).into_response()
    }
}
