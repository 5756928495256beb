//! HTTP request handlers for the taxonomy service.
//!
//! Implements the document analysis and health check endpoints using axum.

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use taxonomist_domain::traits::{DocumentReader, LlmProvider, TokenCodec};
use taxonomist_domain::Taxonomy;
use taxonomist_extractor::{DocumentUpload, ExtractorError, PipelineError, TaxonomyPipeline};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{debug, error, info, warn, Level};

/// Multipart field carrying the document
pub const FILE_FIELD: &str = "file";

/// Shared application state
pub struct AppState<L, C, D> {
    /// Pipeline shared by every request
    pub pipeline: TaxonomyPipeline<L, C, D>,
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
}

impl<L, C, D> Clone for AppState<L, C, D> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Always "ok" while the process is serving
    pub status: String,
    /// Model answering classification prompts
    pub model: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Decoder detail, for unparseable model replies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// The model reply that failed to parse
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl ErrorResponse {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            raw_response: None,
        }
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// The request body could not be read
    BadRequest(String),
    /// The pipeline rejected or failed the request
    Pipeline(PipelineError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::message(message))
            }
            AppError::Pipeline(PipelineError::MissingDocument) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::message("No file uploaded"),
            ),
            AppError::Pipeline(PipelineError::UnsupportedDocument { .. }) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::message("Only PDF files are supported"),
            ),
            AppError::Pipeline(PipelineError::Extractor(ExtractorError::Parse(parse))) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Failed to parse JSON from Hugging Face response".to_string(),
                    details: Some(parse.details),
                    raw_response: Some(parse.raw_response),
                },
            ),
            AppError::Pipeline(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::message(format!("Processing error: {}", e)),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        AppError::Pipeline(e)
    }
}

/// Pull the `file` field out of a multipart body
///
/// A body that is not multipart at all is treated the same as one without a
/// file.
async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Option<DocumentUpload>, AppError> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            debug!(error = %rejection, "Request body is not multipart");
            return Ok(None);
        }
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // A plain form value under the file field is not an upload
        let Some(filename) = field.file_name().map(str::to_string) else {
            debug!("File field carries no filename; ignoring it");
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?;
        debug!(filename = %filename, size_bytes = bytes.len(), "Received upload");

        return Ok(Some(DocumentUpload::new(filename, bytes.to_vec())));
    }

    Ok(None)
}

/// POST /analyze - Build a taxonomy from an uploaded document
async fn analyze<L, C, D>(
    State(state): State<AppState<L, C, D>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Taxonomy>, AppError>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
    C: TokenCodec + Send + Sync + 'static,
    C::Error: Into<ExtractorError>,
    D: DocumentReader + Send + Sync + 'static,
    D::Error: Into<ExtractorError>,
{
    let upload = read_upload(multipart).await?;

    match state.pipeline.analyze(upload).await {
        Ok(result) => {
            info!(
                filename = %result.metadata.filename,
                page_count = result.metadata.page_count,
                chunk_count = result.metadata.chunk_count,
                record_count = result.metadata.record_count,
                model = %result.metadata.model_name,
                processing_time_ms = result.metadata.processing_time_ms,
                "Taxonomy generated"
            );
            Ok(Json(result.taxonomy))
        }
        Err(e) if e.is_validation() => {
            warn!(error = %e, "Rejected upload");
            Err(e.into())
        }
        Err(e) => {
            error!(error = %e, "Analysis failed");
            Err(e.into())
        }
    }
}

/// GET /health - Liveness and model name
async fn health_check<L, C, D>(State(state): State<AppState<L, C, D>>) -> Json<HealthCheckResponse>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
    C: TokenCodec + Send + Sync + 'static,
    C::Error: Into<ExtractorError>,
    D: DocumentReader + Send + Sync + 'static,
    D::Error: Into<ExtractorError>,
{
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        model: state.pipeline.model_name().to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router<L, C, D>(state: AppState<L, C, D>) -> AxumRouter
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
    C: TokenCodec + Send + Sync + 'static,
    C::Error: Into<ExtractorError>,
    D: DocumentReader + Send + Sync + 'static,
    D::Error: Into<ExtractorError>,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    AxumRouter::new()
        .route("/analyze", post(analyze::<L, C, D>))
        .route("/health", get(health_check::<L, C, D>))
        .layer(body_limit)
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
