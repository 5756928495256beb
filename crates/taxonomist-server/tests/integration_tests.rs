//! Integration tests for the HTTP surface

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use taxonomist_domain::traits::DocumentReader;
use taxonomist_domain::PageColumns;
use taxonomist_extractor::{ExtractorConfig, ExtractorError, ScalarCodec, TaxonomyPipeline};
use taxonomist_llm::MockProvider;
use taxonomist_server::handlers::{create_router, AppState, HealthCheckResponse};
use tower::ServiceExt; // for oneshot

const BOUNDARY: &str = "taxonomist-test-boundary";

const SINGLE_RECORD: &str = r#"[{"Level 1":"A","Level 2":"B","Level 3":null,"Level 4":null,"Level 5":null,"Level 6":null,"Level 7":null,"Comment":"c1"}]"#;

/// Serves the same single page for any bytes
struct OnePageReader;

impl DocumentReader for OnePageReader {
    type Error = ExtractorError;

    fn read_pages(&self, bytes: &[u8]) -> Result<Vec<PageColumns>, Self::Error> {
        if bytes.is_empty() {
            return Err(ExtractorError::Extraction("empty document".to_string()));
        }
        Ok(vec![PageColumns::new("A thermal substrate", "is disclosed.")])
    }
}

/// Helper to create the application around a mock classifier
fn create_app(llm: &MockProvider) -> Router {
    let pipeline = TaxonomyPipeline::new(
        llm.clone(),
        ScalarCodec,
        OnePageReader,
        ExtractorConfig::default(),
    )
    .unwrap();

    create_router(AppState {
        pipeline,
        max_upload_bytes: 64 * 1024,
    })
}

/// Build a multipart body with one part
fn multipart_body(field: &str, filename: &str, contents: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// A form value named `field` with no filename
fn form_value_body(field: &str, value: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", field).as_bytes(),
    );
    body.extend_from_slice(value);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn analyze_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let llm = MockProvider::default().with_model_name("HuggingFaceH4/zephyr-7b-beta");
    let app = create_app(&llm);

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let health: HealthCheckResponse = serde_json::from_slice(&body).unwrap();

    assert_eq!(health.status, "ok");
    assert_eq!(health.model, "HuggingFaceH4/zephyr-7b-beta");
}

#[tokio::test]
async fn test_analyze_returns_taxonomy() {
    let llm = MockProvider::new(SINGLE_RECORD);
    let app = create_app(&llm);

    let response = app
        .oneshot(analyze_request(multipart_body("file", "patent.pdf", b"%PDF-1.7")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"A": {"B": {"null": {"null": {"null": {"items": [{"Comment": "c1"}]}}}}}})
    );
    assert_eq!(llm.call_count(), 1);
    assert!(llm.prompts()[0].ends_with(":\nA thermal substrate\nis disclosed."));
}

#[tokio::test]
async fn test_analyze_without_file_field() {
    let llm = MockProvider::default();
    let app = create_app(&llm);

    let response = app
        .oneshot(analyze_request(multipart_body("attachment", "patent.pdf", b"%PDF")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({"error": "No file uploaded"}));
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_analyze_file_field_without_filename() {
    let llm = MockProvider::default();
    let app = create_app(&llm);

    let response = app
        .oneshot(analyze_request(form_value_body("file", b"%PDF-1.4 not an upload")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({"error": "No file uploaded"}));
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_analyze_with_empty_multipart() {
    let llm = MockProvider::default();
    let app = create_app(&llm);

    let body = format!("--{}--\r\n", BOUNDARY).into_bytes();
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_analyze_rejects_non_pdf() {
    let llm = MockProvider::new(SINGLE_RECORD);
    let app = create_app(&llm);

    let response = app
        .oneshot(analyze_request(multipart_body("file", "notes.txt", b"hello")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Only PDF files are supported"})
    );
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_analyze_unparseable_reply() {
    let llm = MockProvider::new("I could not find a taxonomy.");
    let app = create_app(&llm);

    let response = app
        .oneshot(analyze_request(multipart_body("file", "patent.pdf", b"%PDF")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Failed to parse JSON from Hugging Face response");
    assert_eq!(body["raw_response"], "I could not find a taxonomy.");
    assert!(body["details"].as_str().is_some_and(|details| !details.is_empty()));
}

#[tokio::test]
async fn test_analyze_classifier_failure() {
    let llm = MockProvider::default();
    llm.queue_error();
    let app = create_app(&llm);

    let response = app
        .oneshot(analyze_request(multipart_body("file", "patent.pdf", b"%PDF")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .is_some_and(|error| error.starts_with("Processing error: ")));
    assert!(body.get("raw_response").is_none());
}

#[tokio::test]
async fn test_analyze_extraction_failure() {
    let llm = MockProvider::default();
    let app = create_app(&llm);

    let response = app
        .oneshot(analyze_request(multipart_body("file", "patent.pdf", b"")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Processing error: Document extraction error: empty document"})
    );
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_analyze_rejects_oversized_upload() {
    let llm = MockProvider::default();
    let app = create_app(&llm);

    let contents = vec![b'x'; 128 * 1024];
    let response = app
        .oneshot(analyze_request(multipart_body("file", "patent.pdf", &contents)))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(llm.call_count(), 0);
}
