use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use relay_api::{build_router, config::RelayConfig, AppState};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOUNDARY: &str = "---------------------------relaytestboundary";

async fn relay_app(rag_service_url: &str, retain_uploads: bool) -> (Router, TempDir) {
    let upload_dir = tempfile::tempdir().unwrap();
    let config = RelayConfig {
        rag_service_url: rag_service_url.to_string(),
        upload_dir: upload_dir.path().to_path_buf(),
        retain_uploads,
        ..RelayConfig::default()
    };

    let state = AppState::new(config).await.unwrap();
    (build_router(state), upload_dir)
}

fn multipart_request(field_name: &str, content: &str) -> Request<Body> {
    form_request(
        &format!("name=\"{}\"; filename=\"paper.pdf\"", field_name),
        content,
    )
}

fn form_request(disposition: &str, content: &str) -> Request<Body> {
    let body = format!(
        "--{boundary}\r\n\
        Content-Disposition: form-data; {disposition}\r\n\
        Content-Type: application/pdf\r\n\r\n\
        {content}\r\n\
        --{boundary}--\r\n",
        boundary = BOUNDARY,
        disposition = disposition,
        content = content
    );

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn ask_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ask")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body)
        .unwrap_or_else(|_| panic!("non-JSON body: {}", String::from_utf8_lossy(&body)));
    (status, json)
}

async fn forwarded_file_paths(server: &MockServer) -> Vec<PathBuf> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/process")
        .map(|r| {
            let body: Value = serde_json::from_slice(&r.body).unwrap();
            PathBuf::from(body["filePath"].as_str().unwrap())
        })
        .collect()
}

fn canonical(dir: &Path) -> PathBuf {
    std::fs::canonicalize(dir).unwrap()
}

#[tokio::test]
async fn health_reports_running() {
    // Nothing listens here; health must not depend on the RAG service.
    let (app, _dir) = relay_app("http://127.0.0.1:1", false).await;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        json,
        json!({"status": "ok", "message": "Backend server running"})
    );
}

#[tokio::test]
async fn ask_forwards_body_and_relays_answer() {
    let rag = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_json(json!({"question": "What is the abstract?"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"answer": "The abstract states..."})),
        )
        .expect(1)
        .mount(&rag)
        .await;

    let (app, _dir) = relay_app(&rag.uri(), false).await;
    let (status, json) = send(app, ask_request(r#"{"question":"What is the abstract?"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"answer": "The abstract states..."}));
}

#[tokio::test]
async fn ask_passes_unknown_fields_through() {
    let rag = MockServer::start().await;
    let question = json!({
        "question": "Which datasets were used?",
        "top_k": 3,
        "model": "gpt-4o-mini",
        "extra": {"nested": [1, 2, 3]}
    });
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_json(question.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "answer": "MNIST and CIFAR-10.",
            "distances": [0.1, 0.4]
        })))
        .expect(1)
        .mount(&rag)
        .await;

    let (app, _dir) = relay_app(&rag.uri(), false).await;
    let (status, json) = send(app, ask_request(&question.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["answer"], "MNIST and CIFAR-10.");
    assert_eq!(json["distances"], json!([0.1, 0.4]));
}

#[tokio::test]
async fn ask_collapses_upstream_error() {
    let rag = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(502).set_body_string("index exploded"))
        .mount(&rag)
        .await;

    let (app, _dir) = relay_app(&rag.uri(), false).await;
    let (status, json) = send(app, ask_request(r#"{"question":"Why?"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({"status": "error", "message": "Ask failed."}));
}

#[tokio::test]
async fn ask_fails_when_rag_service_unreachable() {
    let (app, _dir) = relay_app("http://127.0.0.1:1", false).await;
    let (status, json) = send(app, ask_request(r#"{"question":"What is the abstract?"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({"status": "error", "message": "Ask failed."}));
}

#[tokio::test]
async fn ask_rejects_malformed_json_without_calling_upstream() {
    let rag = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "x"})))
        .expect(0)
        .mount(&rag)
        .await;

    let (app, _dir) = relay_app(&rag.uri(), false).await;
    let (status, json) = send(app, ask_request("{not json")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "Ask failed.");
}

#[tokio::test]
async fn upload_forwards_absolute_path_and_removes_scratch_file() {
    let rag = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "processed",
            "num_chunks": 4,
            "index_size": 4
        })))
        .expect(1)
        .mount(&rag)
        .await;

    let (app, dir) = relay_app(&rag.uri(), false).await;
    let (status, json) = send(app, multipart_request("pdf", "%PDF-1.4 fake paper")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "processed");
    assert_eq!(json["num_chunks"], 4);

    let paths = forwarded_file_paths(&rag).await;
    assert_eq!(paths.len(), 1);
    let forwarded = &paths[0];
    assert!(forwarded.is_absolute());
    assert_eq!(forwarded.parent().unwrap(), canonical(dir.path()));
    assert!(!forwarded.exists(), "scratch file should be removed");
}

#[tokio::test]
async fn upload_keeps_file_when_retention_enabled() {
    let rag = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "processed"})))
        .mount(&rag)
        .await;

    let (app, _dir) = relay_app(&rag.uri(), true).await;
    let (status, _) = send(app, multipart_request("pdf", "%PDF-1.4 keep me")).await;
    assert_eq!(status, StatusCode::OK);

    let paths = forwarded_file_paths(&rag).await;
    assert_eq!(paths.len(), 1);
    let stored = std::fs::read_to_string(&paths[0]).unwrap();
    assert_eq!(stored, "%PDF-1.4 keep me");
}

#[tokio::test]
async fn upload_collapses_upstream_error_and_cleans_up() {
    let rag = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "boom"})))
        .mount(&rag)
        .await;

    let (app, dir) = relay_app(&rag.uri(), false).await;
    let (status, json) = send(app, multipart_request("pdf", "%PDF-1.4")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json,
        json!({"status": "error", "message": "Processing failed."})
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn upload_fails_when_rag_service_unreachable() {
    let (app, _dir) = relay_app("http://127.0.0.1:1", false).await;
    let (status, json) = send(app, multipart_request("pdf", "%PDF-1.4")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "Processing failed.");
}

#[tokio::test]
async fn upload_without_file_is_rejected() {
    let rag = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&rag)
        .await;

    let (app, dir) = relay_app(&rag.uri(), false).await;

    // Form carries a field, just not the one holding the PDF.
    let (status, json) = send(app.clone(), multipart_request("document", "%PDF-1.4")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({"status": "error", "message": "No file uploaded."}));

    let not_multipart = Request::builder()
        .method("POST")
        .uri("/upload")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(app, not_multipart).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "No file uploaded.");

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn upload_ignores_pdf_field_without_filename() {
    let rag = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "processed"})))
        .expect(0)
        .mount(&rag)
        .await;

    let (app, dir) = relay_app(&rag.uri(), false).await;
    let (status, json) = send(app, form_request("name=\"pdf\"", "hello")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({"status": "error", "message": "No file uploaded."}));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn abandoned_upload_does_not_leave_scratch_file() {
    let rag = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "processed"}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&rag)
        .await;

    let (app, dir) = relay_app(&rag.uri(), false).await;

    // The caller gives up while the RAG service is still ingesting.
    let pending = app.oneshot(multipart_request("pdf", "%PDF-1.4 slow paper"));
    let outcome = tokio::time::timeout(Duration::from_millis(500), pending).await;
    assert!(outcome.is_err(), "request should still be in flight");

    let paths = forwarded_file_paths(&rag).await;
    assert_eq!(paths.len(), 1);
    assert!(!paths[0].exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn ask_with_non_json_content_type_forwards_empty_object() {
    let rag = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_json(json!({})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "error", "message": "field required"})),
        )
        .expect(1)
        .mount(&rag)
        .await;

    let (app, _dir) = relay_app(&rag.uri(), false).await;
    let request = Request::builder()
        .method("POST")
        .uri("/ask")
        .header("Content-Type", "text/plain")
        .body(Body::from(r#"{"question":"ignored?"}"#))
        .unwrap();
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "field required");
}

#[tokio::test]
async fn ask_accepts_json_content_type_with_charset() {
    let rag = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_json(json!({"question": "Who wrote it?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "The authors."})))
        .expect(1)
        .mount(&rag)
        .await;

    let (app, _dir) = relay_app(&rag.uri(), false).await;
    let request = Request::builder()
        .method("POST")
        .uri("/ask")
        .header("Content-Type", "application/json; charset=utf-8")
        .body(Body::from(r#"{"question":"Who wrote it?"}"#))
        .unwrap();
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["answer"], "The authors.");
}
