use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use review_etl::core::{LookupClient, PlaceId, ReviewRecord};
use review_etl::server::{create_router, AppState};
use review_etl::{BatchOptions, BatchPipeline, EtlError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "review-etl-test-boundary";

#[derive(Default)]
struct StubLookup {
    calls: AtomicUsize,
}

#[async_trait]
impl LookupClient for StubLookup {
    async fn geocode(&self, address: &str) -> Result<Option<PlaceId>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match address {
            "100 Main St" => Ok(Some(PlaceId::new("P1"))),
            "500 Broken Ave" => Err(EtlError::ProviderError {
                status: "UNKNOWN_ERROR".to_string(),
                message: "try again".to_string(),
            }),
            _ => Ok(None),
        }
    }

    async fn fetch_reviews(&self, _place_id: &PlaceId) -> Result<Vec<ReviewRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![ReviewRecord::new("Great school", 5u8)])
    }
}

fn app(lookup: Arc<StubLookup>) -> axum::Router {
    app_with_limit(lookup, 1024 * 1024)
}

fn app_with_limit(lookup: Arc<StubLookup>, max_upload_bytes: usize) -> axum::Router {
    let batch = BatchPipeline::new(lookup, BatchOptions::default());
    create_router(AppState::new(batch, max_upload_bytes))
}

fn multipart_upload(field: &str, filename: Option<&str>, content: &[u8]) -> Request<Body> {
    let disposition = match filename {
        Some(name) => format!("form-data; name=\"{}\"; filename=\"{}\"", field, name),
        None => format!("form-data; name=\"{}\"", field),
    };

    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: {}\r\nContent-Type: text/csv\r\n\r\n",
            BOUNDARY, disposition
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Option<String>, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, disposition, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_upload_returns_reviews_attachment() {
    let lookup = Arc::new(StubLookup::default());
    let request = multipart_upload(
        "file",
        Some("schools.csv"),
        b"ID,Name,Address\n1,Lincoln HS,100 Main St\n2,Empty Addr,\n",
    );

    let (status, disposition, body) = send(app(lookup), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        disposition.as_deref(),
        Some("attachment; filename=\"reviews_output.csv\"")
    );
    assert_eq!(body, "ID,Review,Rating\n1,Great school,5\n");
}

#[tokio::test]
async fn test_provider_failure_on_one_row_still_returns_200() {
    let lookup = Arc::new(StubLookup::default());
    let request = multipart_upload(
        "file",
        Some("schools.csv"),
        b"ID,Name,Address\n1,A,100 Main St\n2,B,500 Broken Ave\n3,C,100 Main St\n",
    );

    let (status, _, body) = send(app(lookup), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ID,Review,Rating\n1,Great school,5\n3,Great school,5\n");
}

#[tokio::test]
async fn test_missing_file_part_is_bad_request() {
    let request = multipart_upload("attachment", Some("schools.csv"), b"ID,Name,Address\n");

    let (status, _, body) = send(app(Arc::new(StubLookup::default())), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "No file part");
}

#[tokio::test]
async fn test_non_multipart_request_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from("ID,Name,Address\n"))
        .unwrap();

    let (status, _, body) = send(app(Arc::new(StubLookup::default())), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "No file part");
}

#[tokio::test]
async fn test_file_part_without_filename_is_not_a_file() {
    let request = multipart_upload("file", None, b"ID,Name,Address\n");

    let (status, _, body) = send(app(Arc::new(StubLookup::default())), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "No file part");
}

#[tokio::test]
async fn test_oversized_upload_is_payload_too_large() {
    let lookup = Arc::new(StubLookup::default());
    let mut content = b"ID,Name,Address\n".to_vec();
    for i in 0..20 {
        content.extend_from_slice(format!("{},Lincoln HS,100 Main St\n", i).as_bytes());
    }
    let request = multipart_upload("file", Some("schools.csv"), &content);

    let (status, _, body) = send(app_with_limit(lookup.clone(), 64), request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, "File is too large. Maximum upload size is 64 bytes");
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_bare_csv_filename_is_accepted() {
    let request = multipart_upload("file", Some(".csv"), b"ID,Name,Address\n1,A,100 Main St\n");

    let (status, _, body) = send(app(Arc::new(StubLookup::default())), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ID,Review,Rating\n1,Great school,5\n");
}

#[tokio::test]
async fn test_empty_filename_is_bad_request() {
    let request = multipart_upload("file", Some(""), b"ID,Name,Address\n");

    let (status, _, body) = send(app(Arc::new(StubLookup::default())), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "No selected file");
}

#[tokio::test]
async fn test_wrong_extension_is_bad_request() {
    let request = multipart_upload("file", Some("schools.txt"), b"ID,Name,Address\n");

    let (status, _, body) = send(app(Arc::new(StubLookup::default())), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "File must be a .csv");
}

#[tokio::test]
async fn test_missing_columns_rejected_without_lookups() {
    let lookup = Arc::new(StubLookup::default());
    let request = multipart_upload(
        "file",
        Some("schools.csv"),
        b"ID,School,Street\n1,Lincoln HS,100 Main St\n",
    );

    let (status, _, body) = send(app(lookup.clone()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        "CSV missing required columns. Missing: [Name, Address]. Found: [ID, School, Street]"
    );
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreadable_csv_is_internal_error() {
    let request = multipart_upload("file", Some("schools.csv"), b"ID,Name,Address\n1,\xff\xfe,x\n");

    let (status, _, body) = send(app(Arc::new(StubLookup::default())), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Error: The uploaded file is not a readable CSV");
}

#[tokio::test]
async fn test_server_keeps_serving_after_failed_request() {
    let app = app(Arc::new(StubLookup::default()));

    let bad = multipart_upload("file", Some("schools.csv"), b"ID,Name,Address\n1,\xff,x\n");
    let (status, _, _) = send(app.clone(), bad).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let good = multipart_upload("file", Some("schools.csv"), b"ID,Name,Address\n1,A,100 Main St\n");
    let (status, _, body) = send(app, good).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ID,Review,Rating\n1,Great school,5\n");
}

#[tokio::test]
async fn test_upload_page_and_health() {
    let app = app(Arc::new(StubLookup::default()));

    let page = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, _, body) = send(app.clone(), page).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("enctype=\"multipart/form-data\""));

    let health = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, _, body) = send(app, health).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"ok"}"#);
}
