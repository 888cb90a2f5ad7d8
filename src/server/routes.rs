use crate::domain::model::OUTPUT_FILENAME;
use crate::server::error::ApiError;
use crate::server::AppState;
use crate::utils::error::EtlError;
use crate::utils::validation::validate_upload_filename;
use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};

const UPLOAD_PAGE: &str = r#"<!doctype html>
<html>
  <head><meta charset="utf-8"><title>Place reviews</title></head>
  <body>
    <h1>Place reviews</h1>
    <p>Upload a CSV with <code>ID</code>, <code>Name</code> and <code>Address</code> columns.</p>
    <form action="/upload" method="post" enctype="multipart/form-data">
      <input type="file" name="file" accept=".csv">
      <button type="submit">Get reviews</button>
    </form>
  </body>
</html>
"#;

pub async fn upload_page() -> Html<&'static str> {
    Html(UPLOAD_PAGE)
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn upload_error(message: impl Into<String>) -> EtlError {
    EtlError::UploadError {
        message: message.into(),
    }
}

/// Multipart errors carry their own status; 413 means the body limit was hit.
fn multipart_error(e: MultipartError, limit: usize) -> EtlError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return EtlError::UploadTooLarge { limit };
    }
    upload_error(format!("Malformed upload: {}", e.body_text()))
}

/// Pulls the `file` part out of the form. Parts without a filename are not files.
async fn read_file_part(
    multipart: Result<Multipart, MultipartRejection>,
    limit: usize,
) -> Result<(String, Bytes), EtlError> {
    let mut multipart = multipart.map_err(|_| upload_error("No file part"))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        return Ok((file_name, data));
    }

    Err(upload_error("No file part"))
}

pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let (file_name, data) = read_file_part(multipart, state.max_upload_bytes).await?;
    validate_upload_filename(Some(&file_name), &["csv"])?;

    tracing::info!("📥 Received {} ({} bytes)", file_name, data.len());

    let (csv, summary) = state.batch.run_csv(&data).await?;

    tracing::info!(
        "Processing complete. Sending file with {} reviews ({} rows failed).",
        summary.reviews,
        summary.rows_failed
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", OUTPUT_FILENAME),
            ),
        ],
        csv,
    )
        .into_response())
}
