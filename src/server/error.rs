use crate::utils::error::{ErrorCategory, EtlError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Maps a batch error to an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub EtlError);

impl From<EtlError> for ApiError {
    fn from(err: EtlError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.category() {
            ErrorCategory::Validation if matches!(self.0, EtlError::UploadTooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            ErrorCategory::Validation => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_client_error() {
            tracing::info!("Rejected upload: {}", self.0);
            return (status, self.0.to_string()).into_response();
        }

        // 詳細錯誤只寫入伺服器日誌
        tracing::error!(
            "CRITICAL SERVER ERROR: {:?} (Category: {:?}, Severity: {:?})",
            self.0,
            self.0.category(),
            self.0.severity()
        );
        (status, format!("Internal Error: {}", self.0.user_friendly_message())).into_response()
    }
}
