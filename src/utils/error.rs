use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Provider returned {status}: {message}")]
    ProviderError { status: String, message: String },

    #[error("Lookup timed out after {timeout:?}")]
    TimeoutError { timeout: Duration },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("{message}")]
    UploadError { message: String },

    #[error("File is too large. Maximum upload size is {limit} bytes")]
    UploadTooLarge { limit: usize },

    #[error(
        "CSV missing required columns. Missing: [{}]. Found: [{}]",
        .missing.join(", "),
        .found.join(", ")
    )]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },
}

pub type Result<T> = std::result::Result<T, EtlError>;

/// Where an error is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller sent bad input; reported back with a 4xx.
    Validation,
    /// External lookup failed for one row; recovered by the batch.
    RowProcessing,
    /// Process cannot start.
    Configuration,
    /// Anything else during a batch; reported with a 5xx.
    Unexpected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::MissingColumns { .. }
            | EtlError::UploadError { .. }
            | EtlError::UploadTooLarge { .. } => ErrorCategory::Validation,
            EtlError::ApiError(_) | EtlError::ProviderError { .. } | EtlError::TimeoutError { .. } => {
                ErrorCategory::RowProcessing
            }
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            EtlError::CsvError(_) | EtlError::IoError(_) | EtlError::SerializationError(_) => {
                ErrorCategory::Unexpected
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::RowProcessing => ErrorSeverity::Medium,
            ErrorCategory::Unexpected => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// Short message that is safe to show to the uploader.
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Validation => self.to_string(),
            ErrorCategory::RowProcessing => "The places provider could not be reached".to_string(),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Unexpected => match self {
                EtlError::CsvError(_) => "The uploaded file is not a readable CSV".to_string(),
                EtlError::IoError(_) => "A file could not be read or written".to_string(),
                _ => "Processing failed unexpectedly".to_string(),
            },
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::MissingColumns { .. } => "Add ID, Name and Address columns to the header row",
            EtlError::UploadError { .. } => "Upload a single .csv file in the 'file' form field",
            EtlError::UploadTooLarge { .. } => "Split the file or raise server.max_upload_bytes",
            EtlError::ApiError(_) | EtlError::TimeoutError { .. } => {
                "Check network access to the places provider"
            }
            EtlError::ProviderError { .. } => "Check the API key, its enabled APIs and quota",
            EtlError::MissingConfigError { .. } => "Set GOOGLE_API_KEY or provide it in the config file",
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => "Fix the configuration value and restart",
            EtlError::CsvError(_) => "Save the file as UTF-8 CSV and try again",
            EtlError::IoError(_) => "Check file paths and permissions",
            EtlError::SerializationError(_) => "Re-run with --verbose and inspect the logs",
        }
    }
}
