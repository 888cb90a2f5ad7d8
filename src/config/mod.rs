pub mod cli;
pub mod toml_config;

use crate::core::batch::BatchOptions;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewsConfig {
    pub google: GoogleConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub language: Option<String>,
}

// api_key 不可出現在日誌中
impl fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("language", &self.language)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,
    #[serde(default = "default_row_timeout_seconds")]
    pub row_timeout_seconds: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrent_requests: default_concurrent_requests(),
            row_timeout_seconds: default_row_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_concurrent_requests() -> usize {
    1
}

fn default_row_timeout_seconds() -> u64 {
    30
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| EtlError::InvalidConfigValueError {
                field: name.to_string(),
                value: raw.clone(),
                reason: "Could not parse value".to_string(),
            }),
        Err(_) => Ok(None),
    }
}

impl ReviewsConfig {
    /// Reads settings from the environment. `GOOGLE_API_KEY` is required.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GOOGLE_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| EtlError::MissingConfigError {
                field: "GOOGLE_API_KEY".to_string(),
            })?;

        let bind = match (env::var("BIND_ADDRESS").ok(), parse_env::<u16>("PORT")?) {
            (Some(bind), _) => bind,
            (None, Some(port)) => format!("0.0.0.0:{}", port),
            (None, None) => default_bind(),
        };

        Ok(Self {
            google: GoogleConfig {
                api_key,
                base_url: env::var("GOOGLE_MAPS_BASE_URL").unwrap_or_else(|_| default_base_url()),
                timeout_seconds: parse_env("GOOGLE_TIMEOUT_SECONDS")?
                    .unwrap_or_else(default_timeout_seconds),
                language: env::var("REVIEWS_LANGUAGE").ok(),
            },
            pipeline: PipelineConfig {
                concurrent_requests: parse_env("CONCURRENT_REQUESTS")?
                    .unwrap_or_else(default_concurrent_requests),
                row_timeout_seconds: parse_env("ROW_TIMEOUT_SECONDS")?
                    .unwrap_or_else(default_row_timeout_seconds),
            },
            server: ServerConfig {
                bind,
                max_upload_bytes: parse_env("MAX_UPLOAD_BYTES")?
                    .unwrap_or_else(default_max_upload_bytes),
            },
        })
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            concurrent_requests: self.pipeline.concurrent_requests,
            row_timeout: Duration::from_secs(self.pipeline.row_timeout_seconds),
        }
    }
}

impl Validate for ReviewsConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_secret("google.api_key", &self.google.api_key)?;
        validation::validate_url("google.base_url", &self.google.base_url)?;
        validation::validate_range("google.timeout_seconds", self.google.timeout_seconds, 1, 300)?;
        validation::validate_range(
            "pipeline.concurrent_requests",
            self.pipeline.concurrent_requests,
            1,
            32,
        )?;
        validation::validate_range(
            "pipeline.row_timeout_seconds",
            self.pipeline.row_timeout_seconds,
            1,
            600,
        )?;
        validation::validate_socket_addr("server.bind", &self.server.bind)?;

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}
