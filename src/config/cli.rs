use crate::config::ReviewsConfig;
use crate::core::Storage;
use crate::utils::error::Result;
use clap::Parser;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Parser)]
#[command(name = "review-server")]
#[command(about = "Upload a CSV of places, download their reviews as CSV")]
pub struct ServeArgs {
    /// TOML configuration file; environment variables are used when omitted
    #[arg(short, long)]
    pub config: Option<String>,

    /// Address to listen on, e.g. 0.0.0.0:5000
    #[arg(long)]
    pub bind: Option<String>,

    #[arg(long)]
    pub concurrent_requests: Option<usize>,

    /// Emit JSON log lines
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "batch_reviews")]
#[command(about = "Fetch reviews for every row of a local CSV file")]
pub struct BatchArgs {
    /// Input CSV with ID, Name and Address columns
    #[arg(default_value = "schools.csv")]
    pub input: String,

    /// Directory the input is read from and the output is written to
    #[arg(long, default_value = ".")]
    pub data_dir: String,

    #[arg(long, default_value = crate::domain::model::OUTPUT_FILENAME)]
    pub output: String,

    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub concurrent_requests: Option<usize>,

    /// Print the run summary as JSON
    #[arg(long)]
    pub summary_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// Loads the file when given, otherwise the environment.
pub fn load_config(path: Option<&str>) -> Result<ReviewsConfig> {
    match path {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            ReviewsConfig::from_file(path)
        }
        None => ReviewsConfig::from_env(),
    }
}

impl ServeArgs {
    pub fn resolve(&self) -> Result<ReviewsConfig> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(concurrent) = self.concurrent_requests {
            config.pipeline.concurrent_requests = concurrent;
        }
        Ok(config)
    }
}

impl BatchArgs {
    pub fn resolve(&self) -> Result<ReviewsConfig> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(concurrent) = self.concurrent_requests {
            config.pipeline.concurrent_requests = concurrent;
        }
        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[tokio::test]
    async fn test_local_storage_round_trips_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        storage.write_file("out/reviews_output.csv", b"ID,Review,Rating\n").await.unwrap();
        let data = storage.read_file("out/reviews_output.csv").await.unwrap();

        assert_eq!(data, b"ID,Review,Rating\n");
    }

    #[tokio::test]
    async fn test_local_storage_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        let result = storage.read_file("absent.csv").await;

        assert!(matches!(result, Err(crate::utils::error::EtlError::IoError(_))));
    }

    #[test]
    fn test_serve_args_override_config_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[google]\napi_key = \"AIza-cli\"\n").unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();

        let args = ServeArgs::parse_from([
            "review-server",
            "--config",
            path.as_str(),
            "--bind",
            "127.0.0.1:9999",
            "--concurrent-requests",
            "8",
        ]);
        let config = args.resolve().unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:9999");
        assert_eq!(config.pipeline.concurrent_requests, 8);
        assert_eq!(config.google.api_key, "AIza-cli");
    }

    #[test]
    fn test_batch_args_defaults() {
        let args = BatchArgs::parse_from(["batch_reviews"]);
        assert_eq!(args.input, "schools.csv");
        assert_eq!(args.output, "reviews_output.csv");
        assert_eq!(args.data_dir, ".");
    }
}
