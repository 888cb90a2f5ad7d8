pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

pub use crate::adapters::google_maps::GoogleMapsClient;
pub use crate::app::pipelines::file_pipeline::FileReviewPipeline;
pub use crate::config::{cli::LocalStorage, ReviewsConfig};
pub use crate::core::{
    batch::{BatchOptions, BatchPipeline},
    etl::EtlEngine,
};
pub use crate::utils::error::{EtlError, Result};
