use crate::core::batch::BatchPipeline;
use crate::core::dataset::{parse_dataset, write_output};
use crate::core::{BatchOutput, Dataset, Pipeline, Storage};
use crate::utils::error::Result;

/// Reads a CSV from storage, looks up reviews, writes the result back.
pub struct FileReviewPipeline<S: Storage> {
    storage: S,
    batch: BatchPipeline,
    input_path: String,
    output_path: String,
}

impl<S: Storage> FileReviewPipeline<S> {
    pub fn new(storage: S, batch: BatchPipeline, input_path: String, output_path: String) -> Self {
        Self {
            storage,
            batch,
            input_path,
            output_path,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for FileReviewPipeline<S> {
    async fn extract(&self) -> Result<Dataset> {
        tracing::info!("📥 Reading {}", self.input_path);
        let bytes = self.storage.read_file(&self.input_path).await?;
        parse_dataset(&bytes)
    }

    async fn transform(&self, data: Dataset) -> Result<BatchOutput> {
        self.batch.run(&data).await
    }

    async fn load(&self, result: BatchOutput) -> Result<String> {
        for record in &result.records {
            println!(
                "ID: {} - Review: {} (Rating: {})",
                record.id, record.review, record.rating
            );
        }

        let bytes = write_output(&result.records)?;
        tracing::debug!("Writing {} bytes to {}", bytes.len(), self.output_path);
        self.storage.write_file(&self.output_path, &bytes).await?;

        Ok(self.output_path.clone())
    }
}
