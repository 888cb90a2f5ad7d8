use crate::core::{BatchSummary, Pipeline};
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_path: String,
    pub summary: BatchSummary,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("Starting review extraction...");

        // Extract
        let dataset = self.pipeline.extract().await?;
        tracing::info!("Extracted {} rows", dataset.rows.len());

        // Transform
        let output = self.pipeline.transform(dataset).await?;
        tracing::info!("Collected {} reviews", output.records.len());

        // Load
        let summary = output.summary.clone();
        let output_path = self.pipeline.load(output).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(RunReport {
            output_path,
            summary,
        })
    }
}
