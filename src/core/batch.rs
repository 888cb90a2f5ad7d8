use crate::core::dataset::{parse_dataset, write_output};
use crate::core::row_processor::{RowFailure, RowProcessor, RowResult};
use crate::domain::model::{BatchOutput, BatchSummary, Dataset, InputRecord};
use crate::domain::ports::LookupClient;
use crate::utils::error::Result;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Rows looked up at the same time. Output order never depends on it.
    pub concurrent_requests: usize,
    pub row_timeout: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrent_requests: 1,
            row_timeout: Duration::from_secs(30),
        }
    }
}

/// CSV in, reviews CSV out.
#[derive(Clone)]
pub struct BatchPipeline {
    processor: RowProcessor,
    concurrent_requests: usize,
}

impl BatchPipeline {
    pub fn new(client: Arc<dyn LookupClient>, options: BatchOptions) -> Self {
        Self {
            processor: RowProcessor::new(client, options.row_timeout),
            concurrent_requests: options.concurrent_requests.max(1),
        }
    }

    /// Validates the header, then looks up every row. Row failures never fail the batch.
    pub async fn run(&self, input: &Dataset) -> Result<BatchOutput> {
        let columns = input.locate_columns()?;
        let mut summary = BatchSummary::started(input.rows.len());
        let started = Instant::now();

        tracing::info!(
            "🚀 Processing {} rows ({} concurrent)",
            input.rows.len(),
            self.concurrent_requests
        );

        let inputs: Vec<InputRecord> = input.rows.iter().map(|row| columns.record(row)).collect();

        // buffered() 保留輸入順序
        let outcomes: Vec<(InputRecord, RowResult)> = stream::iter(inputs)
            .map(|record| {
                let processor = self.processor.clone();
                async move {
                    let outcome = processor.process(&record).await;
                    (record, outcome)
                }
            })
            .buffered(self.concurrent_requests)
            .collect()
            .await;

        let mut records = Vec::new();
        for (record, outcome) in outcomes {
            match outcome {
                Ok(rows) => {
                    summary.rows_processed += 1;
                    summary.reviews += rows.len();
                    records.extend(rows);
                }
                Err(RowFailure::MissingField { field }) => {
                    summary.rows_skipped += 1;
                    tracing::debug!("Skipping row {}: no {}", record.id, field);
                }
                Err(RowFailure::AddressNotFound { .. }) => {
                    summary.rows_not_found += 1;
                    tracing::warn!("Address not found for: {}", record.name);
                }
                Err(failure) => {
                    summary.rows_failed += 1;
                    tracing::error!("Error fetching {}: {}", record.name, failure);
                }
            }
        }

        summary.elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            "📊 Batch complete: {} reviews from {} rows ({} skipped, {} not found, {} failed) in {}ms",
            summary.reviews,
            summary.rows_total,
            summary.rows_skipped,
            summary.rows_not_found,
            summary.rows_failed,
            summary.elapsed_ms
        );

        Ok(BatchOutput { records, summary })
    }

    /// Parses `input`, runs the batch and serializes the result.
    pub async fn run_csv(&self, input: &[u8]) -> Result<(Vec<u8>, BatchSummary)> {
        let dataset = parse_dataset(input)?;
        let output = self.run(&dataset).await?;
        let bytes = write_output(&output.records)?;
        Ok((bytes, output.summary))
    }
}
