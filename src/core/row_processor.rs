use crate::domain::model::{InputRecord, OutputRecord};
use crate::domain::ports::LookupClient;
use crate::utils::error::EtlError;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Why a row produced no output.
#[derive(Error, Debug)]
pub enum RowFailure {
    #[error("row has no {field}")]
    MissingField { field: &'static str },

    #[error("address not found: {address}")]
    AddressNotFound { address: String },

    #[error("lookup failed: {0}")]
    Lookup(#[source] EtlError),
}

pub type RowResult = std::result::Result<Vec<OutputRecord>, RowFailure>;

/// Turns one input row into zero or more review rows.
#[derive(Clone)]
pub struct RowProcessor {
    client: Arc<dyn LookupClient>,
    row_timeout: Duration,
}

impl RowProcessor {
    pub fn new(client: Arc<dyn LookupClient>, row_timeout: Duration) -> Self {
        Self {
            client,
            row_timeout,
        }
    }

    pub async fn process(&self, record: &InputRecord) -> RowResult {
        let name = record.name.trim();
        let address = record.address.trim();
        if name.is_empty() {
            return Err(RowFailure::MissingField { field: "name" });
        }
        if address.is_empty() {
            return Err(RowFailure::MissingField { field: "address" });
        }

        tracing::info!("Fetching: {}...", name);

        match tokio::time::timeout(self.row_timeout, self.lookup(&record.id, address)).await {
            Ok(result) => result,
            Err(_) => Err(RowFailure::Lookup(EtlError::TimeoutError {
                timeout: self.row_timeout,
            })),
        }
    }

    async fn lookup(&self, id: &str, address: &str) -> RowResult {
        let place_id = match self.client.geocode(address).await.map_err(RowFailure::Lookup)? {
            Some(place_id) => place_id,
            None => {
                return Err(RowFailure::AddressNotFound {
                    address: address.to_string(),
                })
            }
        };

        tracing::debug!("Resolved '{}' to place {}", address, place_id);

        let reviews = self
            .client
            .fetch_reviews(&place_id)
            .await
            .map_err(RowFailure::Lookup)?;

        Ok(reviews
            .into_iter()
            .map(|review| OutputRecord::from_review(id, review))
            .collect())
    }
}
