use crate::domain::model::{BatchOutput, Dataset, PlaceId, ReviewRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Remote geocoding and reviews lookup.
///
/// Implementations only translate calls; they never swallow errors. `Ok(None)`
/// from [`LookupClient::geocode`] means the provider found no match.
#[async_trait]
pub trait LookupClient: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<PlaceId>>;
    async fn fetch_reviews(&self, place_id: &PlaceId) -> Result<Vec<ReviewRecord>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Dataset>;
    async fn transform(&self, data: Dataset) -> Result<BatchOutput>;
    async fn load(&self, result: BatchOutput) -> Result<String>;
}
