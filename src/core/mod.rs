pub mod batch;
pub mod dataset;
pub mod etl;
pub mod row_processor;

pub use crate::domain::model::{
    BatchOutput, BatchSummary, Dataset, InputRecord, OutputRecord, PlaceId, ReviewRecord,
};
pub use crate::domain::ports::{LookupClient, Pipeline, Storage};
pub use crate::utils::error::Result;
