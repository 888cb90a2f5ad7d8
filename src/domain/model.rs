use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Header columns every upload must carry, in their canonical spelling.
pub const REQUIRED_COLUMNS: [&str; 3] = ["ID", "Name", "Address"];

/// Header of the generated file.
pub const OUTPUT_HEADER: [&str; 3] = ["ID", "Review", "Rating"];

pub const OUTPUT_FILENAME: &str = "reviews_output.csv";

/// One entity row from the uploaded dataset. Absent cells are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputRecord {
    pub id: String,
    pub name: String,
    pub address: String,
}

/// Opaque token returned by geocoding and consumed by the reviews lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaceId(String);

impl PlaceId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A review as returned by the places provider. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub rating: Option<serde_json::Number>,
}

impl ReviewRecord {
    pub fn new(text: impl Into<String>, rating: impl Into<serde_json::Number>) -> Self {
        Self {
            text: Some(text.into()),
            rating: Some(rating.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Review")]
    pub review: String,
    #[serde(rename = "Rating")]
    pub rating: String,
}

impl OutputRecord {
    pub fn from_review(id: &str, review: ReviewRecord) -> Self {
        Self {
            id: id.to_string(),
            review: review.text.unwrap_or_default(),
            rating: review.rating.map(|r| r.to_string()).unwrap_or_default(),
        }
    }
}

/// Tabular data as parsed from CSV: a header row plus ordered records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Counters for one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub rows_total: usize,
    pub rows_processed: usize,
    pub rows_skipped: usize,
    pub rows_not_found: usize,
    pub rows_failed: usize,
    pub reviews: usize,
}

impl BatchSummary {
    pub fn started(rows_total: usize) -> Self {
        Self {
            started_at: Utc::now(),
            elapsed_ms: 0,
            rows_total,
            rows_processed: 0,
            rows_skipped: 0,
            rows_not_found: 0,
            rows_failed: 0,
            reviews: 0,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub records: Vec<OutputRecord>,
    pub summary: BatchSummary,
}
