use crate::domain::model::{Dataset, InputRecord, OutputRecord, OUTPUT_HEADER, REQUIRED_COLUMNS};
use crate::utils::error::{EtlError, Result};

/// Positions of the required columns inside a dataset header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    id: usize,
    name: usize,
    address: usize,
}

impl ColumnIndex {
    /// Builds an [`InputRecord`] from one row. Short rows yield empty fields.
    pub fn record(&self, row: &[String]) -> InputRecord {
        let cell = |idx: usize| row.get(idx).cloned().unwrap_or_default();
        InputRecord {
            id: cell(self.id),
            name: cell(self.name),
            address: cell(self.address),
        }
    }
}

/// Canonical form used for header matching.
pub fn normalize_column(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_uppercase()
}

/// Parses CSV bytes into a [`Dataset`]. Rows may be shorter or longer than the header.
pub fn parse_dataset(bytes: &[u8]) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    tracing::debug!("Parsed {} columns and {} rows", headers.len(), rows.len());
    Ok(Dataset { headers, rows })
}

impl Dataset {
    /// Finds the required columns. The first matching header wins on duplicates.
    pub fn locate_columns(&self) -> Result<ColumnIndex> {
        let normalized: Vec<String> = self.headers.iter().map(|h| normalize_column(h)).collect();
        let position = |required: &str| {
            let wanted = normalize_column(required);
            normalized.iter().position(|h| *h == wanted)
        };

        let found: Vec<Option<usize>> = REQUIRED_COLUMNS.iter().map(|c| position(c)).collect();
        match found.as_slice() {
            [Some(id), Some(name), Some(address)] => Ok(ColumnIndex {
                id: *id,
                name: *name,
                address: *address,
            }),
            _ => {
                let missing = REQUIRED_COLUMNS
                    .iter()
                    .zip(&found)
                    .filter(|(_, idx)| idx.is_none())
                    .map(|(column, _)| column.to_string())
                    .collect();
                Err(EtlError::MissingColumns {
                    missing,
                    found: self.headers.clone(),
                })
            }
        }
    }
}

/// Serializes output rows as `ID,Review,Rating` CSV. Always writes the header.
pub fn write_output(records: &[OutputRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(OUTPUT_HEADER)?;
    for record in records {
        writer.write_record([&record.id, &record.review, &record.rating])?;
    }

    writer.into_inner().map_err(|e| EtlError::IoError(e.into_error()))
}
