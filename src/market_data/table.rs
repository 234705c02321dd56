// =============================================================================
// PriceTable — raw labelled table as it arrives from an upload or quote feed
// =============================================================================
//
// Cells stay as strings here.  Header normalization, numeric coercion and date
// parsing happen later in `schema`, `coerce` and `series`, so this layer only
// cares about the delimited-text framing.
// =============================================================================

use thiserror::Error;

/// Errors raised while reading the delimited text itself (before any schema
/// checks run).
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("table has no header row")]
    MissingHeader,

    #[error("row {row} has {got} cells but the header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },
}

/// A header row plus string cells, one `Vec<String>` per data row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PriceTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PriceTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Parse comma-delimited text with a header row.
    ///
    /// Every data row must have exactly as many cells as the header; a short or
    /// long row is reported with its 1-based data-row number.
    pub fn from_csv_str(text: &str) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(TableError::MissingHeader);
        }

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            // Trailing blank lines in hand-edited files come through as a single
            // empty cell.
            if record.len() == 1 && record.get(0).map_or(true, |c| c.trim().is_empty()) {
                continue;
            }
            if record.len() != headers.len() {
                return Err(TableError::RaggedRow {
                    row: idx + 1,
                    expected: headers.len(),
                    got: record.len(),
                });
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column whose label equals `name` exactly.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cells of the column at `idx`, top to bottom.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(idx).map(String::as_str).unwrap_or(""))
    }
}

/// Render header + rows as CSV text.
pub fn write_csv(headers: &[String], rows: &[Vec<String>]) -> anyhow::Result<String> {
    use anyhow::Context;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(headers)
        .context("failed to write CSV header")?;
    for row in rows {
        writer.write_record(row).context("failed to write CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush CSV writer: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}
