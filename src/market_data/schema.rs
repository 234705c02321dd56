// =============================================================================
// Column Normalizer — one alias table for both label sets
// =============================================================================
//
// Quote exports arrive either with the Japanese investing.com labels
// (日付 / 終値 / 始値 / 高値 / 安値 ...) or with English labels
// (Date / Close or Price / Open / High / Low ...).  Every accepted alias maps
// to exactly one canonical `Field`; the table is consulted once, up front, and
// nothing downstream ever sees a non-canonical label.
//
// Matching rules:
//   - labels are trimmed (and a leading UTF-8 BOM is dropped) before matching
//   - English aliases match ASCII case-insensitively
//   - if two columns resolve to the same field, the leftmost one wins and the
//     later one keeps its original label
//   - unrecognised columns pass through untouched
// =============================================================================

use thiserror::Error;
use tracing::debug;

use crate::market_data::table::PriceTable;
use crate::types::Field;

/// Every accepted header label and the canonical field it maps to.
const COLUMN_ALIASES: &[(&str, Field)] = &[
    // Localized (investing.com JP export)
    ("日付", Field::Date),
    ("終値", Field::Close),
    ("始値", Field::Open),
    ("高値", Field::High),
    ("安値", Field::Low),
    ("出来高", Field::Volume),
    ("変化率 %", Field::ChangePercent),
    ("前日比%", Field::ChangePercent),
    // Canonical English
    ("date", Field::Date),
    ("close", Field::Close),
    ("price", Field::Close),
    ("open", Field::Open),
    ("high", Field::High),
    ("low", Field::Low),
    ("volume", Field::Volume),
    ("vol.", Field::Volume),
    ("change %", Field::ChangePercent),
    ("change_percent", Field::ChangePercent),
];

/// Fatal schema problems.  Each variant names the offending field so the
/// caller can tell the user exactly which column to fix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("required column `{field}` is missing (checked localized and English labels)")]
    MissingColumn { field: Field },

    #[error("column `{field}` value {value:?} in row {row} is not a recognised date")]
    UnparseableDate {
        field: Field,
        row: usize,
        value: String,
    },
}

impl SchemaError {
    /// The field the error refers to.
    pub fn field(&self) -> Field {
        match self {
            Self::MissingColumn { field } | Self::UnparseableDate { field, .. } => *field,
        }
    }
}

/// Strip surrounding whitespace and a leading byte-order mark.
fn clean_label(label: &str) -> &str {
    label.trim().trim_start_matches('\u{feff}').trim()
}

/// Resolve a single (already cleaned) label against the alias table.
pub fn resolve_alias(label: &str) -> Option<Field> {
    COLUMN_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(label))
        .map(|(_, field)| *field)
}

/// Rename recognised columns to their canonical labels.
///
/// Returns a new table; the input is left untouched.  Fails with
/// [`SchemaError::MissingColumn`] for the first required field that could not
/// be resolved under either label set.
pub fn normalize_columns(table: &PriceTable) -> Result<PriceTable, SchemaError> {
    let mut resolved: Vec<Field> = Vec::with_capacity(Field::REQUIRED.len());

    let headers: Vec<String> = table
        .headers
        .iter()
        .map(|raw| {
            let label = clean_label(raw);
            match resolve_alias(label) {
                Some(field) if !resolved.contains(&field) => {
                    resolved.push(field);
                    field.canonical_name().to_string()
                }
                _ => label.to_string(),
            }
        })
        .collect();

    if let Some(missing) = Field::REQUIRED
        .iter()
        .find(|field| !resolved.contains(field))
    {
        return Err(SchemaError::MissingColumn { field: *missing });
    }

    debug!(
        columns = headers.len(),
        passthrough = headers.len() - resolved.len(),
        "price table columns normalized"
    );

    Ok(PriceTable::new(headers, table.rows.clone()))
}
