// =============================================================================
// PriceSeries — coerced, chronologically sorted daily OHLC records
// =============================================================================
//
// Built from a table whose columns have already been normalized.  The date
// column is parsed strictly (an unparseable date fails the whole request);
// price columns are parsed permissively (bad cells become `None`).
//
// The sort is stable: rows sharing a date keep their input order.  Every
// indicator is order dependent, so nothing is computed before this runs.
// =============================================================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use crate::market_data::coerce::coerce_column;
use crate::market_data::schema::SchemaError;
use crate::market_data::table::PriceTable;
use crate::types::{Column, Field};

/// Date-only layouts, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y年%m月%d日",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%b %d, %Y",
    "%d.%m.%Y",
];

/// Datetime layouts; only the date part is kept.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];

/// Parse a single date cell.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let s = cell.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// One daily record.  Prices are `None` where the source cell was not numeric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    /// Cells of every non-price column, aligned with `PriceSeries::extra_columns`.
    #[serde(skip)]
    pub extra: Vec<String>,
}

/// Chronologically sorted daily records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    pub records: Vec<PriceRecord>,
    /// Labels of the pass-through columns (volume, change_percent, unknowns).
    pub extra_columns: Vec<String>,
}

impl PriceSeries {
    /// Coerce and sort a table that has been through
    /// [`normalize_columns`](crate::market_data::schema::normalize_columns).
    pub fn from_normalized(table: &PriceTable) -> Result<Self, SchemaError> {
        let index_of = |field: Field| {
            table
                .column_index(field.canonical_name())
                .ok_or(SchemaError::MissingColumn { field })
        };

        let date_idx = index_of(Field::Date)?;
        let mut dates = Vec::with_capacity(table.len());
        for (row, cell) in table.column(date_idx).enumerate() {
            let date = parse_date(cell).ok_or_else(|| SchemaError::UnparseableDate {
                field: Field::Date,
                row: row + 1,
                value: cell.to_string(),
            })?;
            dates.push(date);
        }

        let mut prices: Vec<Column> = Vec::with_capacity(Field::PRICES.len());
        let mut undefined_cells = 0;
        for field in Field::PRICES {
            let (values, undefined) = coerce_column(table.column(index_of(field)?));
            undefined_cells += undefined;
            prices.push(values);
        }

        let price_indices: Vec<usize> = Field::PRICES
            .iter()
            .filter_map(|f| table.column_index(f.canonical_name()))
            .collect();
        let extra_indices: Vec<usize> = (0..table.headers.len())
            .filter(|idx| *idx != date_idx && !price_indices.contains(idx))
            .collect();
        let extra_columns = extra_indices
            .iter()
            .map(|idx| table.headers[*idx].clone())
            .collect();

        let mut records: Vec<PriceRecord> = dates
            .into_iter()
            .enumerate()
            .map(|(i, date)| PriceRecord {
                date,
                open: prices[0][i],
                high: prices[1][i],
                low: prices[2][i],
                close: prices[3][i],
                extra: extra_indices
                    .iter()
                    .map(|idx| table.rows[i].get(*idx).cloned().unwrap_or_default())
                    .collect(),
            })
            .collect();

        // `sort_by_key` is stable.
        records.sort_by_key(|r| r.date);

        debug!(
            rows = records.len(),
            undefined_cells,
            first = ?records.first().map(|r| r.date),
            last = ?records.last().map(|r| r.date),
            "price series coerced and sorted"
        );

        Ok(Self {
            records,
            extra_columns,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn closes(&self) -> Column {
        self.records.iter().map(|r| r.close).collect()
    }

    pub fn highs(&self) -> Column {
        self.records.iter().map(|r| r.high).collect()
    }

    pub fn lows(&self) -> Column {
        self.records.iter().map(|r| r.low).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::schema::normalize_columns;

    fn normalized(text: &str) -> PriceTable {
        normalize_columns(&PriceTable::from_csv_str(text).unwrap()).unwrap()
    }

    #[test]
    fn date_formats() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        for s in [
            "2024-03-05",
            "2024/03/05",
            "2024年03月05日",
            "2024.03.05",
            "03/05/2024",
            "Mar 05, 2024",
            "05.03.2024",
            "2024-03-05 00:00:00",
            " 2024-03-05 ",
        ] {
            assert_eq!(parse_date(s), Some(d), "failed on {s:?}");
        }
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn rows_are_sorted_ascending() {
        let t = normalized(
            "Date,Open,High,Low,Close\n\
             2024-01-04,3,3,3,3\n\
             2024-01-02,1,1,1,1\n\
             2024-01-03,2,2,2,2\n",
        );
        let s = PriceSeries::from_normalized(&t).unwrap();
        assert_eq!(s.closes(), vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn sort_is_stable_for_equal_dates() {
        let t = normalized(
            "Date,Open,High,Low,Close\n\
             2024-01-03,9,9,9,9\n\
             2024-01-02,1,1,1,1\n\
             2024-01-03,7,7,7,7\n",
        );
        let s = PriceSeries::from_normalized(&t).unwrap();
        assert_eq!(s.closes(), vec![Some(1.0), Some(9.0), Some(7.0)]);
    }

    #[test]
    fn unparseable_date_is_a_schema_error() {
        let t = normalized("Date,Open,High,Low,Close\n2024-01-02,1,1,1,1\nsoon,1,1,1,1\n");
        let err = PriceSeries::from_normalized(&t).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnparseableDate {
                field: Field::Date,
                row: 2,
                value: "soon".to_string(),
            }
        );
    }

    #[test]
    fn bad_price_cells_become_undefined() {
        let t = normalized("Date,Open,High,Low,Close\n2024-01-02,1,-,1,\"1,050\"\n");
        let s = PriceSeries::from_normalized(&t).unwrap();
        let r = &s.records[0];
        assert_eq!(r.high, None);
        assert_eq!(r.close, Some(1050.0));
    }

    #[test]
    fn extra_columns_ride_along() {
        let t = normalized(
            "日付,終値,始値,高値,安値,出来高,変化率 %\n\
             2024/01/05,10,9,11,8,1.2M,0.5%\n",
        );
        let s = PriceSeries::from_normalized(&t).unwrap();
        assert_eq!(s.extra_columns, vec!["volume", "change_percent"]);
        assert_eq!(s.records[0].extra, vec!["1.2M", "0.5%"]);
        assert_eq!(s.records[0].open, Some(9.0));
    }
}
