// =============================================================================
// Indicator Engine — raw table in, indicator-augmented series out
// =============================================================================
//
// Pipeline (fixed order):
//   1. normalize column labels       (SchemaError on a missing field)
//   2. coerce prices, parse dates     (bad price -> None, bad date -> SchemaError)
//   3. stable chronological sort
//   4. SMA 5/20, RSI 14, MACD 12/26/9, Bollinger 20/2, Stochastic 14/3
//
// The engine never enforces a minimum length; short inputs simply produce
// more undefined rows.  It holds no state between calls.
// =============================================================================

use anyhow::Result as AnyResult;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::indicators::bollinger::{calculate_bollinger, BB_NUM_STD, BB_PERIOD};
use crate::indicators::macd::calculate_default_macd;
use crate::indicators::rsi::{calculate_rsi, RSI_PERIOD};
use crate::indicators::sma::{calculate_sma, SMA_FAST, SMA_SLOW};
use crate::indicators::stochastic::{calculate_stochastic, STOCH_D_PERIOD, STOCH_K_PERIOD};
use crate::market_data::table::write_csv;
use crate::market_data::{normalize_columns, PriceSeries, PriceTable, SchemaError};
use crate::types::Column;

/// Labels of the appended columns, in output order.
pub const INDICATOR_COLUMNS: [&str; 10] = [
    "sma_5",
    "sma_20",
    "rsi_14",
    "macd",
    "macd_signal",
    "bb_middle",
    "bb_upper",
    "bb_lower",
    "stoch_k",
    "stoch_d",
];

/// The ten derived columns, each aligned 1:1 with the price records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorColumns {
    pub sma_5: Column,
    pub sma_20: Column,
    pub rsi_14: Column,
    pub macd: Column,
    pub macd_signal: Column,
    pub bb_middle: Column,
    pub bb_upper: Column,
    pub bb_lower: Column,
    pub stoch_k: Column,
    pub stoch_d: Column,
}

impl IndicatorColumns {
    /// Columns in [`INDICATOR_COLUMNS`] order.
    pub fn as_array(&self) -> [&Column; 10] {
        [
            &self.sma_5,
            &self.sma_20,
            &self.rsi_14,
            &self.macd,
            &self.macd_signal,
            &self.bb_middle,
            &self.bb_upper,
            &self.bb_lower,
            &self.stoch_k,
            &self.stoch_d,
        ]
    }
}

/// One row of the augmented series, flattened for API responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub sma_5: Option<f64>,
    pub sma_20: Option<f64>,
    pub rsi_14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub stoch_k: Option<f64>,
    pub stoch_d: Option<f64>,
}

impl IndicatorRow {
    /// `true` when the close and every indicator value are defined.
    pub fn is_complete(&self) -> bool {
        [
            self.close,
            self.sma_5,
            self.sma_20,
            self.rsi_14,
            self.macd,
            self.macd_signal,
            self.bb_middle,
            self.bb_upper,
            self.bb_lower,
            self.stoch_k,
            self.stoch_d,
        ]
        .iter()
        .all(Option::is_some)
    }
}

/// A price series with the ten indicator columns appended.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub prices: PriceSeries,
    pub columns: IndicatorColumns,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Row `i`, or `None` past the end.
    pub fn row(&self, i: usize) -> Option<IndicatorRow> {
        let p = self.prices.records.get(i)?;
        let c = &self.columns;
        Some(IndicatorRow {
            date: p.date,
            open: p.open,
            high: p.high,
            low: p.low,
            close: p.close,
            sma_5: c.sma_5[i],
            sma_20: c.sma_20[i],
            rsi_14: c.rsi_14[i],
            macd: c.macd[i],
            macd_signal: c.macd_signal[i],
            bb_middle: c.bb_middle[i],
            bb_upper: c.bb_upper[i],
            bb_lower: c.bb_lower[i],
            stoch_k: c.stoch_k[i],
            stoch_d: c.stoch_d[i],
        })
    }

    /// All rows in chronological order.
    pub fn rows(&self) -> Vec<IndicatorRow> {
        (0..self.len()).filter_map(|i| self.row(i)).collect()
    }

    /// Rows with no undefined value, in chronological order.
    pub fn complete_rows(&self) -> Vec<IndicatorRow> {
        self.rows().into_iter().filter(IndicatorRow::is_complete).collect()
    }

    /// The most recent fully-defined row.
    pub fn latest_complete(&self) -> Option<IndicatorRow> {
        (0..self.len())
            .rev()
            .filter_map(|i| self.row(i))
            .find(IndicatorRow::is_complete)
    }

    /// Export as CSV: canonical price columns, pass-through columns, then the
    /// indicator columns.  Undefined values are written as empty cells.
    pub fn to_csv(&self) -> AnyResult<String> {
        let mut headers: Vec<String> = ["date", "open", "high", "low", "close"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        headers.extend(self.prices.extra_columns.iter().cloned());
        headers.extend(INDICATOR_COLUMNS.iter().map(|s| s.to_string()));

        let fmt = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        let columns = self.columns.as_array();

        let rows: Vec<Vec<String>> = self
            .prices
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let mut row = vec![
                    r.date.format("%Y-%m-%d").to_string(),
                    fmt(r.open),
                    fmt(r.high),
                    fmt(r.low),
                    fmt(r.close),
                ];
                row.extend(r.extra.iter().cloned());
                row.extend(columns.iter().map(|col| fmt(col[i])));
                row
            })
            .collect();

        write_csv(&headers, &rows)
    }
}

/// Compute every indicator over an already normalized, sorted series.
pub fn compute_indicators(prices: PriceSeries) -> IndicatorSeries {
    let closes = prices.closes();
    let highs = prices.highs();
    let lows = prices.lows();

    let macd = calculate_default_macd(&closes);
    let bb = calculate_bollinger(&closes, BB_PERIOD, BB_NUM_STD);
    let stoch = calculate_stochastic(&highs, &lows, &closes, STOCH_K_PERIOD, STOCH_D_PERIOD);

    let columns = IndicatorColumns {
        sma_5: calculate_sma(&closes, SMA_FAST),
        sma_20: calculate_sma(&closes, SMA_SLOW),
        rsi_14: calculate_rsi(&closes, RSI_PERIOD),
        macd: macd.macd,
        macd_signal: macd.signal,
        bb_middle: bb.middle,
        bb_upper: bb.upper,
        bb_lower: bb.lower,
        stoch_k: stoch.k,
        stoch_d: stoch.d,
    };

    IndicatorSeries { prices, columns }
}

/// Full pipeline from a raw table under either label set.
pub fn calculate_indicators(table: &PriceTable) -> Result<IndicatorSeries, SchemaError> {
    let normalized = normalize_columns(table)?;
    let prices = PriceSeries::from_normalized(&normalized)?;
    let series = compute_indicators(prices);

    debug!(
        rows = series.len(),
        complete_rows = series.complete_rows().len(),
        "indicators computed"
    );

    Ok(series)
}
