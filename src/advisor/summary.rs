// =============================================================================
// Indicator Summary — latest complete row rendered as five short strings
// =============================================================================
//
// These strings are the only thing the completion model sees about the
// market, so their wording and precision are fixed: two decimals for price-
// scale values, one decimal for the bounded oscillators.

use serde::Serialize;

use crate::indicators::IndicatorRow;
use crate::types::PromptLanguage;

/// Formatted indicator strings for one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorSummary {
    pub macd: String,
    pub rsi: String,
    pub sma: String,
    pub bb: String,
    pub stoch: String,
}

impl IndicatorSummary {
    /// Render `row`.  Returns `None` if the row has an undefined value.
    pub fn from_row(row: &IndicatorRow, lang: PromptLanguage) -> Option<Self> {
        let close = row.close?;
        let macd = row.macd?;
        let signal = row.macd_signal?;
        let rsi = row.rsi_14?;
        let sma5 = row.sma_5?;
        let sma20 = row.sma_20?;
        let upper = row.bb_upper?;
        let lower = row.bb_lower?;
        let k = row.stoch_k?;
        let d = row.stoch_d?;

        let (rsi, bb) = match lang {
            PromptLanguage::Japanese => (
                format!("RSI14は{rsi:.1}"),
                format!("価格({close:.2})はBB範囲 {lower:.2}〜{upper:.2}"),
            ),
            PromptLanguage::English => (
                format!("RSI14 is {rsi:.1}"),
                format!("Price ({close:.2}) within BB range {lower:.2} - {upper:.2}"),
            ),
        };

        Some(Self {
            macd: format!("MACD: {macd:.2}, Signal: {signal:.2}"),
            rsi,
            sma: format!("SMA5({sma5:.2}) vs SMA20({sma20:.2})"),
            bb,
            stoch: format!("%K: {k:.1}, %D: {d:.1}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_row() -> IndicatorRow {
        IndicatorRow {
            date: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
            open: Some(5460.0),
            high: Some(5523.6),
            low: Some(5451.1),
            close: Some(5460.48),
            sma_5: Some(5474.123),
            sma_20: Some(5402.5),
            rsi_14: Some(61.234),
            macd: Some(38.456),
            macd_signal: Some(41.004),
            bb_middle: Some(5402.5),
            bb_upper: Some(5545.678),
            bb_lower: Some(5259.321),
            stoch_k: Some(48.26),
            stoch_d: Some(55.0),
        }
    }

    #[test]
    fn japanese_formatting() {
        let s = IndicatorSummary::from_row(&sample_row(), PromptLanguage::Japanese).unwrap();
        assert_eq!(s.macd, "MACD: 38.46, Signal: 41.00");
        assert_eq!(s.rsi, "RSI14は61.2");
        assert_eq!(s.sma, "SMA5(5474.12) vs SMA20(5402.50)");
        assert_eq!(s.bb, "価格(5460.48)はBB範囲 5259.32〜5545.68");
        assert_eq!(s.stoch, "%K: 48.3, %D: 55.0");
    }

    #[test]
    fn english_formatting() {
        let s = IndicatorSummary::from_row(&sample_row(), PromptLanguage::English).unwrap();
        assert_eq!(s.rsi, "RSI14 is 61.2");
        assert_eq!(s.bb, "Price (5460.48) within BB range 5259.32 - 5545.68");
        assert_eq!(s.macd, "MACD: 38.46, Signal: 41.00");
    }

    #[test]
    fn incomplete_row_has_no_summary() {
        let mut row = sample_row();
        row.stoch_d = None;
        assert!(IndicatorSummary::from_row(&row, PromptLanguage::Japanese).is_none());
    }
}
