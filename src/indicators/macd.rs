// =============================================================================
// MACD — Moving Average Convergence Divergence
// =============================================================================
//
//   MACD   = EMA_12(close) - EMA_26(close)
//   Signal = EMA_9(MACD)
//
// Both EMAs start at row 0, so MACD and its signal line are defined from the
// first row.  Callers that want them aligned with the slower indicators'
// warm-up drop early rows themselves.

use crate::indicators::ema::calculate_ema;
use crate::indicators::window::zip_with;
use crate::types::Column;

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// MACD line and its signal line.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Column,
    pub signal: Column,
}

/// Compute MACD with custom spans.
pub fn calculate_macd(closes: &[Option<f64>], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);
    let macd = zip_with(&ema_fast, &ema_slow, |f, s| f - s);
    let signal = calculate_ema(&macd, signal);
    MacdSeries { macd, signal }
}

/// MACD(12, 26, 9).
pub fn calculate_default_macd(closes: &[Option<f64>]) -> MacdSeries {
    calculate_macd(closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL)
}
