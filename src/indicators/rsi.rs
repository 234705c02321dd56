// =============================================================================
// Relative Strength Index (RSI) — simple-mean variant
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — delta_t = close_t - close_{t-1}           (undefined at t = 0)
// Step 2 — gain_t = max(delta_t, 0), loss_t = max(-delta_t, 0)
// Step 3 — avg_gain / avg_loss = trailing `period`-row SIMPLE means
//          (not Wilder's smoothing), so the first value needs `period + 1`
//          closes
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// When avg_loss is zero (no down moves inside the window, including a flat
// window) RSI is defined as 100.0.
// =============================================================================

use crate::indicators::window::{rolling_mean, zip_with};
use crate::types::Column;

/// Default look-back.
pub const RSI_PERIOD: usize = 14;

/// Compute the RSI column for `closes` and `period`, aligned with the input.
///
/// # Edge cases
/// - `period == 0` => all undefined
/// - rows `0..period` are undefined (they do not have `period` deltas yet)
/// - an undefined close makes the two deltas touching it undefined, and every
///   window containing those deltas undefined
pub fn calculate_rsi(closes: &[Option<f64>], period: usize) -> Column {
    let n = closes.len();
    if period == 0 || n == 0 {
        return vec![None; n];
    }

    // --- Price deltas --------------------------------------------------------
    let mut deltas: Column = Vec::with_capacity(n);
    deltas.push(None);
    deltas.extend(closes.windows(2).map(|w| Some(w[1]? - w[0]?)));

    let gains: Column = deltas.iter().map(|d| d.map(|d| d.max(0.0))).collect();
    let losses: Column = deltas.iter().map(|d| d.map(|d| (-d).max(0.0))).collect();

    // --- Trailing simple means -----------------------------------------------
    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    zip_with(&avg_gain, &avg_loss, rsi_from_averages)
}

/// Overbought / oversold zone of an RSI reading.
pub fn rsi_label(value: f64) -> &'static str {
    if value >= 70.0 {
        "OVERBOUGHT"
    } else if value <= 30.0 {
        "OVERSOLD"
    } else {
        "NEUTRAL"
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}
