// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the SAMPLE standard deviation
// (n - 1 denominator) over the same trailing window.
//
// All four columns share the warm-up of the window: undefined until `period`
// closes are available.

use crate::indicators::window::{rolling_mean, rolling_std, zip_with};
use crate::types::Column;

pub const BB_PERIOD: usize = 20;
pub const BB_NUM_STD: f64 = 2.0;

/// Result of a Bollinger Band calculation, one value per input row.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub middle: Column,
    pub upper: Column,
    pub lower: Column,
    pub std_dev: Column,
}

/// Calculate Bollinger Bands for the given closing prices.
pub fn calculate_bollinger(closes: &[Option<f64>], period: usize, num_std: f64) -> BollingerSeries {
    let middle = rolling_mean(closes, period);
    let std_dev = rolling_std(closes, period);
    let upper = zip_with(&middle, &std_dev, |m, s| m + num_std * s);
    let lower = zip_with(&middle, &std_dev, |m, s| m - num_std * s);

    BollingerSeries {
        middle,
        upper,
        lower,
        std_dev,
    }
}
