// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
//   SMA_t = (close_t + close_{t-1} + ... + close_{t-w+1}) / w
//
// The first `w - 1` rows are undefined.

use crate::indicators::window::rolling_mean;
use crate::types::Column;

/// Short moving-average window.
pub const SMA_FAST: usize = 5;
/// Long moving-average window.
pub const SMA_SLOW: usize = 20;

/// SMA of `closes` over trailing `period` rows, aligned with the input.
pub fn calculate_sma(closes: &[Option<f64>], period: usize) -> Column {
    rolling_mean(closes, period)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(xs: impl IntoIterator<Item = i32>) -> Column {
        xs.into_iter().map(|x| Some(x as f64)).collect()
    }

    #[test]
    fn short_series_is_entirely_undefined() {
        for len in 0..SMA_FAST {
            let out = calculate_sma(&series(1..=len as i32), SMA_FAST);
            assert_eq!(out.len(), len);
            assert!(out.iter().all(Option::is_none));
        }
    }

    #[test]
    fn defined_count_is_len_minus_four() {
        for len in SMA_FAST..40 {
            let out = calculate_sma(&series(1..=len as i32), SMA_FAST);
            assert_eq!(out.iter().filter(|v| v.is_some()).count(), len - 4);
        }
    }

    #[test]
    fn eleven_ascending_closes() {
        let closes = series(10..=20);
        let out = calculate_sma(&closes, SMA_FAST);
        assert!(out[..4].iter().all(Option::is_none));
        // Fifth row (value 14): mean(10..=14)
        assert_eq!(out[4], Some(12.0));
        // Last row: mean(16..=20)
        assert_eq!(out[10], Some(18.0));
    }

    #[test]
    fn slow_window_warm_up() {
        let out = calculate_sma(&series(1..=25), SMA_SLOW);
        assert!(out[..19].iter().all(Option::is_none));
        assert_eq!(out[19], Some(10.5));
        assert_eq!(out[24], Some(15.5));
    }
}
