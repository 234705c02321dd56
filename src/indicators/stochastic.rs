// =============================================================================
// Stochastic Oscillator (%K / %D)
// =============================================================================
//
//   low_n  = min(low)  over the trailing `k_period` rows
//   high_n = max(high) over the same rows
//   %K     = 100 * (close - low_n) / (high_n - low_n)
//   %D     = SMA_{d_period}(%K)
//
// When high_n == low_n the range is empty and %K is pinned to 50, the
// midpoint, instead of dividing by zero.

use crate::indicators::window::{rolling_max, rolling_mean, rolling_min};
use crate::types::Column;

pub const STOCH_K_PERIOD: usize = 14;
pub const STOCH_D_PERIOD: usize = 3;

/// %K value used when the high/low range is zero.
pub const FLAT_RANGE_K: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct StochasticSeries {
    pub k: Column,
    pub d: Column,
}

/// Compute %K and %D, aligned with the input.
pub fn calculate_stochastic(
    highs: &[Option<f64>],
    lows: &[Option<f64>],
    closes: &[Option<f64>],
    k_period: usize,
    d_period: usize,
) -> StochasticSeries {
    let low_n = rolling_min(lows, k_period);
    let high_n = rolling_max(highs, k_period);

    let k: Column = closes
        .iter()
        .zip(low_n.iter().zip(&high_n))
        .map(|(c, (l, h))| {
            let (c, l, h) = ((*c)?, (*l)?, (*h)?);
            let range = h - l;
            if range == 0.0 {
                Some(FLAT_RANGE_K)
            } else {
                Some(100.0 * (c - l) / range)
            }
        })
        .collect();

    let d = rolling_mean(&k, d_period);
    StochasticSeries { k, d }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Synthetic bars with the close inside [low, high].
    fn bars(n: usize) -> (Column, Column, Column) {
        let mut highs = Vec::with_capacity(n);
        let mut lows = Vec::with_capacity(n);
        let mut closes = Vec::with_capacity(n);
        for i in 0..n {
            let mid = 100.0 + (i as f64 * 0.45).sin() * 8.0;
            highs.push(Some(mid + 1.5));
            lows.push(Some(mid - 1.5));
            closes.push(Some(mid + (i as f64 * 1.3).cos()));
        }
        (highs, lows, closes)
    }

    #[test]
    fn warm_up() {
        let (h, l, c) = bars(30);
        let s = calculate_stochastic(&h, &l, &c, STOCH_K_PERIOD, STOCH_D_PERIOD);
        assert!(s.k[..13].iter().all(Option::is_none));
        assert!(s.k[13].is_some());
        assert!(s.d[..15].iter().all(Option::is_none));
        assert!(s.d[15].is_some());
    }

    #[test]
    fn k_is_bounded() {
        let (h, l, c) = bars(200);
        let s = calculate_stochastic(&h, &l, &c, STOCH_K_PERIOD, STOCH_D_PERIOD);
        for v in s.k.iter().chain(s.d.iter()).flatten() {
            assert!((0.0..=100.0).contains(v), "value {v} out of range");
        }
    }

    #[test]
    fn known_value() {
        // Window lows 1..=14 -> low_n 1; highs 11..=24 -> high_n 24; close 12.5
        let lows: Column = (1..=14).map(|x| Some(x as f64)).collect();
        let highs: Column = (11..=24).map(|x| Some(x as f64)).collect();
        let mut closes = vec![Some(10.0); 14];
        closes[13] = Some(12.5);
        let s = calculate_stochastic(&highs, &lows, &closes, STOCH_K_PERIOD, STOCH_D_PERIOD);
        assert!((s.k[13].unwrap() - 100.0 * 11.5 / 23.0).abs() < 1e-12);
    }

    #[test]
    fn flat_range_is_midpoint() {
        let flat = vec![Some(42.0); 20];
        let s = calculate_stochastic(&flat, &flat, &flat, STOCH_K_PERIOD, STOCH_D_PERIOD);
        for v in s.k.iter().flatten() {
            assert_eq!(*v, FLAT_RANGE_K);
        }
        assert_eq!(s.d[19], Some(FLAT_RANGE_K));
    }

    #[test]
    fn undefined_low_blanks_k_for_its_windows() {
        let (h, mut l, c) = bars(40);
        l[20] = None;
        let s = calculate_stochastic(&h, &l, &c, STOCH_K_PERIOD, STOCH_D_PERIOD);
        assert!(s.k[19].is_some());
        assert!(s.k[20..=33].iter().all(Option::is_none));
        assert!(s.k[34].is_some());
        assert!(s.d[35].is_none());
        assert!(s.d[36].is_some());
    }
}
