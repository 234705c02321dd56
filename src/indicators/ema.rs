// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula (recursive, non-adjusted):
//   alpha  = 2 / (span + 1)
//   EMA_0  = x_0
//   EMA_t  = alpha * x_t + (1 - alpha) * EMA_{t-1}
//
// The series is seeded with the first defined value, so it is defined from
// that row onward with no warm-up gap.  An undefined input row repeats the
// carried EMA.  The carried value keeps losing weight while the gap lasts: after
// `g` skipped rows the next defined value x gives
//
//   w      = (1 - alpha)^(g + 1)
//   EMA_t  = (w * EMA_prev + alpha * x) / (w + alpha)
// =============================================================================

use crate::types::Column;

/// Smoothing factor for a given span.
pub fn alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Compute the EMA column for `values` with smoothing `span`.
///
/// # Edge cases
/// - `span == 0` => all undefined (alpha would exceed 1)
/// - leading undefined values stay undefined; the seed is the first defined one
/// - undefined values after the seed output the carried EMA
pub fn calculate_ema(values: &[Option<f64>], span: usize) -> Column {
    if span == 0 {
        return vec![None; values.len()];
    }

    let a = alpha(span);
    let mut prev: Option<f64> = None;
    let mut skipped: i32 = 0;

    values
        .iter()
        .map(|v| {
            let (p, x) = match (prev, *v) {
                (None, None) => return None,
                (None, Some(x)) => {
                    prev = Some(x);
                    return prev;
                }
                (Some(p), None) => {
                    skipped += 1;
                    return Some(p);
                }
                (Some(p), Some(x)) => (p, x),
            };
            let ema = if skipped == 0 {
                a * x + (1.0 - a) * p
            } else {
                let w = (1.0 - a).powi(skipped + 1);
                (w * p + a * x) / (w + a)
            };
            skipped = 0;
            prev = Some(ema);
            prev
        })
        .collect()
}
