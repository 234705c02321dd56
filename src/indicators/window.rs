// =============================================================================
// Trailing-window helpers shared by the indicator families
// =============================================================================
//
// All helpers return a column aligned 1:1 with the input.  Position `i` is
// `None` until `window` rows exist at or before `i`, and also whenever any
// value inside the window is `None`.  No look-ahead: row `i` only ever reads
// rows `i + 1 - window ..= i`.

use crate::types::Column;

/// Apply `reduce` to every fully-defined trailing window of length `window`.
pub fn rolling<F>(values: &[Option<f64>], window: usize, reduce: F) -> Column
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    let mut buf = Vec::with_capacity(window);
    for i in (window - 1)..values.len() {
        buf.clear();
        buf.extend(values[i + 1 - window..=i].iter().map_while(|v| *v));
        if buf.len() == window {
            out[i] = Some(reduce(&buf));
        }
    }
    out
}

/// Arithmetic mean of a non-empty slice.
pub fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample (n - 1) standard deviation.  A single value has no spread and
/// yields 0.
pub fn sample_std(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    let ss: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    (ss / (xs.len() - 1) as f64).max(0.0).sqrt()
}

pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Column {
    rolling(values, window, mean)
}

pub fn rolling_std(values: &[Option<f64>], window: usize) -> Column {
    rolling(values, window, sample_std)
}

pub fn rolling_min(values: &[Option<f64>], window: usize) -> Column {
    rolling(values, window, |xs| xs.iter().copied().fold(f64::INFINITY, f64::min))
}

pub fn rolling_max(values: &[Option<f64>], window: usize) -> Column {
    rolling(values, window, |xs| {
        xs.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

/// Element-wise combination of two aligned columns; `None` if either side is.
pub fn zip_with<F>(a: &[Option<f64>], b: &[Option<f64>], f: F) -> Column
where
    F: Fn(f64, f64) -> f64,
{
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| Some(f((*x)?, (*y)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defined(xs: &[f64]) -> Column {
        xs.iter().copied().map(Some).collect()
    }

    #[test]
    fn warm_up_rows_are_undefined() {
        let out = rolling_mean(&defined(&[1.0, 2.0, 3.0, 4.0]), 3);
        assert_eq!(out, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn window_longer_than_input() {
        let out = rolling_mean(&defined(&[1.0, 2.0]), 3);
        assert_eq!(out, vec![None, None]);
    }

    #[test]
    fn zero_window_is_all_undefined() {
        assert_eq!(rolling_mean(&defined(&[1.0, 2.0]), 0), vec![None, None]);
    }

    #[test]
    fn undefined_cell_poisons_every_window_it_touches() {
        let values = vec![Some(1.0), Some(2.0), None, Some(4.0), Some(5.0), Some(6.0)];
        let out = rolling_mean(&values, 2);
        assert_eq!(out, vec![None, Some(1.5), None, None, Some(4.5), Some(5.5)]);
    }

    #[test]
    fn min_max() {
        let values = defined(&[3.0, 1.0, 4.0, 1.0, 5.0]);
        assert_eq!(
            rolling_min(&values, 3),
            vec![None, None, Some(1.0), Some(1.0), Some(1.0)]
        );
        assert_eq!(
            rolling_max(&values, 3),
            vec![None, None, Some(4.0), Some(4.0), Some(5.0)]
        );
    }

    #[test]
    fn sample_std_known_value() {
        // Sample std of 2,4,4,4,5,5,7,9 = sqrt(32/7)
        let s = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((s - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(sample_std(&[5.0; 10]), 0.0);
    }

    #[test]
    fn zip_with_propagates_undefined() {
        let a = vec![Some(1.0), None, Some(3.0)];
        let b = vec![Some(1.0), Some(2.0), None];
        assert_eq!(zip_with(&a, &b, |x, y| x + y), vec![Some(2.0), None, None]);
    }
}
