// =============================================================================
// Type Coercer — permissive string → decimal conversion
// =============================================================================
//
// Upstream feeds format numbers inconsistently ("1,234.50", " 98.1 ").  Group
// separators are stripped before parsing (decimal commas are not supported); a cell
// that still fails to parse becomes `None` instead of failing the request.
// Rows holding such cells are dropped by the caller after indicators run.

/// Characters treated as digit-group separators.
const GROUP_SEPARATORS: &[char] = &[',', ' ', '\u{a0}', '\u{202f}', '\''];

/// Parse one cell into a finite `f64`.
///
/// Returns `None` for empty cells, non-numeric text, and values that parse to
/// NaN or infinity.
pub fn parse_decimal(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .trim()
        .chars()
        .filter(|c| !GROUP_SEPARATORS.contains(c))
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce a whole column.  The second value is the number of cells that fell
/// back to `None`.
pub fn coerce_column<'a>(cells: impl Iterator<Item = &'a str>) -> (Vec<Option<f64>>, usize) {
    let mut undefined = 0;
    let values = cells
        .map(|cell| {
            let v = parse_decimal(cell);
            if v.is_none() {
                undefined += 1;
            }
            v
        })
        .collect();
    (values, undefined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_numbers() {
        assert_eq!(parse_decimal("42"), Some(42.0));
        assert_eq!(parse_decimal("-0.5"), Some(-0.5));
        assert_eq!(parse_decimal(" 98.1 "), Some(98.1));
    }

    #[test]
    fn thousands_separators_are_stripped() {
        assert_eq!(parse_decimal("1,234.50"), Some(1234.5));
        assert_eq!(parse_decimal("38,512"), Some(38512.0));
        assert_eq!(parse_decimal("1\u{a0}000"), Some(1000.0));
        assert_eq!(parse_decimal("12'345.6"), Some(12345.6));
    }

    #[test]
    fn garbage_becomes_undefined() {
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("   "), None);
        assert_eq!(parse_decimal("-"), None);
        assert_eq!(parse_decimal("n/a"), None);
        assert_eq!(parse_decimal("1.2.3"), None);
    }

    #[test]
    fn non_finite_becomes_undefined() {
        assert_eq!(parse_decimal("NaN"), None);
        assert_eq!(parse_decimal("inf"), None);
        assert_eq!(parse_decimal("-infinity"), None);
    }

    #[test]
    fn column_counts_fallbacks() {
        let cells = ["1", "x", "2,000", ""];
        let (values, undefined) = coerce_column(cells.iter().copied());
        assert_eq!(values, vec![Some(1.0), None, Some(2000.0), None]);
        assert_eq!(undefined, 2);
    }
}
