/// Trim surrounding whitespace. Quotes are part of the field.
pub fn clean_str(raw: &str) -> String {
    raw.trim().to_string()
}

/// Numeric coercion for a single cell. `None` marks the point as missing.
///
/// Surrounding whitespace is ignored. Anything that is not a finite float
/// (empty cells, `x`, `NaN`, `inf`) is missing.
pub fn parse_cell(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cell_accepts_plain_floats() {
        assert_eq!(parse_cell("10.5"), Some(10.5));
        assert_eq!(parse_cell(" 72 "), Some(72.0));
        assert_eq!(parse_cell("-0.25"), Some(-0.25));
        assert_eq!(parse_cell("1e2"), Some(100.0));
    }

    #[test]
    fn parse_cell_rejects_junk() {
        for raw in ["", "   ", "x", "N/A", "NaN", "inf", "10.5abc"] {
            assert_eq!(parse_cell(raw), None, "{raw:?}");
        }
    }

    #[test]
    fn clean_str_keeps_quotes() {
        assert_eq!(clean_str("  \"Date\" "), "\"Date\"");
        assert_eq!(clean_str(" plain\t"), "plain");
        assert_eq!(parse_cell(&clean_str("\"10.5\"")), None);
    }
}
