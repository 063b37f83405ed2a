use chrono::NaiveDate;

/// Parse a `"YYYY-MM-DD"` date label. A trailing time part
/// (`"2020-01-01 00:00:00"`, `"2020-01-01T00:00:00"`) is ignored.
pub fn parse_date_label(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.len() < 10 || !s.is_char_boundary(10) {
        return None;
    }
    NaiveDate::parse_from_str(&s[..10], "%Y-%m-%d").ok()
}

/// `"2020-01-01"` → `"Jan 2020"`; labels that do not parse are returned as-is.
pub fn month_year(s: &str) -> String {
    parse_date_label(s)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| s.to_string())
}
