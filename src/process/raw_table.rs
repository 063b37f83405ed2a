#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Column names from the first non-blank line. Column 0 holds date labels.
    pub headers: Vec<String>,
    /// Every following non-blank line, as a Vec of Strings (one per field).
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Position of `column` in the header, exact match only.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}
