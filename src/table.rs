/// One team-season record: raw cell texts in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<String>,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    pub fn get(&self, column: usize) -> Option<&str> {
        self.cells.get(column).map(|s| s.as_str())
    }
}

/// Table as fetched, rows in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    /// Index of the first header equal to `name`; falls back to a
    /// case-insensitive match.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .or_else(|| self.headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_prefers_exact_case() {
        let table = Table::new(
            vec!["xg".to_string(), "xG".to_string(), "GF".to_string()],
            Vec::new(),
        );
        assert_eq!(table.column("xG"), Some(1));
        assert_eq!(table.column("gf"), Some(2));
        assert_eq!(table.column("Squad"), None);
    }
}
