//! Tabular data sources feeding the import

pub mod excel;

pub use excel::ExcelSheet;

/// Read-only grid of cells with 1-based row and column indices.
///
/// Row 1 carries the column headers; data rows start at row 3 (row 2 is
/// reserved for the template's instructional text).
pub trait TabularSource {
    /// Number of rows, counted from row 1.
    fn row_count(&self) -> u32;

    /// Number of columns, counted from column 1.
    fn column_count(&self) -> u32;

    /// Text of a cell; empty string for blank or out-of-range cells.
    fn cell_text(&self, row: u32, col: u32) -> String;
}

#[cfg(test)]
pub(crate) mod fake {
    use super::TabularSource;

    /// Row-major grid of strings for tests.
    pub(crate) struct FakeSheet {
        rows: Vec<Vec<String>>,
    }

    impl FakeSheet {
        pub fn new(rows: &[&[&str]]) -> Self {
            Self {
                rows: rows
                    .iter()
                    .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                    .collect(),
            }
        }
    }

    impl TabularSource for FakeSheet {
        fn row_count(&self) -> u32 {
            self.rows.len() as u32
        }

        fn column_count(&self) -> u32 {
            self.rows.iter().map(|row| row.len()).max().unwrap_or(0) as u32
        }

        fn cell_text(&self, row: u32, col: u32) -> String {
            if row == 0 || col == 0 {
                return String::new();
            }
            self.rows
                .get((row - 1) as usize)
                .and_then(|cells| cells.get((col - 1) as usize))
                .cloned()
                .unwrap_or_default()
        }
    }
}
