//! Column layout of the import template and cell-value parsers

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::sheet::TabularSource;

/// Row carrying the column headers.
pub const HEADER_ROW: u32 = 1;
/// First data row; row 2 is the template's instructional text.
pub const FIRST_DATA_ROW: u32 = 3;

/// Fixed header names of the import template. Custom-field columns use the
/// bare numeric field id as their header.
pub mod cols {
    pub const PROJECT_NAME: &str = "name (projects)";
    pub const PROJECT_IDENTIFIER: &str = "identifier (projects)";
    pub const PROJECT_PARENT_ID: &str = "parent_id (projects)";
    pub const PARENT_SUBJECT: &str = "parent_subject (issues)";
    pub const PARENT_TRACKER_ID: &str = "parent_tracker_id (issues)";
    pub const SUBJECT: &str = "subject (issues)";
    pub const DESCRIPTION: &str = "description (issues)";
    pub const TRACKER_ID: &str = "tracker_id (issues)";
    pub const ASSIGNED_TO_ID: &str = "assigned_to_id (issues)";
    pub const START_DATE: &str = "start_date (issues)";
    pub const DUE_DATE: &str = "due_date (issues)";
    pub const ESTIMATED_HOURS: &str = "estimated_hours (issues)";
}

/// Header-name → column-index map built from row 1.
pub struct HeaderMap {
    by_name: HashMap<String, u32>,
    ordered: Vec<(String, u32)>,
}

impl HeaderMap {
    pub fn from_sheet<S: TabularSource>(sheet: &S) -> Self {
        let mut headers = Self {
            by_name: HashMap::new(),
            ordered: Vec::new(),
        };
        for col in 1..=sheet.column_count() {
            let name = sheet.cell_text(HEADER_ROW, col).trim().to_string();
            if name.is_empty() {
                continue;
            }
            match headers.by_name.insert(name.clone(), col) {
                // Duplicated header: the right-most column wins
                Some(_) => {
                    if let Some(entry) = headers
                        .ordered
                        .iter_mut()
                        .find(|(existing, _)| *existing == name)
                    {
                        entry.1 = col;
                    }
                }
                None => headers.ordered.push((name, col)),
            }
        }
        headers
    }

    pub fn column(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    /// Headers in sheet order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.ordered.iter().map(|(name, col)| (name.as_str(), *col))
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

/// One data row viewed through the header map.
pub struct RowCells<'a, S: TabularSource> {
    sheet: &'a S,
    headers: &'a HeaderMap,
    row: u32,
}

impl<'a, S: TabularSource> RowCells<'a, S> {
    pub fn new(sheet: &'a S, headers: &'a HeaderMap, row: u32) -> Self {
        Self {
            sheet,
            headers,
            row,
        }
    }

    /// Trimmed cell text under a named column; `None` when the column is
    /// absent from the sheet or the cell is blank.
    pub fn text(&self, column: &str) -> Option<String> {
        let col = self.headers.column(column)?;
        let value = self.sheet.cell_text(self.row, col);
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, u32)> {
        self.headers.iter()
    }
}

/// Numeric prefix of a compound `"<id>_<label>"` value (`"4_Feature"` → 4).
pub fn parse_id_prefix(value: &str) -> Option<i64> {
    value
        .split('_')
        .next()
        .and_then(|prefix| prefix.trim().parse().ok())
}

// Formats tried in order when reading date cells: ISO (also how the Excel
// adapter renders date cells), ISO with a time part, and the dot/slash
// day-first forms the templates are filled with by hand.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y-%m-%d %H:%M:%S", "%d.%m.%Y", "%d/%m/%Y"];

/// Parse a date cell; `None` on any unrecognized shape.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Parse an estimated-hours cell; accepts a decimal comma, rejects
/// negatives and non-finite values.
pub fn parse_hours(value: &str) -> Option<f64> {
    value
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|hours| hours.is_finite() && *hours >= 0.0)
}
