//! calamine-backed workbook access

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use chrono::NaiveTime;

use super::TabularSource;

/// One worksheet of an `.xlsx`/`.xlsm` workbook, loaded eagerly.
pub struct ExcelSheet {
    range: Range<Data>,
}

impl ExcelSheet {
    /// Open `path` and load the named sheet, or the first sheet when `None`.
    pub fn open(path: &Path, sheet: Option<&str>) -> Result<Self> {
        let mut workbook: Xlsx<_> = open_workbook(path)
            .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

        let sheet_name = match sheet {
            Some(name) => name.to_string(),
            None => workbook
                .sheet_names()
                .first()
                .context("Workbook has no sheets")?
                .clone(),
        };

        let range = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

        log::debug!(
            "loaded sheet {:?} from {} ({} rows)",
            sheet_name,
            path.display(),
            range.end().map(|(row, _)| row + 1).unwrap_or(0)
        );
        Ok(Self { range })
    }
}

impl TabularSource for ExcelSheet {
    fn row_count(&self) -> u32 {
        self.range.end().map(|(row, _)| row + 1).unwrap_or(0)
    }

    fn column_count(&self) -> u32 {
        self.range.end().map(|(_, col)| col + 1).unwrap_or(0)
    }

    fn cell_text(&self, row: u32, col: u32) -> String {
        if row == 0 || col == 0 {
            return String::new();
        }
        match self.range.get_value((row - 1, col - 1)) {
            Some(value) => render_cell(value),
            None => String::new(),
        }
    }
}

fn render_cell(value: &Data) -> String {
    match value {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) if naive.time() == NaiveTime::MIN => {
                naive.date().format("%Y-%m-%d").to_string()
            }
            Some(naive) => naive.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => String::new(),
        },
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(_) | Data::Error(_) | Data::Empty => String::new(),
    }
}
