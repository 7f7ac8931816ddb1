//! Row iteration and per-row failure isolation

use crate::api::TrackerApi;
use crate::config::CustomFieldsConfig;
use crate::import::ImportError;
use crate::import::columns::{FIRST_DATA_ROW, HeaderMap, RowCells};
use crate::import::reconciler::Reconciler;
use crate::sheet::TabularSource;

/// Aggregate result of one run.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Rows that produced an issue.
    pub processed: usize,
    pub failures: Vec<RowFailure>,
}

/// One failed row; the run continues past it.
#[derive(Debug)]
pub struct RowFailure {
    pub row: u32,
    pub error: ImportError,
}

/// Walks the sheet and feeds every non-blank row to one [`Reconciler`],
/// so its caches span the whole run.
pub struct Importer<'a, C: TrackerApi> {
    client: &'a C,
    fields: &'a CustomFieldsConfig,
}

impl<'a, C: TrackerApi> Importer<'a, C> {
    pub fn new(client: &'a C, fields: &'a CustomFieldsConfig) -> Self {
        Self { client, fields }
    }

    /// Import every data row of the sheet.
    ///
    /// A failing row is logged, recorded in the report and skipped; the run
    /// itself never aborts. Nothing created by earlier rows (or earlier
    /// phases of the failing row) is rolled back.
    pub async fn run<S: TabularSource>(&self, sheet: &S) -> ImportReport {
        let headers = HeaderMap::from_sheet(sheet);
        log::info!("found {} columns", headers.len());

        let mut reconciler = Reconciler::new(self.client, self.fields);
        let mut report = ImportReport::default();

        for row in FIRST_DATA_ROW..=sheet.row_count() {
            if is_blank_row(sheet, row) {
                log::debug!("row {row}: blank, skipped");
                continue;
            }

            let cells = RowCells::new(sheet, &headers, row);
            match reconciler.process_row(&cells).await {
                Ok(outcome) => {
                    log::debug!(
                        "row {row}: issue {} in project {}",
                        outcome.issue_id,
                        outcome.project_id
                    );
                    report.processed += 1;
                }
                Err(error) => {
                    log::error!("row {row}: {error}");
                    report.failures.push(RowFailure { row, error });
                }
            }
        }

        log::info!(
            "processed {} issues, {} rows failed",
            report.processed,
            report.failures.len()
        );
        report
    }
}

// A row counts as blank when its first two cells are both empty.
fn is_blank_row<S: TabularSource>(sheet: &S, row: u32) -> bool {
    sheet.cell_text(row, 1).trim().is_empty() && sheet.cell_text(row, 2).trim().is_empty()
}
