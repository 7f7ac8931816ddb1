//! The import reconciliation engine
//!
//! Maps spreadsheet rows to a hierarchy of remote entities (project →
//! optional parent issue → issue), reusing whatever already exists locally
//! or remotely and creating the rest.

pub mod columns;
pub mod driver;
pub mod identifier;
pub mod reconciler;

pub use driver::{ImportReport, Importer, RowFailure};
pub use reconciler::{Reconciler, RowOutcome};

use thiserror::Error;

use crate::api::ApiError;

/// Why one spreadsheet row could not be imported.
#[derive(Debug, Error)]
pub enum ImportError {
    /// A required column is absent from the sheet or blank in this row.
    #[error("required column {0:?} is missing or empty")]
    MissingField(&'static str),

    /// A required column holds a value the importer cannot use.
    #[error("column {column:?} holds unusable value {value:?}")]
    InvalidField {
        column: &'static str,
        value: String,
    },

    #[error(transparent)]
    Api(#[from] ApiError),
}
