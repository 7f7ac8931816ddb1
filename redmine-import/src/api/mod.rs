//! Redmine REST API client and wire types

pub mod client;
pub mod error;
pub mod models;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{RedmineClient, TrackerApi};
pub use error::ApiError;
pub use models::{CustomFieldValue, NewIssue, NewProject};
