//! Spreadsheet-to-Redmine import engine
//!
//! Maps template rows onto a hierarchy of remote entities (project →
//! optional parent issue → issue), deduplicating against entities that
//! already exist locally in this run or remotely on the server.

pub mod api;
pub mod config;
pub mod import;
pub mod sheet;
