//! Create-or-reuse resolution of projects, parent issues and leaf issues

use std::collections::HashMap;

use crate::api::{NewIssue, NewProject, TrackerApi};
use crate::config::CustomFieldsConfig;
use crate::import::ImportError;
use crate::import::columns::{RowCells, cols, parse_date, parse_hours, parse_id_prefix};
use crate::import::identifier;
use crate::sheet::TabularSource;

/// Subject used when the subject cell is blank.
const UNTITLED_SUBJECT: &str = "Untitled";

/// Ids resolved while processing one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowOutcome {
    pub project_id: i64,
    pub issue_id: i64,
}

/// Per-run memory of already resolved entities.
///
/// Entries are added once resolved (by reuse or creation) and never
/// evicted; the cache lives exactly as long as one import run.
#[derive(Default)]
struct EntityCache {
    /// normalized identifier → project id
    projects: HashMap<String, i64>,
    /// (project id, lower-cased subject) → parent issue id
    parent_issues: HashMap<(i64, String), i64>,
}

/// Resolves one row at a time: project, optional parent issue, leaf issue.
///
/// Consults the local cache before any remote lookup, and the remote lookup
/// before any create. Entities created in earlier phases are not rolled
/// back when a later phase fails.
pub struct Reconciler<'a, C: TrackerApi> {
    client: &'a C,
    fields: &'a CustomFieldsConfig,
    cache: EntityCache,
}

impl<'a, C: TrackerApi> Reconciler<'a, C> {
    pub fn new(client: &'a C, fields: &'a CustomFieldsConfig) -> Self {
        Self {
            client,
            fields,
            cache: EntityCache::default(),
        }
    }

    pub async fn process_row<S: TabularSource>(
        &mut self,
        cells: &RowCells<'_, S>,
    ) -> Result<RowOutcome, ImportError> {
        let project_id = self.resolve_project(cells).await?;
        let parent_issue_id = self.resolve_parent_issue(cells, project_id).await?;
        let issue_id = self.create_issue(cells, project_id, parent_issue_id).await?;
        Ok(RowOutcome {
            project_id,
            issue_id,
        })
    }

    /// Phase 1: cache → remote lookup → create.
    async fn resolve_project<S: TabularSource>(
        &mut self,
        cells: &RowCells<'_, S>,
    ) -> Result<i64, ImportError> {
        let name = cells
            .text(cols::PROJECT_NAME)
            .ok_or(ImportError::MissingField(cols::PROJECT_NAME))?;
        let raw_identifier = cells
            .text(cols::PROJECT_IDENTIFIER)
            .ok_or(ImportError::MissingField(cols::PROJECT_IDENTIFIER))?;
        let identifier = identifier::normalize(&raw_identifier);

        if let Some(&id) = self.cache.projects.get(&identifier) {
            log::debug!("project {identifier} cached as {id}");
            return Ok(id);
        }

        if let Some(id) = self.client.find_project_by_identifier(&identifier).await? {
            log::debug!("project {identifier} already exists remotely as {id}");
            self.cache.projects.insert(identifier, id);
            return Ok(id);
        }

        let mut project = NewProject::new(name, identifier.clone());
        // Unparsable parent cells fall back to the configured root project,
        // applied by the client
        project.parent_id = cells
            .text(cols::PROJECT_PARENT_ID)
            .and_then(|value| value.parse().ok());
        for (header, _) in cells.headers() {
            if let Ok(field_id) = header.parse::<i64>() {
                if self.fields.projects.contains(&field_id) {
                    if let Some(value) = cells.text(header) {
                        project.set_custom_field(field_id, value);
                    }
                }
            }
        }

        let id = self.client.create_project(&project).await?;
        log::info!("created project {:?} ({id})", project.name);
        self.cache.projects.insert(identifier, id);
        Ok(id)
    }

    /// Phase 2: a blank parent-subject cell means "no parent".
    async fn resolve_parent_issue<S: TabularSource>(
        &mut self,
        cells: &RowCells<'_, S>,
        project_id: i64,
    ) -> Result<Option<i64>, ImportError> {
        let Some(subject) = cells.text(cols::PARENT_SUBJECT) else {
            return Ok(None);
        };
        let tracker_value = cells
            .text(cols::PARENT_TRACKER_ID)
            .ok_or(ImportError::MissingField(cols::PARENT_TRACKER_ID))?;
        let tracker_id =
            parse_id_prefix(&tracker_value).ok_or_else(|| ImportError::InvalidField {
                column: cols::PARENT_TRACKER_ID,
                value: tracker_value,
            })?;

        let key = (project_id, subject.to_lowercase());
        if let Some(&id) = self.cache.parent_issues.get(&key) {
            log::debug!("parent issue {subject:?} cached as {id}");
            return Ok(Some(id));
        }

        if let Some(id) = self
            .client
            .find_issue_by_subject(project_id, &subject, Some(tracker_id))
            .await?
        {
            log::debug!("parent issue {subject:?} already exists as {id}");
            self.cache.parent_issues.insert(key, id);
            return Ok(Some(id));
        }

        let mut parent = NewIssue::new(project_id, subject.clone());
        parent.tracker_id = Some(tracker_id);
        let id = self.client.create_issue(&parent).await?;
        log::info!("created parent issue {subject:?} ({id}) in project {project_id}");
        self.cache.parent_issues.insert(key, id);
        Ok(Some(id))
    }

    /// Phase 3: map the remaining columns onto the leaf issue and create it.
    async fn create_issue<S: TabularSource>(
        &mut self,
        cells: &RowCells<'_, S>,
        project_id: i64,
        parent_issue_id: Option<i64>,
    ) -> Result<i64, ImportError> {
        let subject = cells
            .text(cols::SUBJECT)
            .unwrap_or_else(|| UNTITLED_SUBJECT.to_string());

        let mut issue = NewIssue::new(project_id, subject);
        issue.description = cells.text(cols::DESCRIPTION).unwrap_or_default();
        issue.parent_issue_id = parent_issue_id;

        // Malformed values in the typed columns are skipped, not errors
        for (header, _) in cells.headers() {
            let Some(value) = cells.text(header) else {
                continue;
            };
            match header {
                cols::TRACKER_ID => issue.tracker_id = parse_id_prefix(&value),
                cols::ASSIGNED_TO_ID => issue.assigned_to_id = parse_id_prefix(&value),
                cols::START_DATE => issue.start_date = parse_date(&value),
                cols::DUE_DATE => issue.due_date = parse_date(&value),
                cols::ESTIMATED_HOURS => issue.estimated_hours = parse_hours(&value),
                _ => {
                    if let Ok(field_id) = header.parse::<i64>() {
                        if self.fields.issues.contains(&field_id) {
                            issue.set_custom_field(field_id, value);
                        }
                    }
                }
            }
        }

        let id = self.client.create_issue(&issue).await?;
        log::info!("created issue {:?} ({id}) in project {project_id}", issue.subject);
        Ok(id)
    }
}
