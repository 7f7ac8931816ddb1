//! In-memory [`TrackerApi`] used by reconciler and driver tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::client::TrackerApi;
use super::error::ApiError;
use super::models::{NewIssue, NewProject};

/// Plays a small remote tracker and records every call.
///
/// Seed pre-existing remote state with `seed_project`/`seed_issue`; force
/// creation failures with `fail_issue_subject`. Created entities get ids
/// from a counter starting at 100 so tests can assert concrete values.
pub(crate) struct RecordingTracker {
    state: Mutex<State>,
}

struct State {
    next_id: i64,
    remote_projects: HashMap<String, i64>,
    remote_issues: Vec<RemoteIssue>,
    created_projects: Vec<NewProject>,
    created_issues: Vec<NewIssue>,
    project_lookups: u32,
    issue_lookups: u32,
    failing_subjects: Vec<String>,
}

struct RemoteIssue {
    project_id: i64,
    subject: String,
    id: i64,
}

impl RecordingTracker {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 100,
                remote_projects: HashMap::new(),
                remote_issues: Vec::new(),
                created_projects: Vec::new(),
                created_issues: Vec::new(),
                project_lookups: 0,
                issue_lookups: 0,
                failing_subjects: Vec::new(),
            }),
        }
    }

    pub fn seed_project(&self, identifier: &str, id: i64) {
        self.state
            .lock()
            .unwrap()
            .remote_projects
            .insert(identifier.to_string(), id);
    }

    pub fn seed_issue(&self, project_id: i64, subject: &str, id: i64) {
        self.state.lock().unwrap().remote_issues.push(RemoteIssue {
            project_id,
            subject: subject.to_string(),
            id,
        });
    }

    /// Any create_issue with this subject answers HTTP 422.
    pub fn fail_issue_subject(&self, subject: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_subjects
            .push(subject.to_string());
    }

    pub fn created_projects(&self) -> Vec<NewProject> {
        self.state.lock().unwrap().created_projects.clone()
    }

    pub fn created_issues(&self) -> Vec<NewIssue> {
        self.state.lock().unwrap().created_issues.clone()
    }

    pub fn project_lookups(&self) -> u32 {
        self.state.lock().unwrap().project_lookups
    }

    pub fn issue_lookups(&self) -> u32 {
        self.state.lock().unwrap().issue_lookups
    }
}

#[async_trait]
impl TrackerApi for RecordingTracker {
    async fn create_project(&self, project: &NewProject) -> Result<i64, ApiError> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        state.created_projects.push(project.clone());
        state
            .remote_projects
            .insert(project.identifier.clone(), id);
        Ok(id)
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<i64, ApiError> {
        // Same fail-fast contract as the real client
        if issue.project_id <= 0 {
            return Err(ApiError::Validation(format!(
                "issue {:?} has no project id",
                issue.subject
            )));
        }
        if !issue.tracker_id.is_some_and(|id| id > 0) {
            return Err(ApiError::Validation(format!(
                "issue {:?} has no tracker id",
                issue.subject
            )));
        }

        let mut state = self.state.lock().unwrap();
        if state.failing_subjects.contains(&issue.subject) {
            return Err(ApiError::Remote {
                status: 422,
                body: "Unprocessable Entity".to_string(),
            });
        }

        let id = state.next_id;
        state.next_id += 1;
        state.created_issues.push(issue.clone());
        state.remote_issues.push(RemoteIssue {
            project_id: issue.project_id,
            subject: issue.subject.clone(),
            id,
        });
        Ok(id)
    }

    async fn find_project_by_identifier(&self, identifier: &str) -> Result<Option<i64>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.project_lookups += 1;
        Ok(state.remote_projects.get(identifier).copied())
    }

    async fn find_issue_by_subject(
        &self,
        project_id: i64,
        subject: &str,
        _tracker_id: Option<i64>,
    ) -> Result<Option<i64>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.issue_lookups += 1;
        let wanted = subject.trim().to_lowercase();
        Ok(state
            .remote_issues
            .iter()
            .find(|issue| {
                issue.project_id == project_id && issue.subject.trim().to_lowercase() == wanted
            })
            .map(|issue| issue.id))
    }
}
