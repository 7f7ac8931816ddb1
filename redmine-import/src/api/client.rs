//! HTTP client for the Redmine REST API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::models::{
    IssueBody, IssueEnvelope, IssueList, IssuePayload, NewIssue, NewProject, ProjectBody,
    ProjectEnvelope, ProjectPayload,
};
use crate::config::RedmineConfig;

/// Header carrying the API key on every request.
const API_KEY_HEADER: &str = "X-Redmine-API-Key";

/// Description stamped on every project this tool creates.
const PROJECT_DESCRIPTION: &str = "Created by redmine-import";

/// Status assigned to newly created issues ("New" in a stock Redmine).
const NEW_ISSUE_STATUS_ID: i64 = 1;

/// Create and lookup operations against a project tracker.
///
/// The production implementation is [`RedmineClient`]; tests substitute an
/// in-memory recording implementation.
#[async_trait]
pub trait TrackerApi: Send + Sync {
    /// Create a project, returning its new remote id.
    async fn create_project(&self, project: &NewProject) -> Result<i64, ApiError>;

    /// Create an issue, returning its new remote id.
    ///
    /// Fails with [`ApiError::Validation`] before sending anything when the
    /// project id or tracker id is missing.
    async fn create_issue(&self, issue: &NewIssue) -> Result<i64, ApiError>;

    /// Look up a project by its normalized identifier.
    ///
    /// `Ok(None)` means the project does not exist remotely; only transport
    /// failures and non-404 error statuses are errors.
    async fn find_project_by_identifier(&self, identifier: &str) -> Result<Option<i64>, ApiError>;

    /// Look up an issue within a project by exact subject match
    /// (case-insensitive), optionally restricted to one tracker.
    async fn find_issue_by_subject(
        &self,
        project_id: i64,
        subject: &str,
        tracker_id: Option<i64>,
    ) -> Result<Option<i64>, ApiError>;
}

/// reqwest-backed [`TrackerApi`] implementation.
pub struct RedmineClient {
    http: reqwest::Client,
    base_url: String,
    root_project_id: i64,
}

impl RedmineClient {
    /// Build a client from configuration.
    ///
    /// The API key travels as a default header on every request; the
    /// configured timeout applies per request.
    pub fn new(config: &RedmineConfig) -> Result<Self, ApiError> {
        if config.base_url.trim().is_empty() {
            return Err(ApiError::Validation(
                "redmine base url is not configured".to_string(),
            ));
        }
        if config.api_key.trim().is_empty() {
            return Err(ApiError::Validation(
                "redmine api key is not configured".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key).map_err(|_| {
            ApiError::Validation("redmine api key contains invalid header characters".to_string())
        })?;
        headers.insert(API_KEY_HEADER, key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            root_project_id: config.root_project_id,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // Rows that name no parent land under the configured root project.
    fn project_payload<'a>(&self, project: &'a NewProject) -> ProjectPayload<'a> {
        ProjectPayload {
            project: ProjectBody {
                name: &project.name,
                identifier: &project.identifier,
                description: PROJECT_DESCRIPTION,
                parent_id: project.parent_id.unwrap_or(self.root_project_id),
                inherit_members: true,
                custom_fields: &project.custom_fields,
            },
        }
    }
}

#[async_trait]
impl TrackerApi for RedmineClient {
    async fn create_project(&self, project: &NewProject) -> Result<i64, ApiError> {
        let payload = self.project_payload(project);

        log::debug!("POST /projects.json identifier={}", project.identifier);
        let response = self
            .http
            .post(self.url("/projects.json"))
            .json(&payload)
            .send()
            .await?;
        let created: ProjectEnvelope = parse_success(response).await?;
        Ok(created.project.id)
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<i64, ApiError> {
        if issue.project_id <= 0 {
            return Err(ApiError::Validation(format!(
                "issue {:?} has no project id",
                issue.subject
            )));
        }
        let tracker_id = match issue.tracker_id {
            Some(id) if id > 0 => id,
            _ => {
                return Err(ApiError::Validation(format!(
                    "issue {:?} has no tracker id",
                    issue.subject
                )));
            }
        };

        let payload = IssuePayload {
            issue: IssueBody {
                project_id: issue.project_id,
                subject: &issue.subject,
                description: &issue.description,
                start_date: issue.start_date,
                due_date: issue.due_date,
                estimated_hours: issue.estimated_hours,
                tracker_id,
                assigned_to_id: issue.assigned_to_id,
                parent_issue_id: issue.parent_issue_id,
                custom_fields: &issue.custom_fields,
                status_id: NEW_ISSUE_STATUS_ID,
            },
        };

        log::debug!(
            "POST /issues.json subject={:?} project={}",
            issue.subject,
            issue.project_id
        );
        let response = self
            .http
            .post(self.url("/issues.json"))
            .json(&payload)
            .send()
            .await?;
        let created: IssueEnvelope = parse_success(response).await?;
        Ok(created.issue.id)
    }

    async fn find_project_by_identifier(&self, identifier: &str) -> Result<Option<i64>, ApiError> {
        log::debug!("GET /projects/{identifier}.json");
        let response = self
            .http
            .get(self.url(&format!("/projects/{identifier}.json")))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let found: ProjectEnvelope = parse_success(response).await?;
        Ok(Some(found.project.id))
    }

    async fn find_issue_by_subject(
        &self,
        project_id: i64,
        subject: &str,
        tracker_id: Option<i64>,
    ) -> Result<Option<i64>, ApiError> {
        let mut query: Vec<(&str, String)> = vec![
            ("project_id", project_id.to_string()),
            ("subject", subject.to_string()),
        ];
        if let Some(tracker_id) = tracker_id {
            query.push(("tracker_id", tracker_id.to_string()));
        }

        log::debug!("GET /issues.json subject={subject:?} project={project_id}");
        let response = self
            .http
            .get(self.url("/issues.json"))
            .query(&query)
            .send()
            .await?;
        let list: IssueList = parse_success(response).await?;
        Ok(exact_subject_match(list, subject))
    }
}

// The remote filter can match on substrings, so the exact subject has to
// be re-verified locally. Case and surrounding whitespace are ignored.
fn exact_subject_match(list: IssueList, subject: &str) -> Option<i64> {
    let wanted = subject.trim().to_lowercase();
    list.issues
        .into_iter()
        .find(|issue| issue.subject.trim().to_lowercase() == wanted)
        .map(|issue| issue.id)
}

async fn parse_success<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Remote {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json::<T>().await?)
}
