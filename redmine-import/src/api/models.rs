//! Request and response types for the Redmine REST API

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A custom-field value attached to a project or issue.
///
/// Redmine keys custom fields by numeric id; values always travel as
/// strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldValue {
    pub id: i64,
    pub value: String,
}

/// A project to be created remotely.
///
/// Identity for dedup purposes is the normalized `identifier`, not the
/// display name.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub name: String,
    /// Normalized identifier, unique remotely (`[a-z0-9-]`).
    pub identifier: String,
    /// Parent project id; the client falls back to the configured root
    /// project when unset.
    pub parent_id: Option<i64>,
    pub custom_fields: Vec<CustomFieldValue>,
}

impl NewProject {
    pub fn new(name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: identifier.into(),
            parent_id: None,
            custom_fields: Vec::new(),
        }
    }

    /// Set a custom-field value, replacing any earlier value for the same id.
    pub fn set_custom_field(&mut self, id: i64, value: impl Into<String>) {
        upsert_custom_field(&mut self.custom_fields, id, value.into());
    }
}

/// An issue to be created remotely.
///
/// `project_id` and `tracker_id` are mandatory on the remote side; the
/// client rejects the issue before sending when either is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIssue {
    pub project_id: i64,
    pub subject: String,
    pub description: String,
    pub tracker_id: Option<i64>,
    pub assigned_to_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    /// Non-negative; negative spreadsheet values are discarded upstream.
    pub estimated_hours: Option<f64>,
    pub parent_issue_id: Option<i64>,
    pub custom_fields: Vec<CustomFieldValue>,
}

impl NewIssue {
    pub fn new(project_id: i64, subject: impl Into<String>) -> Self {
        Self {
            project_id,
            subject: subject.into(),
            description: String::new(),
            tracker_id: None,
            assigned_to_id: None,
            start_date: None,
            due_date: None,
            estimated_hours: None,
            parent_issue_id: None,
            custom_fields: Vec::new(),
        }
    }

    /// Set a custom-field value, replacing any earlier value for the same id.
    pub fn set_custom_field(&mut self, id: i64, value: impl Into<String>) {
        upsert_custom_field(&mut self.custom_fields, id, value.into());
    }
}

// Last write wins when a row supplies the same field id twice.
fn upsert_custom_field(fields: &mut Vec<CustomFieldValue>, id: i64, value: String) {
    match fields.iter_mut().find(|field| field.id == id) {
        Some(field) => field.value = value,
        None => fields.push(CustomFieldValue { id, value }),
    }
}

/// Wire shape of `POST /projects.json`.
#[derive(Serialize)]
pub(crate) struct ProjectPayload<'a> {
    pub project: ProjectBody<'a>,
}

#[derive(Serialize)]
pub(crate) struct ProjectBody<'a> {
    pub name: &'a str,
    pub identifier: &'a str,
    pub description: &'a str,
    pub parent_id: i64,
    pub inherit_members: bool,
    pub custom_fields: &'a [CustomFieldValue],
}

/// Wire shape of `POST /issues.json`.
#[derive(Serialize)]
pub(crate) struct IssuePayload<'a> {
    pub issue: IssueBody<'a>,
}

#[derive(Serialize)]
pub(crate) struct IssueBody<'a> {
    pub project_id: i64,
    pub subject: &'a str,
    pub description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    pub tracker_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_issue_id: Option<i64>,
    pub custom_fields: &'a [CustomFieldValue],
    pub status_id: i64,
}

/// `{"project": {"id": ...}}`, returned by both create and lookup.
#[derive(Debug, Deserialize)]
pub(crate) struct ProjectEnvelope {
    pub project: RemoteId,
}

/// `{"issue": {"id": ...}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct IssueEnvelope {
    pub issue: RemoteId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RemoteId {
    pub id: i64,
}

/// `{"issues": [...]}`, returned by the filtered issue query.
#[derive(Debug, Deserialize)]
pub(crate) struct IssueList {
    pub issues: Vec<IssueSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueSummary {
    pub id: i64,
    pub subject: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_payload_omits_absent_optionals() {
        let body = IssueBody {
            project_id: 12,
            subject: "Task",
            description: "",
            start_date: None,
            due_date: None,
            estimated_hours: None,
            tracker_id: 4,
            assigned_to_id: None,
            parent_issue_id: None,
            custom_fields: &[],
            status_id: 1,
        };
        let json = serde_json::to_value(IssuePayload { issue: body }).unwrap();
        let issue = &json["issue"];

        assert_eq!(issue["project_id"], 12);
        assert_eq!(issue["tracker_id"], 4);
        assert_eq!(issue["status_id"], 1);
        assert_eq!(issue["custom_fields"], serde_json::json!([]));
        // Absent optionals must be omitted, not serialized as null
        let keys = issue.as_object().unwrap();
        assert!(!keys.contains_key("start_date"));
        assert!(!keys.contains_key("due_date"));
        assert!(!keys.contains_key("estimated_hours"));
        assert!(!keys.contains_key("assigned_to_id"));
        assert!(!keys.contains_key("parent_issue_id"));
    }

    #[test]
    fn test_issue_payload_serializes_dates_as_iso() {
        let body = IssueBody {
            project_id: 12,
            subject: "Task",
            description: "desc",
            start_date: NaiveDate::from_ymd_opt(2024, 3, 5),
            due_date: NaiveDate::from_ymd_opt(2024, 12, 31),
            estimated_hours: Some(2.5),
            tracker_id: 4,
            assigned_to_id: Some(7),
            parent_issue_id: Some(99),
            custom_fields: &[],
            status_id: 1,
        };
        let json = serde_json::to_value(IssuePayload { issue: body }).unwrap();
        let issue = &json["issue"];

        assert_eq!(issue["start_date"], "2024-03-05");
        assert_eq!(issue["due_date"], "2024-12-31");
        assert_eq!(issue["estimated_hours"], 2.5);
        assert_eq!(issue["assigned_to_id"], 7);
        assert_eq!(issue["parent_issue_id"], 99);
    }

    #[test]
    fn test_project_payload_shape() {
        let fields = vec![CustomFieldValue {
            id: 43,
            value: "12".to_string(),
        }];
        let json = serde_json::to_value(ProjectPayload {
            project: ProjectBody {
                name: "Alpha",
                identifier: "alpha",
                description: "imported",
                parent_id: 3,
                inherit_members: true,
                custom_fields: &fields,
            },
        })
        .unwrap();
        let project = &json["project"];

        assert_eq!(project["name"], "Alpha");
        assert_eq!(project["identifier"], "alpha");
        assert_eq!(project["parent_id"], 3);
        assert_eq!(project["inherit_members"], true);
        assert_eq!(
            project["custom_fields"],
            serde_json::json!([{"id": 43, "value": "12"}])
        );
    }

    #[test]
    fn test_custom_field_last_write_wins() {
        let mut issue = NewIssue::new(1, "Task");
        issue.set_custom_field(20, "first");
        issue.set_custom_field(49, "other");
        issue.set_custom_field(20, "second");

        assert_eq!(issue.custom_fields.len(), 2);
        assert_eq!(issue.custom_fields[0].id, 20);
        assert_eq!(issue.custom_fields[0].value, "second");
        assert_eq!(issue.custom_fields[1].id, 49);
    }

    #[test]
    fn test_response_envelopes_ignore_extra_fields() {
        let created: ProjectEnvelope = serde_json::from_str(
            r#"{"project": {"id": 51, "name": "Alpha", "identifier": "alpha", "status": 1}}"#,
        )
        .unwrap();
        assert_eq!(created.project.id, 51);

        let list: IssueList = serde_json::from_str(
            r#"{"issues": [{"id": 7, "subject": "Task", "tracker": {"id": 4}}], "total_count": 1}"#,
        )
        .unwrap();
        assert_eq!(list.issues.len(), 1);
        assert_eq!(list.issues[0].subject, "Task");
    }
}
