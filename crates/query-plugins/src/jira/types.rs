use query_service::QueryError;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;

/// Connection settings for a Jira site.
#[derive(Clone, Deserialize)]
pub struct SourceOptions {
    /// Host name, optionally with a port (`acme.atlassian.net`).
    pub host: String,
    pub username: String,
    /// Password or API token.
    pub password: String,
}

impl fmt::Debug for SourceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceOptions")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JiraOperation {
    FindIssue,
    AssignIssue,
    CreateIssue,
    UpdateIssue,
    DeleteIssue,
}

impl JiraOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FindIssue => "find_issue",
            Self::AssignIssue => "assign_issue",
            Self::CreateIssue => "create_issue",
            Self::UpdateIssue => "update_issue",
            Self::DeleteIssue => "delete_issue",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryOptions {
    pub operation: JiraOperation,
    #[serde(default, alias = "issueId")]
    pub issue_id: Option<String>,
    /// Issue fields, either as JSON or as a string holding JSON.
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default, alias = "assigneeName")]
    pub assignee_name: Option<String>,
}

impl QueryOptions {
    pub fn issue_id(&self) -> Result<&str, QueryError> {
        required(self.issue_id.as_deref(), "issue_id", self.operation)
    }

    pub fn assignee_name(&self) -> Result<&str, QueryError> {
        required(self.assignee_name.as_deref(), "assignee_name", self.operation)
    }

    /// The body as a JSON value. Absent or empty bodies are `{}`.
    pub fn body_object(&self) -> Result<Value, QueryError> {
        match &self.body {
            None | Some(Value::Null) => Ok(json!({})),
            Some(Value::String(text)) if text.trim().is_empty() => Ok(json!({})),
            Some(Value::String(text)) => json5::from_str(text)
                .map_err(|e| QueryError::invalid_options(format!("body is not valid JSON5: {e}"))),
            Some(value) => Ok(value.clone()),
        }
    }
}

fn required<'a>(
    value: Option<&'a str>,
    name: &str,
    operation: JiraOperation,
) -> Result<&'a str, QueryError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(QueryError::invalid_options(format!(
            "{name} is required for {}",
            operation.as_str()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_query_options_accept_camel_case_aliases() {
        let options: QueryOptions = serde_json::from_value(json!({
            "operation": "assign_issue",
            "issueId": "PRJ-7",
            "assigneeName": "ada"
        }))
        .unwrap();
        assert_eq!(options.operation, JiraOperation::AssignIssue);
        assert_eq!(options.issue_id().unwrap(), "PRJ-7");
        assert_eq!(options.assignee_name().unwrap(), "ada");
    }

    #[test]
    fn test_body_may_be_a_json_string() {
        let options: QueryOptions = serde_json::from_value(json!({
            "operation": "create_issue",
            "body": "{\"fields\": {\"summary\": \"Broken build\"}}"
        }))
        .unwrap();
        assert_eq!(
            options.body_object().unwrap(),
            json!({ "fields": { "summary": "Broken build" } })
        );
    }

    #[test]
    fn test_body_string_accepts_relaxed_syntax() {
        let options: QueryOptions = serde_json::from_value(json!({
            "operation": "create_issue",
            "body": "{fields: {summary: 'Broken build', project: {key: 'PRJ'},},}"
        }))
        .unwrap();
        assert_eq!(
            options.body_object().unwrap(),
            json!({ "fields": { "summary": "Broken build", "project": { "key": "PRJ" } } })
        );

        let broken: QueryOptions = serde_json::from_value(json!({
            "operation": "create_issue",
            "body": "{fields: "
        }))
        .unwrap();
        let err = broken.body_object().unwrap_err();
        assert_eq!(err.message, QueryError::INVALID_OPTIONS);
    }

    #[test]
    fn test_missing_body_is_empty_object() {
        let options: QueryOptions =
            serde_json::from_value(json!({ "operation": "update_issue", "body": "" })).unwrap();
        assert_eq!(options.body_object().unwrap(), json!({}));
    }

    #[test]
    fn test_missing_issue_id_is_rejected() {
        let options: QueryOptions =
            serde_json::from_value(json!({ "operation": "find_issue" })).unwrap();
        let err = options.issue_id().unwrap_err();
        assert_eq!(err.description, "issue_id is required for find_issue");
    }

    #[test]
    fn test_unknown_operation_fails_to_deserialize() {
        let result = serde_json::from_value::<QueryOptions>(json!({ "operation": "search" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let source = SourceOptions {
            host: "acme.atlassian.net".into(),
            username: "ada".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{source:?}").contains("hunter2"));
    }
}
