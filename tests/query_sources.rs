//! Configured sources dispatched through the plugin registry.

use async_trait::async_trait;
use json_inspector::{run_source_query, test_source_connection, InspectorConfig};
use query_plugins::jira::{Jira, JiraApi, JiraConnector, JiraError, SourceOptions};
use query_service::{QueryResult, QueryServiceRegistry};
use serde_json::{json, Value};

const CONFIG: &str = r#"
sources:
  tracker:
    kind: jira
    options:
      host: acme.atlassian.net
      username: ada
      password: secret
  broken:
    kind: jira
    options:
      host: acme.atlassian.net
"#;

/// Answers `find_issue` with the host it was opened for.
struct EchoJira {
    host: String,
}

#[async_trait]
impl JiraApi for EchoJira {
    async fn find_issue(&self, issue_id: &str) -> Result<Value, JiraError> {
        if issue_id == "PRJ-404" {
            return Err(JiraError::Api {
                status: 404,
                message: "Issue Does Not Exist".into(),
            });
        }
        Ok(json!({ "key": issue_id, "self": format!("https://{}/rest/api/2/issue/{issue_id}", self.host) }))
    }

    async fn update_assignee(&self, _: &str, _: &str) -> Result<Value, JiraError> {
        Ok(json!({}))
    }

    async fn add_new_issue(&self, _: &Value) -> Result<Value, JiraError> {
        Ok(json!({}))
    }

    async fn update_issue(&self, _: &str, _: &Value) -> Result<Value, JiraError> {
        Ok(json!({}))
    }

    async fn delete_issue(&self, _: &str) -> Result<Value, JiraError> {
        Ok(json!({}))
    }

    async fn get_server_info(&self) -> Result<Value, JiraError> {
        Ok(json!({ "version": "9.12.0" }))
    }
}

struct EchoConnector;

impl JiraConnector for EchoConnector {
    fn connect(&self, options: &SourceOptions) -> Result<Box<dyn JiraApi>, JiraError> {
        Ok(Box::new(EchoJira {
            host: options.host.clone(),
        }))
    }
}

fn registry() -> QueryServiceRegistry {
    let mut registry = QueryServiceRegistry::new();
    registry.register("jira", Jira::with_connector(EchoConnector));
    registry
}

#[tokio::test]
async fn configured_source_runs_through_registry() {
    let config = InspectorConfig::from_yaml(CONFIG).unwrap();
    let result = run_source_query(
        &config,
        &registry(),
        "tracker",
        &json!({ "operation": "find_issue", "issueId": "PRJ-1" }),
        "ds-tracker",
    )
    .await
    .unwrap();

    assert_eq!(
        result,
        QueryResult::ok(json!({
            "key": "PRJ-1",
            "self": "https://acme.atlassian.net/rest/api/2/issue/PRJ-1"
        }))
    );
}

#[tokio::test]
async fn vendor_errors_keep_their_status() {
    let config = InspectorConfig::from_yaml(CONFIG).unwrap();
    let err = run_source_query(
        &config,
        &registry(),
        "tracker",
        &json!({ "operation": "find_issue", "issue_id": "PRJ-404" }),
        "ds-tracker",
    )
    .await
    .unwrap_err();

    let err = err.downcast::<query_service::QueryError>().unwrap();
    assert_eq!(err.message, "Query could not be completed");
    assert_eq!(err.description, "Issue Does Not Exist");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn incomplete_source_options_are_rejected() {
    let config = InspectorConfig::from_yaml(CONFIG).unwrap();
    let err = test_source_connection(&config, &registry(), "broken")
        .await
        .unwrap_err();
    let err = err.downcast::<query_service::QueryError>().unwrap();
    assert_eq!(err.message, query_service::QueryError::INVALID_OPTIONS);

    let ok = test_source_connection(&config, &registry(), "tracker")
        .await
        .unwrap();
    assert!(ok.is_ok());
}

#[tokio::test]
async fn unknown_source_name() {
    let config = InspectorConfig::from_yaml(CONFIG).unwrap();
    let err = test_source_connection(&config, &registry(), "missing")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "unknown data source 'missing'");
}
