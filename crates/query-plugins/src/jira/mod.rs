//! Jira query service.
//!
//! One operation per call against a freshly opened client:
//!
//! | operation      | vendor call                      |
//! |----------------|----------------------------------|
//! | `find_issue`   | `GET issue/{issue_id}`           |
//! | `assign_issue` | `PUT issue/{issue_id}/assignee`  |
//! | `create_issue` | `POST issue`                     |
//! | `update_issue` | `PUT issue/{issue_id}`           |
//! | `delete_issue` | `DELETE issue/{issue_id}`        |
//!
//! Vendor failures surface as `QueryError` with message
//! "Query could not be completed" and the vendor's message as description.

mod client;
mod types;

pub use client::{HttpJiraClient, HttpJiraConnector, JiraApi, JiraConnector, JiraError};
pub use types::{JiraOperation, QueryOptions, SourceOptions};

use async_trait::async_trait;
use query_service::{ConnectionTestResult, QueryError, QueryResult, QueryService};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct Jira {
    connector: Arc<dyn JiraConnector>,
}

impl Jira {
    pub fn new() -> Self {
        Self::with_connector(HttpJiraConnector)
    }

    pub fn with_connector(connector: impl JiraConnector + 'static) -> Self {
        Self {
            connector: Arc::new(connector),
        }
    }
}

impl Default for Jira {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryService for Jira {
    type SourceOptions = SourceOptions;
    type QueryOptions = QueryOptions;

    async fn run(
        &self,
        source_options: &SourceOptions,
        query_options: &QueryOptions,
        data_source_id: &str,
    ) -> query_service::Result<QueryResult> {
        let operation = query_options.operation;
        debug!(
            data_source_id,
            operation = operation.as_str(),
            "Running Jira query"
        );

        let client = self
            .connector
            .connect(source_options)
            .map_err(|e| failed(operation, e))?;

        let outcome = match operation {
            JiraOperation::FindIssue => client.find_issue(query_options.issue_id()?).await,
            JiraOperation::AssignIssue => {
                client
                    .update_assignee(query_options.issue_id()?, query_options.assignee_name()?)
                    .await
            }
            JiraOperation::CreateIssue => {
                client.add_new_issue(&query_options.body_object()?).await
            }
            JiraOperation::UpdateIssue => {
                let body = query_options.body_object()?;
                client.update_issue(query_options.issue_id()?, &body).await
            }
            JiraOperation::DeleteIssue => client.delete_issue(query_options.issue_id()?).await,
        };

        outcome
            .map(QueryResult::ok)
            .map_err(|e| failed(operation, e))
    }

    async fn test_connection(
        &self,
        source_options: &SourceOptions,
    ) -> query_service::Result<ConnectionTestResult> {
        let client = self
            .connector
            .connect(source_options)
            .map_err(|e| QueryError::connection_failed(&e))?;

        client
            .get_server_info()
            .await
            .map_err(|e| QueryError::connection_failed(&e))?;

        info!(host = %source_options.host, "Jira connection verified");
        Ok(ConnectionTestResult::ok())
    }
}

fn failed(operation: JiraOperation, error: JiraError) -> QueryError {
    warn!(operation = operation.as_str(), error = %error, "Jira query failed");
    QueryError::query_failed(&error)
}
