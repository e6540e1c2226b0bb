//! Jira REST API v2 client
//!
//! `JiraApi` is the call surface the plugin needs; `JiraConnector` opens one
//! per invocation. The HTTP implementation talks https with certificate
//! verification and basic auth.

use super::types::SourceOptions;
use anyhow::Context;
use async_trait::async_trait;
use query_service::ErrorCause;
use reqwest::{Client, Method, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const API_VERSION: &str = "2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum JiraError {
    #[error("invalid Jira host '{0}'")]
    InvalidHost(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{0:#}")]
    Transport(anyhow::Error),

    #[error("could not decode Jira response: {0}")]
    Decode(String),
}

impl ErrorCause for JiraError {
    fn kind(&self) -> &'static str {
        match self {
            Self::InvalidHost(_) => "config",
            Self::Api { .. } => "http",
            Self::Transport(_) => "transport",
            Self::Decode(_) => "decode",
        }
    }

    fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[async_trait]
pub trait JiraApi: Send + Sync {
    async fn find_issue(&self, issue_id: &str) -> Result<Value, JiraError>;

    async fn update_assignee(&self, issue_id: &str, assignee_name: &str)
        -> Result<Value, JiraError>;

    async fn add_new_issue(&self, issue: &Value) -> Result<Value, JiraError>;

    async fn update_issue(&self, issue_id: &str, update: &Value) -> Result<Value, JiraError>;

    async fn delete_issue(&self, issue_id: &str) -> Result<Value, JiraError>;

    async fn get_server_info(&self) -> Result<Value, JiraError>;
}

/// Opens a `JiraApi` for a set of source options.
pub trait JiraConnector: Send + Sync {
    fn connect(&self, options: &SourceOptions) -> Result<Box<dyn JiraApi>, JiraError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HttpJiraConnector;

impl JiraConnector for HttpJiraConnector {
    fn connect(&self, options: &SourceOptions) -> Result<Box<dyn JiraApi>, JiraError> {
        Ok(Box::new(HttpJiraClient::new(options)?))
    }
}

pub struct HttpJiraClient {
    http: Client,
    base: Url,
    username: String,
    password: String,
}

impl HttpJiraClient {
    pub fn new(options: &SourceOptions) -> Result<Self, JiraError> {
        let base = base_url(&options.host)?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")
            .map_err(JiraError::Transport)?;

        Ok(Self {
            http,
            base,
            username: options.username.clone(),
            password: options.password.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, JiraError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| JiraError::InvalidHost(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&Value>,
    ) -> Result<Value, JiraError> {
        let url = self.endpoint(segments)?;
        debug!(%method, path = url.path(), "Jira request");

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("{} {} failed", method, url.path()))
            .map_err(JiraError::Transport)?;

        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response from {}", url.path()))
            .map_err(JiraError::Transport)?;

        if !status.is_success() {
            return Err(JiraError::Api {
                status: status.as_u16(),
                message: api_error_message(status, &text),
            });
        }

        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return Ok(json!({}));
        }

        serde_json::from_str(&text).map_err(|e| JiraError::Decode(e.to_string()))
    }
}

#[async_trait]
impl JiraApi for HttpJiraClient {
    async fn find_issue(&self, issue_id: &str) -> Result<Value, JiraError> {
        self.send(Method::GET, &["issue", issue_id], None).await
    }

    async fn update_assignee(
        &self,
        issue_id: &str,
        assignee_name: &str,
    ) -> Result<Value, JiraError> {
        let body = json!({ "name": assignee_name });
        self.send(Method::PUT, &["issue", issue_id, "assignee"], Some(&body))
            .await
    }

    async fn add_new_issue(&self, issue: &Value) -> Result<Value, JiraError> {
        self.send(Method::POST, &["issue"], Some(issue)).await
    }

    async fn update_issue(&self, issue_id: &str, update: &Value) -> Result<Value, JiraError> {
        self.send(Method::PUT, &["issue", issue_id], Some(update))
            .await
    }

    async fn delete_issue(&self, issue_id: &str) -> Result<Value, JiraError> {
        self.send(Method::DELETE, &["issue", issue_id], None).await
    }

    async fn get_server_info(&self) -> Result<Value, JiraError> {
        self.send(Method::GET, &["serverInfo"], None).await
    }
}

fn base_url(host: &str) -> Result<Url, JiraError> {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() || host.contains("://") || host.contains('/') {
        return Err(JiraError::InvalidHost(host.to_string()));
    }
    Url::parse(&format!("https://{host}/rest/api/{API_VERSION}/"))
        .map_err(|_| JiraError::InvalidHost(host.to_string()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    #[serde(default)]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: BTreeMap<String, String>,
}

/// Human message from a Jira error response.
///
/// Jira reports `{"errorMessages": [...], "errors": {field: msg}}`; anything
/// else falls back to the status line and the head of the body.
fn api_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        let mut messages = parsed.error_messages;
        messages.extend(
            parsed
                .errors
                .into_iter()
                .map(|(field, message)| format!("{field}: {message}")),
        );
        if !messages.is_empty() {
            return messages.join(", ");
        }
    }

    let head: String = body.trim().chars().take(200).collect();
    if head.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {head}")
    }
}
