use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Ok,
    Failed,
}

/// Outcome of `QueryService::run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub status: QueryStatus,
    pub data: Value,
}

impl QueryResult {
    pub fn ok(data: Value) -> Self {
        Self {
            status: QueryStatus::Ok,
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Ok,
    Failed,
}

/// Outcome of `QueryService::test_connection`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTestResult {
    pub status: ConnectionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ConnectionTestResult {
    pub fn ok() -> Self {
        Self {
            status: ConnectionStatus::Ok,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: ConnectionStatus::Failed,
            message: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ConnectionStatus::Ok
    }
}
