//! The uniform query error.
//!
//! Every vendor failure is wrapped into `QueryError`. The vendor's message
//! lands in `description`; its HTTP status and a coarse cause kind are kept
//! in `data` so callers can branch without matching on strings.

use serde_json::{json, Map, Value};
use std::fmt::Display;
use thiserror::Error;

/// Structured facts a vendor error can expose when wrapped.
pub trait ErrorCause: Display {
    /// Coarse category, e.g. `"http"`, `"transport"`, `"auth"`.
    fn kind(&self) -> &'static str;

    /// HTTP status code, when the failure came from an HTTP response.
    fn status(&self) -> Option<u16> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}: {description}")]
pub struct QueryError {
    pub message: String,
    pub description: String,
    pub data: Value,
}

impl QueryError {
    pub const QUERY_FAILED: &'static str = "Query could not be completed";
    pub const INVALID_OPTIONS: &'static str = "Invalid query options";
    pub const CONNECTION_FAILED: &'static str = "Connection could not be established";

    pub fn new(message: impl Into<String>, description: impl Into<String>, data: Value) -> Self {
        Self {
            message: message.into(),
            description: description.into(),
            data,
        }
    }

    /// Wrap a vendor failure that happened while running a query.
    pub fn query_failed(cause: &impl ErrorCause) -> Self {
        Self::new(Self::QUERY_FAILED, cause.to_string(), cause_data(cause))
    }

    /// Wrap a failure to open a connection or reach the service.
    pub fn connection_failed(cause: &impl ErrorCause) -> Self {
        Self::new(Self::CONNECTION_FAILED, cause.to_string(), cause_data(cause))
    }

    /// Options that are missing, malformed or inconsistent with the operation.
    pub fn invalid_options(description: impl Into<String>) -> Self {
        Self::new(
            Self::INVALID_OPTIONS,
            description,
            json!({ "kind": "options" }),
        )
    }

    /// HTTP status preserved from the vendor error, if any.
    pub fn status(&self) -> Option<u16> {
        self.data
            .get("status")
            .and_then(Value::as_u64)
            .and_then(|s| u16::try_from(s).ok())
    }

    /// Cause kind preserved from the vendor error, if any.
    pub fn kind(&self) -> Option<&str> {
        self.data.get("kind").and_then(Value::as_str)
    }
}

fn cause_data(cause: &impl ErrorCause) -> Value {
    let mut data = Map::new();
    data.insert("kind".to_string(), Value::from(cause.kind()));
    if let Some(status) = cause.status() {
        data.insert("status".to_string(), Value::from(status));
    }
    Value::Object(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct NotFound;

    impl fmt::Display for NotFound {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Issue Does Not Exist")
        }
    }

    impl ErrorCause for NotFound {
        fn kind(&self) -> &'static str {
            "http"
        }

        fn status(&self) -> Option<u16> {
            Some(404)
        }
    }

    #[test]
    fn test_query_failed_keeps_message_and_status() {
        let err = QueryError::query_failed(&NotFound);
        assert_eq!(err.message, "Query could not be completed");
        assert_eq!(err.description, "Issue Does Not Exist");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.kind(), Some("http"));
        assert_eq!(
            err.to_string(),
            "Query could not be completed: Issue Does Not Exist"
        );
    }

    #[test]
    fn test_invalid_options_has_no_status() {
        let err = QueryError::invalid_options("issue_id is required");
        assert_eq!(err.status(), None);
        assert_eq!(err.kind(), Some("options"));
    }
}
