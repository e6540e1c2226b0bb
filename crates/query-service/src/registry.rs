//! Kind-keyed registry of query services with JSON-erased options.

use crate::{ConnectionTestResult, QueryError, QueryResult, QueryService, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Object-safe view of a `QueryService`, taking raw JSON options.
#[async_trait]
pub trait DynQueryService: Send + Sync {
    async fn run_json(
        &self,
        source_options: &Value,
        query_options: &Value,
        data_source_id: &str,
    ) -> Result<QueryResult>;

    async fn test_connection_json(&self, source_options: &Value) -> Result<ConnectionTestResult>;
}

#[async_trait]
impl<S> DynQueryService for S
where
    S: QueryService,
{
    async fn run_json(
        &self,
        source_options: &Value,
        query_options: &Value,
        data_source_id: &str,
    ) -> Result<QueryResult> {
        let source: S::SourceOptions = decode("source", source_options)?;
        let query: S::QueryOptions = decode("query", query_options)?;
        self.run(&source, &query, data_source_id).await
    }

    async fn test_connection_json(&self, source_options: &Value) -> Result<ConnectionTestResult> {
        let source: S::SourceOptions = decode("source", source_options)?;
        self.test_connection(&source).await
    }
}

fn decode<T: DeserializeOwned>(what: &str, value: &Value) -> Result<T> {
    serde_json::from_value(value.clone())
        .map_err(|e| QueryError::invalid_options(format!("invalid {what} options: {e}")))
}

/// Query services addressed by data source kind (`"jira"`, `"rethinkdb"`).
#[derive(Default, Clone)]
pub struct QueryServiceRegistry {
    services: BTreeMap<String, Arc<dyn DynQueryService>>,
}

impl QueryServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service under `kind`, replacing any previous one.
    pub fn register<S>(&mut self, kind: impl Into<String>, service: S) -> &mut Self
    where
        S: QueryService + 'static,
    {
        let kind = kind.into();
        if self.services.contains_key(&kind) {
            warn!("Replacing query service registered as '{}'", kind);
        }
        self.services.insert(kind, Arc::new(service));
        self
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn DynQueryService>> {
        self.services.get(kind).cloned()
    }

    /// Registered kinds in sorted order.
    pub fn kinds(&self) -> Vec<&str> {
        self.services.keys().map(String::as_str).collect()
    }

    pub async fn run(
        &self,
        kind: &str,
        source_options: &Value,
        query_options: &Value,
        data_source_id: &str,
    ) -> Result<QueryResult> {
        let service = self.lookup(kind)?;
        debug!(kind, data_source_id, "Running query");
        service
            .run_json(source_options, query_options, data_source_id)
            .await
    }

    pub async fn test_connection(
        &self,
        kind: &str,
        source_options: &Value,
    ) -> Result<ConnectionTestResult> {
        let service = self.lookup(kind)?;
        debug!(kind, "Testing connection");
        service.test_connection_json(source_options).await
    }

    fn lookup(&self, kind: &str) -> Result<Arc<dyn DynQueryService>> {
        self.get(kind).ok_or_else(|| {
            QueryError::new(
                "Unknown data source kind",
                format!("no query service registered for '{kind}'"),
                json!({ "kind": "registry" }),
            )
        })
    }
}

impl std::fmt::Debug for QueryServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryServiceRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
