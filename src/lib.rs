//! json-inspector
//!
//! Application layer over the workspace crates:
//!
//! - `json-tree`: headless tree renderer (classification, expansion,
//!   selection, node actions)
//! - `query-service`: the plugin contract and its JSON-erased registry
//! - `query-plugins`: Jira and RethinkDB implementations
//!
//! This crate adds YAML configuration, logging setup and the helpers behind
//! the `json-inspector` binary.

pub mod config;
pub mod inspect;
pub mod logging;

pub use config::{ConfigError, InspectorConfig, SourceConfig, SourceKind};
pub use inspect::{inspect_document, InspectError, InspectOptions};

use query_service::{ConnectionTestResult, QueryResult, QueryServiceRegistry};
use serde_json::Value;

/// Run a query against a named source from the config.
pub async fn run_source_query(
    config: &InspectorConfig,
    registry: &QueryServiceRegistry,
    source: &str,
    query_options: &Value,
    data_source_id: &str,
) -> anyhow::Result<QueryResult> {
    let source_config = config.source(source)?;
    let result = registry
        .run(
            source_config.kind.as_str(),
            &source_config.options,
            query_options,
            data_source_id,
        )
        .await?;
    Ok(result)
}

/// Test the connection of a named source from the config.
pub async fn test_source_connection(
    config: &InspectorConfig,
    registry: &QueryServiceRegistry,
    source: &str,
) -> anyhow::Result<ConnectionTestResult> {
    let source_config = config.source(source)?;
    let result = registry
        .test_connection(source_config.kind.as_str(), &source_config.options)
        .await?;
    Ok(result)
}
