//! QueryService trait: the uniform contract every data source plugin
//! implements. A plugin can `run` a query or `test_connection`.
//!
//! Plugins declare typed source/query options. The registry erases those
//! types so hosts can dispatch by plugin kind with raw JSON options.

mod error;
mod registry;
mod result;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

pub use error::{ErrorCause, QueryError};
pub use registry::{DynQueryService, QueryServiceRegistry};
pub use result::{ConnectionStatus, ConnectionTestResult, QueryResult, QueryStatus};

pub type Result<T> = std::result::Result<T, QueryError>;

#[async_trait]
pub trait QueryService: Send + Sync {
    /// Connection settings (host, credentials).
    type SourceOptions: DeserializeOwned + Send + Sync;

    /// Per-query settings, including the operation to run.
    type QueryOptions: DeserializeOwned + Send + Sync;

    /// Run one operation against a fresh connection.
    async fn run(
        &self,
        source_options: &Self::SourceOptions,
        query_options: &Self::QueryOptions,
        data_source_id: &str,
    ) -> Result<QueryResult>;

    /// Open a connection and perform one cheap call to prove reachability.
    async fn test_connection(
        &self,
        source_options: &Self::SourceOptions,
    ) -> Result<ConnectionTestResult>;
}
