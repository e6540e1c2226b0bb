//! RethinkDB query service.
//!
//! Each call opens a TCP connection, authenticates with SCRAM-SHA-256 over
//! the V1_0 handshake, runs one ReQL term and closes the connection.
//!
//! ```text
//! QueryOptions ──build_term──▶ ReQL JSON ──Connection::run──▶ QueryResult
//! ```

mod connection;
mod error;
pub mod reql;
mod scram;
mod types;

pub use connection::{connect, Connection};
pub use error::ReqlError;
pub use scram::{ScramClient, ScramFinal};
pub use types::{
    QueryOptions, RethinkOperation, SourceOptions, DEFAULT_DATABASE, DEFAULT_PORT,
    DEFAULT_USERNAME,
};

use async_trait::async_trait;
use query_service::{ConnectionTestResult, QueryError, QueryResult, QueryService};
use serde_json::Value;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct RethinkDb;

impl RethinkDb {
    pub fn new() -> Self {
        Self
    }
}

/// Translate query options into the ReQL term to run.
pub fn build_term(query: &QueryOptions, default_database: Option<&str>) -> Result<Value, QueryError> {
    let database = query
        .database
        .as_deref()
        .filter(|db| !db.trim().is_empty())
        .or(default_database)
        .unwrap_or(DEFAULT_DATABASE);

    let term = match query.operation {
        RethinkOperation::ListDatabases => reql::db_list(),
        RethinkOperation::CreateDatabase => reql::db_create(query.name()?),
        RethinkOperation::DropDatabase => reql::db_drop(query.name()?),
        RethinkOperation::ListTables => reql::table_list(database),
        RethinkOperation::CreateTable => reql::table_create(database, query.table()?),
        RethinkOperation::DropTable => reql::table_drop(database, query.table()?),
        RethinkOperation::ListDocuments => reql::table(database, query.table()?),
        RethinkOperation::GetDocument => {
            reql::get(reql::table(database, query.table()?), query.key()?)
        }
        RethinkOperation::InsertDocuments => {
            let documents = query.body()?;
            if !(documents.is_object() || documents.is_array()) {
                return Err(QueryError::invalid_options(
                    "body must be a document or an array of documents",
                ));
            }
            reql::insert(reql::table(database, query.table()?), &documents)
        }
        RethinkOperation::UpdateDocument => {
            let patch = object_body(query)?;
            let document = reql::get(reql::table(database, query.table()?), query.key()?);
            reql::update(document, &patch)
        }
        RethinkOperation::UpdateAll => {
            let patch = object_body(query)?;
            reql::update(reql::table(database, query.table()?), &patch)
        }
        RethinkOperation::DeleteDocument => {
            reql::delete(reql::get(reql::table(database, query.table()?), query.key()?))
        }
        RethinkOperation::DeleteAll => reql::delete(reql::table(database, query.table()?)),
    };
    Ok(term)
}

fn object_body(query: &QueryOptions) -> Result<Value, QueryError> {
    let patch = query.body()?;
    if patch.is_object() {
        Ok(patch)
    } else {
        Err(QueryError::invalid_options("body must be an object of fields to update"))
    }
}

#[async_trait]
impl QueryService for RethinkDb {
    type SourceOptions = SourceOptions;
    type QueryOptions = QueryOptions;

    async fn run(
        &self,
        source_options: &SourceOptions,
        query_options: &QueryOptions,
        data_source_id: &str,
    ) -> query_service::Result<QueryResult> {
        let operation = query_options.operation.as_str();
        let term = build_term(query_options, source_options.database.as_deref())?;
        debug!(data_source_id, operation, "Running RethinkDB query");

        let outcome = async {
            let mut connection = connect(source_options).await?;
            let data = connection.run(term).await?;
            connection.close().await?;
            Ok::<_, ReqlError>(data)
        }
        .await;

        outcome.map(QueryResult::ok).map_err(|e| {
            warn!(operation, error = %e, "RethinkDB query failed");
            QueryError::query_failed(&e)
        })
    }

    async fn test_connection(
        &self,
        source_options: &SourceOptions,
    ) -> query_service::Result<ConnectionTestResult> {
        let outcome = async {
            let mut connection = connect(source_options).await?;
            connection.run(reql::db_list()).await?;
            connection.close().await
        }
        .await;

        outcome.map_err(|e| QueryError::connection_failed(&e))?;
        info!(host = %source_options.host, port = source_options.port, "RethinkDB connection verified");
        Ok(ConnectionTestResult::ok())
    }
}
