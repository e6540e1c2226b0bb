//! Query service plugins.
//!
//! Each plugin implements [`query_service::QueryService`] for one vendor:
//!
//! - [`jira::Jira`]: issue CRUD over the Jira REST API v2
//! - [`rethinkdb::RethinkDb`]: database, table and document operations over
//!   the ReQL JSON wire protocol
//!
//! [`default_registry`] wires both under their data source kinds.

pub mod jira;
pub mod rethinkdb;

use query_service::QueryServiceRegistry;

/// Registry with every built-in plugin registered under its kind.
pub fn default_registry() -> QueryServiceRegistry {
    let mut registry = QueryServiceRegistry::new();
    registry
        .register("jira", jira::Jira::new())
        .register("rethinkdb", rethinkdb::RethinkDb::new());
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_kinds() {
        assert_eq!(default_registry().kinds(), vec!["jira", "rethinkdb"]);
    }
}
