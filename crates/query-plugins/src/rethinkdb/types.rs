use query_service::QueryError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

pub const DEFAULT_PORT: u16 = 28015;
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_DATABASE: &str = "test";

#[derive(Clone, Deserialize)]
pub struct SourceOptions {
    pub host: String,
    #[serde(default = "default_port", deserialize_with = "port")]
    pub port: u16,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Database used when a query names none.
    #[serde(default)]
    pub database: Option<String>,
}

impl fmt::Debug for SourceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

/// Ports arrive as numbers from config files and as strings from forms.
fn port<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(text) if text.trim().is_empty() => Ok(DEFAULT_PORT),
        Port::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port '{text}'"))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RethinkOperation {
    ListDatabases,
    CreateDatabase,
    DropDatabase,
    ListTables,
    CreateTable,
    DropTable,
    ListDocuments,
    GetDocument,
    InsertDocuments,
    UpdateDocument,
    UpdateAll,
    DeleteDocument,
    DeleteAll,
}

impl RethinkOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListDatabases => "list_databases",
            Self::CreateDatabase => "create_database",
            Self::DropDatabase => "drop_database",
            Self::ListTables => "list_tables",
            Self::CreateTable => "create_table",
            Self::DropTable => "drop_table",
            Self::ListDocuments => "list_documents",
            Self::GetDocument => "get_document",
            Self::InsertDocuments => "insert_documents",
            Self::UpdateDocument => "update_document",
            Self::UpdateAll => "update_all",
            Self::DeleteDocument => "delete_document",
            Self::DeleteAll => "delete_all",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryOptions {
    pub operation: RethinkOperation,
    /// Database to create or drop.
    #[serde(default)]
    pub name: Option<String>,
    /// Database the table lives in; overrides the source default.
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default, alias = "tableName")]
    pub table: Option<String>,
    /// Primary key of a single document.
    #[serde(default, alias = "id")]
    pub key: Option<Value>,
    /// Documents to insert or fields to update, as JSON or a JSON string.
    #[serde(default)]
    pub body: Option<Value>,
}

impl QueryOptions {
    pub fn name(&self) -> Result<&str, QueryError> {
        self.text(self.name.as_deref(), "name")
    }

    pub fn table(&self) -> Result<&str, QueryError> {
        self.text(self.table.as_deref(), "table")
    }

    pub fn key(&self) -> Result<&Value, QueryError> {
        match &self.key {
            Some(Value::Null) | None => Err(self.missing("key")),
            Some(key) => Ok(key),
        }
    }

    pub fn body(&self) -> Result<Value, QueryError> {
        match &self.body {
            None | Some(Value::Null) => Err(self.missing("body")),
            Some(Value::String(text)) if text.trim().is_empty() => Err(self.missing("body")),
            Some(Value::String(text)) => json5::from_str(text)
                .map_err(|e| QueryError::invalid_options(format!("body is not valid JSON5: {e}"))),
            Some(value) => Ok(value.clone()),
        }
    }

    fn text<'a>(&self, value: Option<&'a str>, name: &str) -> Result<&'a str, QueryError> {
        match value {
            Some(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(self.missing(name)),
        }
    }

    fn missing(&self, name: &str) -> QueryError {
        QueryError::invalid_options(format!(
            "{name} is required for {}",
            self.operation.as_str()
        ))
    }
}
