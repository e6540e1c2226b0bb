//! ReQL terms in the JSON wire encoding: `[term_type, [args...]]`.

use serde_json::{json, Value};

/// Term type codes from the ReQL protocol definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TermType {
    MakeArray = 2,
    Db = 14,
    Table = 15,
    Get = 16,
    Update = 53,
    Delete = 54,
    Insert = 56,
    DbCreate = 57,
    DbDrop = 58,
    DbList = 59,
    TableCreate = 60,
    TableDrop = 61,
    TableList = 62,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum QueryType {
    Start = 1,
    Continue = 2,
    Stop = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    SuccessAtom,
    SuccessSequence,
    SuccessPartial,
    WaitComplete,
    ServerInfo,
    ClientError,
    CompileError,
    RuntimeError,
}

impl ResponseType {
    pub fn from_code(code: u64) -> Option<Self> {
        Some(match code {
            1 => Self::SuccessAtom,
            2 => Self::SuccessSequence,
            3 => Self::SuccessPartial,
            4 => Self::WaitComplete,
            5 => Self::ServerInfo,
            16 => Self::ClientError,
            17 => Self::CompileError,
            18 => Self::RuntimeError,
            _ => return None,
        })
    }
}

fn term(kind: TermType, args: Vec<Value>) -> Value {
    json!([kind as u32, args])
}

/// Encode a JSON value as a ReQL datum.
///
/// Arrays must be wrapped in `MAKE_ARRAY`, otherwise the server reads them
/// as terms. Objects are literal but their members are encoded recursively.
pub fn datum(value: &Value) -> Value {
    match value {
        Value::Array(items) => term(TermType::MakeArray, items.iter().map(datum).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), datum(value)))
                .collect(),
        ),
        other => other.clone(),
    }
}

pub fn db_list() -> Value {
    term(TermType::DbList, vec![])
}

pub fn db_create(name: &str) -> Value {
    term(TermType::DbCreate, vec![json!(name)])
}

pub fn db_drop(name: &str) -> Value {
    term(TermType::DbDrop, vec![json!(name)])
}

pub fn db(name: &str) -> Value {
    term(TermType::Db, vec![json!(name)])
}

pub fn table_list(database: &str) -> Value {
    term(TermType::TableList, vec![db(database)])
}

pub fn table_create(database: &str, table: &str) -> Value {
    term(TermType::TableCreate, vec![db(database), json!(table)])
}

pub fn table_drop(database: &str, table: &str) -> Value {
    term(TermType::TableDrop, vec![db(database), json!(table)])
}

pub fn table(database: &str, name: &str) -> Value {
    term(TermType::Table, vec![db(database), json!(name)])
}

pub fn get(selection: Value, key: &Value) -> Value {
    term(TermType::Get, vec![selection, datum(key)])
}

pub fn insert(selection: Value, documents: &Value) -> Value {
    term(TermType::Insert, vec![selection, datum(documents)])
}

pub fn update(selection: Value, patch: &Value) -> Value {
    term(TermType::Update, vec![selection, datum(patch)])
}

pub fn delete(selection: Value) -> Value {
    term(TermType::Delete, vec![selection])
}

/// A `START` query with no global optargs.
pub fn start(term: Value) -> Value {
    json!([QueryType::Start as u32, term, {}])
}

pub fn continue_query() -> Value {
    json!([QueryType::Continue as u32])
}
