//! Application configuration
//!
//! Loaded from YAML:
//!
//! ```yaml
//! tree:
//!   expand_depth: 1
//!   use_actions: true
//!   enable_copy_to_clipboard: true
//! sources:
//!   tracker:
//!     kind: jira
//!     options:
//!       host: acme.atlassian.net
//!       username: ${JIRA_USER}
//!       password: ${JIRA_TOKEN}
//! ```
//!
//! `${VAR}` references inside source option strings are substituted from the
//! environment when the source is looked up, so commands that never touch a
//! source do not need its variables set.

use json_tree::TreeDisplayConfig;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "JSON_INSPECTOR_CONFIG";

/// Used when neither `--config` nor `JSON_INSPECTOR_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/inspector.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("environment variable {var} referenced by source '{source_name}' is not set")]
    MissingEnv { var: String, source_name: String },

    #[error("unterminated ${{...}} reference in source '{0}'")]
    UnterminatedReference(String),

    #[error("unknown data source '{0}'")]
    UnknownSource(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    pub tree: TreeDisplayConfig,
    pub sources: BTreeMap<String, SourceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    #[serde(default)]
    pub options: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Jira,
    Rethinkdb,
}

impl SourceKind {
    /// Registry key of the plugin serving this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jira => "jira",
            Self::Rethinkdb => "rethinkdb",
        }
    }
}

impl InspectorConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: InspectorConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Resolve the config location and load it.
    ///
    /// An explicit path or `JSON_INSPECTOR_CONFIG` must exist. A missing
    /// default file yields the default configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(path);
        }

        let default = Path::new(DEFAULT_CONFIG_PATH);
        if default.exists() {
            Self::from_file(default)
        } else {
            tracing::debug!(path = DEFAULT_CONFIG_PATH, "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Look up a source and substitute `${VAR}` references from the environment.
    pub fn source(&self, name: &str) -> Result<SourceConfig, ConfigError> {
        self.source_with(name, |var| std::env::var(var).ok())
    }

    pub fn source_with(
        &self,
        name: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<SourceConfig, ConfigError> {
        let mut source = self
            .sources
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownSource(name.to_string()))?;
        substitute(&mut source.options, name, &lookup)?;
        Ok(source)
    }
}

fn substitute(
    value: &mut Value,
    source_name: &str,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    match value {
        Value::String(text) if text.contains("${") => {
            *text = interpolate(text, source_name, lookup)?;
        }
        Value::Array(items) => {
            for item in items {
                substitute(item, source_name, lookup)?;
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                substitute(item, source_name, lookup)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn interpolate(
    text: &str,
    source_name: &str,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| ConfigError::UnterminatedReference(source_name.to_string()))?;
        let var = &after[..end];
        let resolved = lookup(var).ok_or_else(|| ConfigError::MissingEnv {
            var: var.to_string(),
            source_name: source_name.to_string(),
        })?;
        out.push_str(&resolved);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
