//! Configuration management for spanq.
//!
//! This module provides:
//! - Table layouts describing how logical search keys map onto physical
//!   columns and attribute maps
//! - Compiler policy knobs
//! - YAML file support with validation and defaults

use crate::core::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Complete configuration for spanq
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Table layout the queries are compiled against
    pub table: TableConfig,
    /// Compiler configuration
    pub compiler: CompilerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Debug mode
    #[serde(skip)]
    pub debug: bool,
}

/// Physical layout of a searchable table.
///
/// Read-only once handed to the compiler; every compilation borrows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Logical key to physical column
    pub keys_to_columns: BTreeMap<String, String>,
    /// Column searched by bare terms
    pub body_column: String,
    /// Attribute map columns, checked in order
    #[serde(default)]
    pub attributes_columns: Vec<ColumnMapping>,
    /// Logical keys holding durations in nanoseconds
    #[serde(default)]
    pub duration_keys: BTreeSet<String>,
}

/// Routes keys with a given prefix to an attribute map column.
///
/// An empty prefix is the catch-all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Key prefix, kept as part of the map key
    #[serde(default)]
    pub prefix: String,
    /// Map column name
    pub column: String,
}

/// Compiler configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// What to do with keys that resolve to no column
    pub unknown_fields: UnknownFieldPolicy,
}

/// Handling of keyed terms whose key resolves to nothing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFieldPolicy {
    /// Fail the whole query
    #[default]
    Reject,
    /// Compile the term to an always-false predicate
    MatchNone,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Structured logging format
    pub structured: bool,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig::traces()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Warn,
            structured: false,
        }
    }
}

impl ColumnMapping {
    /// Mapping for keys starting with `prefix`
    pub fn prefixed(prefix: impl Into<String>, column: impl Into<String>) -> Self {
        ColumnMapping {
            prefix: prefix.into(),
            column: column.into(),
        }
    }

    /// Catch-all mapping
    pub fn catch_all(column: impl Into<String>) -> Self {
        ColumnMapping {
            prefix: String::new(),
            column: column.into(),
        }
    }

    /// True if this mapping has no prefix
    pub fn is_catch_all(&self) -> bool {
        self.prefix.is_empty()
    }
}

impl TableConfig {
    /// Layout of the spans table
    pub fn traces() -> Self {
        let keys_to_columns = [
            ("duration", "Duration"),
            ("level", "Level"),
            ("span_name", "SpanName"),
            ("service_name", "ServiceName"),
            ("source", "Source"),
            ("http.url", "HttpUrl"),
            ("trace_id", "TraceId"),
            ("span_id", "SpanId"),
            ("parent_span_id", "ParentSpanId"),
            ("span_kind", "SpanKind"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        TableConfig {
            keys_to_columns,
            body_column: "SpanName".to_string(),
            attributes_columns: vec![
                ColumnMapping::prefixed("http.", "HttpAttributes"),
                ColumnMapping::catch_all("TraceAttributes"),
            ],
            duration_keys: BTreeSet::from(["duration".to_string()]),
        }
    }

    /// Layout of the logs table
    pub fn logs() -> Self {
        let keys_to_columns = [
            ("level", "SeverityText"),
            ("service_name", "ServiceName"),
            ("service_version", "ServiceVersion"),
            ("environment", "Environment"),
            ("source", "Source"),
            ("trace_id", "TraceId"),
            ("span_id", "SpanId"),
            ("secure_session_id", "SecureSessionId"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        TableConfig {
            keys_to_columns,
            body_column: "Body".to_string(),
            attributes_columns: vec![ColumnMapping::catch_all("LogAttributes")],
            duration_keys: BTreeSet::new(),
        }
    }

    /// True if `key` is configured as duration-typed
    pub fn is_duration(&self, key: &str) -> bool {
        self.duration_keys.contains(key)
    }

    /// The catch-all attribute map, if any
    pub fn catch_all(&self) -> Option<&ColumnMapping> {
        self.attributes_columns.iter().find(|m| m.is_catch_all())
    }

    /// Validate the table layout
    pub fn validate(&self) -> Result<()> {
        if self.body_column.trim().is_empty() {
            return Err(SearchError::config("body_column must not be empty"));
        }

        for (key, column) in &self.keys_to_columns {
            if key.is_empty() {
                return Err(SearchError::config("keys_to_columns contains an empty key"));
            }
            if column.trim().is_empty() {
                return Err(SearchError::config(format!(
                    "Column for key '{}' must not be empty",
                    key
                )));
            }
        }

        let mut prefixes = HashSet::new();
        for mapping in &self.attributes_columns {
            if mapping.column.trim().is_empty() {
                return Err(SearchError::config(format!(
                    "Attribute column for prefix '{}' must not be empty",
                    mapping.prefix
                )));
            }
            if !prefixes.insert(mapping.prefix.as_str()) {
                if mapping.is_catch_all() {
                    return Err(SearchError::config(
                        "At most one catch-all attribute column may be configured",
                    ));
                }
                return Err(SearchError::config(format!(
                    "Duplicate attribute prefix '{}'",
                    mapping.prefix
                )));
            }
        }

        for key in &self.duration_keys {
            if !self.keys_to_columns.contains_key(key) {
                return Err(SearchError::config(format!(
                    "Duration key '{}' is not mapped to a column",
                    key
                )));
            }
        }

        Ok(())
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Result<Self> {
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.table.validate()
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)?;
        Ok(self)
    }

    /// Replace the table layout
    pub fn table(mut self, table: TableConfig) -> Self {
        self.config.table = table;
        self
    }

    /// Set the unknown field policy
    pub fn unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.config.compiler.unknown_fields = policy;
        self
    }

    /// Set the log level
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set debug mode
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.table.body_column, "SpanName");
        assert_eq!(config.compiler.unknown_fields, UnknownFieldPolicy::Reject);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(TableConfig::traces().validate().is_ok());
        assert!(TableConfig::logs().validate().is_ok());
        assert!(TableConfig::traces().is_duration("duration"));
        assert!(!TableConfig::logs().is_duration("duration"));
    }

    #[test]
    fn test_two_catch_alls_rejected() {
        let mut table = TableConfig::traces();
        table
            .attributes_columns
            .push(ColumnMapping::catch_all("OtherAttributes"));
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("catch-all"));
    }

    #[test]
    fn test_duplicate_prefix_rejected() {
        let mut table = TableConfig::traces();
        table
            .attributes_columns
            .insert(0, ColumnMapping::prefixed("http.", "Other"));
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_unmapped_duration_key_rejected() {
        let mut table = TableConfig::traces();
        table.duration_keys.insert("latency".to_string());
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_empty_body_column_rejected() {
        let mut table = TableConfig::logs();
        table.body_column = "  ".to_string();
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .table(TableConfig::logs())
            .unknown_fields(UnknownFieldPolicy::MatchNone)
            .log_level(LogLevel::Debug)
            .debug(true)
            .build()
            .unwrap();

        assert_eq!(config.table.body_column, "Body");
        assert_eq!(config.compiler.unknown_fields, UnknownFieldPolicy::MatchNone);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(config.debug);
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
table:
  keys_to_columns:
    level: SeverityText
    latency: Latency
  body_column: Body
  attributes_columns:
    - prefix: "k8s."
      column: K8sAttributes
    - column: LogAttributes
  duration_keys: [latency]
compiler:
  unknown_fields: match_none
"#;

        let config = ConfigBuilder::new().from_yaml(yaml).unwrap().build().unwrap();

        assert_eq!(config.table.keys_to_columns.get("level").unwrap(), "SeverityText");
        assert_eq!(config.table.attributes_columns.len(), 2);
        assert!(config.table.attributes_columns[1].is_catch_all());
        assert!(config.table.is_duration("latency"));
        assert_eq!(config.compiler.unknown_fields, UnknownFieldPolicy::MatchNone);
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_malformed_yaml_is_yaml_error() {
        let result = ConfigBuilder::new().from_yaml("table: [not, a, map]");
        assert!(matches!(result, Err(SearchError::Yaml(_))));
    }
}
