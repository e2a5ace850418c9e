//! Configuration and error types shared by every part of spanq.

#![warn(missing_docs)]

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{
    ColumnMapping, CompilerConfig, Config, ConfigBuilder, LogLevel, LoggingConfig, TableConfig,
    UnknownFieldPolicy,
};
pub use error::{Result, SearchError};
