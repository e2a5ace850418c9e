use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Interpolation error: {0}")]
    Interpolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for search compilation
pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    /// Creates a new syntax error
    pub fn syntax<S: Into<String>>(msg: S) -> Self {
        Self::Syntax(msg.into())
    }

    /// Creates a new unknown field error
    pub fn unknown_field<S: Into<String>>(key: S) -> Self {
        Self::UnknownField(key.into())
    }

    /// Creates a new invalid value error
    pub fn invalid_value<K: Into<String>, S: Into<String>>(key: K, msg: S) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: msg.into(),
        }
    }

    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new interpolation error
    pub fn interpolation<S: Into<String>>(msg: S) -> Self {
        Self::Interpolation(msg.into())
    }

    /// Returns true if the error was caused by the query text itself.
    ///
    /// Callers should reject such queries with a client error response
    /// rather than retrying them.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Syntax(_) | Self::UnknownField(_) | Self::InvalidValue { .. }
        )
    }

    /// Returns the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Syntax(_) => "syntax",
            Self::UnknownField(_) => "unknown_field",
            Self::InvalidValue { .. } => "invalid_value",
            Self::Config(_) | Self::Yaml(_) => "config",
            Self::Interpolation(_) => "interpolation",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}
