//! Command-line interface for spanq.
//!
//! Compiles one search query and prints the resulting statement:
//!
//! ```text
//! spanq 'service_name=api duration>10ms'
//! spanq --table logs --format json 'level:error "connection reset"'
//! ```

use crate::core::{Config, ConfigBuilder, Result, SearchError, TableConfig, UnknownFieldPolicy};
use crate::query::SearchCompiler;
use crate::sql::{Flavor, SelectBuilder};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Compile telemetry search queries into ClickHouse SQL
#[derive(Parser, Debug)]
#[command(name = "spanq")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Search query to compile
    #[arg(required_unless_present = "check_config")]
    pub query: Option<String>,

    /// Configuration file path (default: ~/.config/spanq/config.yaml)
    #[arg(short, long, env = "SPANQ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Use a built-in table layout instead of the configured one
    #[arg(long, value_enum)]
    pub table: Option<TablePreset>,

    /// Table name for the FROM clause
    #[arg(long, default_value = "t")]
    pub from: String,

    /// Append a LIMIT clause
    #[arg(long)]
    pub limit: Option<usize>,

    /// How to treat keys that match no column
    #[arg(long, value_enum)]
    pub unknown_fields: Option<UnknownFields>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Sql)]
    pub format: OutputFormat,

    /// Validate configuration and exit
    #[arg(long)]
    pub check_config: bool,

    /// Enable debug logging
    #[arg(short, long, env = "SPANQ_DEBUG")]
    pub debug: bool,
}

/// Built-in table layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TablePreset {
    Traces,
    Logs,
}

/// Unknown key handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnknownFields {
    Reject,
    MatchNone,
}

/// Output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Statement with arguments inlined
    Sql,
    /// Statement with placeholders plus the argument list
    Json,
}

impl From<TablePreset> for TableConfig {
    fn from(preset: TablePreset) -> Self {
        match preset {
            TablePreset::Traces => TableConfig::traces(),
            TablePreset::Logs => TableConfig::logs(),
        }
    }
}

impl From<UnknownFields> for UnknownFieldPolicy {
    fn from(arg: UnknownFields) -> Self {
        match arg {
            UnknownFields::Reject => UnknownFieldPolicy::Reject,
            UnknownFields::MatchNone => UnknownFieldPolicy::MatchNone,
        }
    }
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Load configuration with proper precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Config file
    /// 3. Defaults (lowest priority)
    pub fn load_config(&self) -> Result<Config> {
        let mut builder = ConfigBuilder::new();

        let config_path = if let Some(path) = &self.config {
            Some(path.clone())
        } else {
            dirs::config_dir()
                .map(|d| d.join("spanq").join("config.yaml"))
                .filter(|p| p.exists())
        };

        if let Some(path) = config_path {
            match std::fs::read_to_string(&path) {
                Ok(content) => builder = builder.from_yaml(&content)?,
                Err(e) if self.config.is_some() => {
                    // User explicitly specified a config file that can't be read
                    tracing::error!(path = %path.display(), "failed to read config file");
                    return Err(e.into());
                },
                Err(_) => {},
            }
        }

        self.build_config_from_args(builder)
    }

    fn build_config_from_args(&self, mut builder: ConfigBuilder) -> Result<Config> {
        if let Some(preset) = self.table {
            builder = builder.table(preset.into());
        }
        if let Some(policy) = self.unknown_fields {
            builder = builder.unknown_fields(policy.into());
        }

        builder.debug(self.debug).build()
    }

    /// Initialize logging based on configuration.
    ///
    /// Logs go to stderr so stdout only carries the compiled statement.
    pub fn init_logging(&self, config: &Config) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let env_log_level = std::env::var("SPANQ_LOG_LEVEL")
            .unwrap_or_else(|_| config.logging.level.as_str().to_string());
        let log_level = if self.debug || config.debug {
            "debug"
        } else {
            env_log_level.as_str()
        };

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        let fmt_layer = if config.logging.structured {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true)
                .compact()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_line_number(false)
                .compact()
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| SearchError::config(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }

    /// Build the statement for the query on the command line.
    pub fn render(&self, config: &Config) -> Result<String> {
        let query = self.query.as_deref().unwrap_or_default();
        let mut sb = SelectBuilder::new().select(&["*"]).from(self.from.as_str());
        if let Some(limit) = self.limit {
            sb = sb.limit(limit);
        }

        SearchCompiler::from_config(config).assign(&mut sb, query)?;

        match self.format {
            OutputFormat::Sql => sb.build_with_flavor(Flavor::ClickHouse),
            OutputFormat::Json => {
                let (sql, args) = sb.build();
                let output = serde_json::json!({ "sql": sql, "args": args });
                Ok(serde_json::to_string_pretty(&output)?)
            },
        }
    }
}

/// Execute the spanq command.
pub fn execute(cli: &Cli) -> Result<()> {
    // Load and validate configuration
    let config = cli.load_config()?;

    // Initialize logging
    cli.init_logging(&config)?;

    // Handle config validation flag
    if cli.check_config {
        config.validate()?;
        println!("Configuration is valid!");
        println!("  Body column: {}", config.table.body_column);
        println!("  Direct keys: {}", config.table.keys_to_columns.len());
        println!("  Attribute maps: {}", config.table.attributes_columns.len());
        println!("  Duration keys: {}", config.table.duration_keys.len());
        return Ok(());
    }

    println!("{}", cli.render(&config)?);
    Ok(())
}
