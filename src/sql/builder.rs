//! Minimal SELECT statement builder.
//!
//! Conditions carry `?` placeholders and their arguments separately. The
//! builder joins conditions with `AND` and [`Flavor::interpolate`] renders the
//! final statement with every argument quoted and escaped.

use super::escape::quote_string;
use crate::core::{Result, SearchError};
use serde::Serialize;

/// A WHERE condition with its positional arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    /// SQL text with one `?` per argument
    pub fragment: String,
    /// Arguments bound to the placeholders, in order
    pub args: Vec<String>,
}

impl Condition {
    /// Create a condition from a fragment and its arguments
    pub fn new(fragment: impl Into<String>, args: Vec<String>) -> Self {
        Condition {
            fragment: fragment.into(),
            args,
        }
    }

    /// Render with arguments inlined
    pub fn interpolate(&self, flavor: Flavor) -> Result<String> {
        flavor.interpolate(&self.fragment, &self.args)
    }
}

/// Anything that accepts WHERE conditions
pub trait ConditionSink {
    /// Append a condition, ANDed with the existing ones
    fn add_condition(&mut self, condition: Condition);
}

/// SQL dialects the builder can render for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flavor {
    #[default]
    ClickHouse,
}

impl Flavor {
    /// Replace each `?` placeholder in `sql` with the matching quoted argument.
    ///
    /// Placeholders inside quoted literals are left alone.
    pub fn interpolate(&self, sql: &str, args: &[String]) -> Result<String> {
        let args_len: usize = args.iter().map(String::len).sum();
        let mut out = String::with_capacity(sql.len() + args_len);
        let mut args_iter = args.iter();
        let mut in_quote = false;
        let mut escaped = false;

        for c in sql.chars() {
            if in_quote {
                out.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '\'' {
                    in_quote = false;
                }
                continue;
            }

            match c {
                '\'' => {
                    in_quote = true;
                    out.push(c);
                },
                '?' => {
                    let arg = args_iter.next().ok_or_else(|| {
                        SearchError::interpolation(format!(
                            "not enough arguments: {} supplied",
                            args.len()
                        ))
                    })?;
                    out.push_str(&quote_string(arg));
                },
                _ => out.push(c),
            }
        }

        let unused = args_iter.count();
        if unused > 0 {
            return Err(SearchError::interpolation(format!(
                "{} argument(s) left without a placeholder",
                unused
            )));
        }

        Ok(out)
    }
}

/// Builder for `SELECT ... FROM ... WHERE ...` statements
#[derive(Debug, Clone, Default)]
pub struct SelectBuilder {
    columns: Vec<String>,
    table: String,
    conditions: Vec<Condition>,
    limit: Option<usize>,
}

impl SelectBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selected columns
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Set the source table
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Set the row limit
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Conditions added so far
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Render the statement with placeholders and collect its arguments
    pub fn build(&self) -> (String, Vec<String>) {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };
        let mut sql = format!("SELECT {} FROM {}", columns, self.table);
        let mut args = Vec::new();

        if !self.conditions.is_empty() {
            let fragments: Vec<&str> =
                self.conditions.iter().map(|c| c.fragment.as_str()).collect();
            sql.push_str(" WHERE ");
            sql.push_str(&fragments.join(" AND "));
            for condition in &self.conditions {
                args.extend(condition.args.iter().cloned());
            }
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        (sql, args)
    }

    /// Render the statement with arguments inlined for `flavor`
    pub fn build_with_flavor(&self, flavor: Flavor) -> Result<String> {
        let (sql, args) = self.build();
        flavor.interpolate(&sql, &args)
    }
}

impl ConditionSink for SelectBuilder {
    fn add_condition(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }
}

impl ConditionSink for Vec<Condition> {
    fn add_condition(&mut self, condition: Condition) {
        self.push(condition);
    }
}
