//! Search query compiler.
//!
//! Turns a free-text search such as
//!
//! ```text
//! span_name:gorm.Query duration>1ms (service_name=api* OR "timed out")
//! ```
//!
//! into a parameterized boolean condition for a column store `WHERE`
//! clause. Pipeline: [`lexer`] → [`combinator`] (which calls [`resolver`],
//! [`term`] and [`units`] per term) → [`Expression`] → [`Condition`].
//!
//! Compilation is pure. A [`SearchCompiler`] only borrows its table layout
//! and can be shared between threads.

pub mod ast;
pub mod combinator;
pub mod lexer;
pub mod resolver;
pub mod term;
pub mod units;

use crate::core::{Config, Result, TableConfig, UnknownFieldPolicy};
use crate::sql::{Condition, ConditionSink};

pub use ast::{Connector, Expression, Literal, Operator, Predicate, Term, Token, ValueSpec};
pub use combinator::{Combinator, MAX_NESTING_DEPTH};
pub use lexer::tokenize;
pub use resolver::{FieldResolver, ResolvedField};
pub use term::TermCompiler;
pub use units::{normalize_duration, DurationUnit};

/// High-level compile API
#[derive(Debug, Clone, Copy)]
pub struct SearchCompiler<'a> {
    table: &'a TableConfig,
    unknown_fields: UnknownFieldPolicy,
}

impl<'a> SearchCompiler<'a> {
    /// Create a compiler for `table` that rejects unknown keys
    pub fn new(table: &'a TableConfig) -> Self {
        Self {
            table,
            unknown_fields: UnknownFieldPolicy::default(),
        }
    }

    /// Create a compiler from a full configuration
    pub fn from_config(config: &'a Config) -> Self {
        Self::new(&config.table).with_unknown_fields(config.compiler.unknown_fields)
    }

    /// Set the unknown field policy
    pub fn with_unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }

    /// Parse a search string into a predicate tree.
    ///
    /// Returns `None` for a query without terms.
    pub fn parse(&self, query: &str) -> Result<Option<Expression>> {
        let tokens = tokenize(query)?;
        tracing::debug!(tokens = tokens.len(), "lexed search query");

        let terms = TermCompiler::new(FieldResolver::new(self.table), self.unknown_fields);
        let expr = Combinator::new(terms).combine(&tokens)?;

        if let Some(expr) = &expr {
            tracing::debug!(
                predicates = expr.predicate_count(),
                condition = %expr,
                "compiled search query"
            );
        }
        Ok(expr)
    }

    /// Compile a search string into a `WHERE` condition
    pub fn compile(&self, query: &str) -> Result<Option<Condition>> {
        Ok(self.parse(query)?.map(|expr| expr.to_condition()))
    }

    /// Validate a search string without keeping the result
    pub fn validate(&self, query: &str) -> Result<()> {
        self.parse(query)?;
        Ok(())
    }

    /// Compile `query` and append it to `sink`.
    ///
    /// Nothing is appended for an empty query or on error.
    pub fn assign<S: ConditionSink + ?Sized>(&self, sink: &mut S, query: &str) -> Result<()> {
        if let Some(condition) = self.compile(query)? {
            sink.add_condition(condition);
        }
        Ok(())
    }
}

/// Compile `query` against `table` and append the result to `sink`
pub fn assign_search_filters<S: ConditionSink + ?Sized>(
    sink: &mut S,
    query: &str,
    table: &TableConfig,
) -> Result<()> {
    SearchCompiler::new(table).assign(sink, query)
}
