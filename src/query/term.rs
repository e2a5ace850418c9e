//! Compiles single terms into elementary predicates.
//!
//! Every user-supplied literal, including attribute map keys, becomes a `?`
//! argument. Only configured column names are written into the fragment.

use super::ast::{Literal, Operator, Predicate, Term, ValueSpec};
use super::resolver::{FieldResolver, ResolvedField};
use super::units::normalize_duration;
use crate::core::{Result, SearchError, UnknownFieldPolicy};
use crate::sql::escape_like;

/// Turns [`Term`]s into [`Predicate`]s for one table layout
#[derive(Debug, Clone, Copy)]
pub struct TermCompiler<'a> {
    resolver: FieldResolver<'a>,
    unknown_fields: UnknownFieldPolicy,
}

impl<'a> TermCompiler<'a> {
    /// Create a term compiler
    pub fn new(resolver: FieldResolver<'a>, unknown_fields: UnknownFieldPolicy) -> Self {
        Self {
            resolver,
            unknown_fields,
        }
    }

    /// Compile one term
    pub fn compile(&self, term: &Term) -> Result<Predicate> {
        let predicate = match term {
            Term::Body(literal) => self.body(literal),
            Term::Keyed { key, op, value } => self.keyed(key, *op, value)?,
        };
        tracing::trace!(term = %term, predicate = %predicate.fragment, "compiled term");
        Ok(predicate)
    }

    fn body(&self, literal: &Literal) -> Predicate {
        let column = self.resolver.body();
        let column = column.column_expr().unwrap_or_default();

        if !literal.quoted && !literal.has_wildcard() {
            return Predicate::new(
                format!("hasTokenCaseInsensitive({}, ?)", column),
                vec![literal.text.clone()],
            );
        }

        let pattern = if literal.has_wildcard() {
            wildcard_pattern(&literal.text)
        } else {
            format!("%{}%", escape_like(&literal.text))
        };
        Predicate::new(format!("{} ILIKE ?", column), vec![pattern])
    }

    fn keyed(&self, key: &str, op: Operator, value: &ValueSpec) -> Result<Predicate> {
        let field = self.resolver.resolve(key);

        // != compiles as = and is negated as a whole
        let base_op = if op == Operator::NotEq { Operator::Eq } else { op };

        let predicate = match value {
            _ if field == ResolvedField::Unresolved => match self.unknown_fields {
                UnknownFieldPolicy::Reject => return Err(SearchError::unknown_field(key)),
                UnknownFieldPolicy::MatchNone => {
                    tracing::warn!(key, "unknown search key, matching nothing");
                    Predicate::never()
                },
            },
            ValueSpec::Single(literal) => self.elementary(&field, key, base_op, literal)?,
            ValueSpec::List(literals) => {
                let predicates = literals
                    .iter()
                    .map(|literal| self.elementary(&field, key, base_op, literal))
                    .collect::<Result<Vec<_>>>()?;
                Predicate::any_of(predicates)
            },
        };

        Ok(if op == Operator::NotEq {
            predicate.negate()
        } else {
            predicate
        })
    }

    fn elementary(
        &self,
        field: &ResolvedField<'_>,
        key: &str,
        op: Operator,
        literal: &Literal,
    ) -> Result<Predicate> {
        let wildcard = literal.has_wildcard();
        let comparison = op.is_comparison();
        let expr = field
            .column_expr()
            .ok_or_else(|| SearchError::unknown_field(key))?;
        let column = if field.needs_string_cast(comparison, wildcard) {
            format!("toString({})", expr)
        } else {
            expr
        };
        let mut args = field.column_args();

        if wildcard {
            if comparison {
                return Err(SearchError::invalid_value(
                    key,
                    format!("wildcards cannot be used with '{}'", op),
                ));
            }
            args.push(wildcard_pattern(&literal.text));
            return Ok(Predicate::new(format!("{} ILIKE ?", column), args));
        }

        if comparison && matches!(field, ResolvedField::AttributeCell { .. }) {
            return Err(SearchError::invalid_value(
                key,
                format!("attribute values cannot be compared with '{}'", op),
            ));
        }

        let value = match field {
            ResolvedField::Column { duration: true, .. } => normalize_duration(key, &literal.text)?,
            _ => literal.text.clone(),
        };
        args.push(value);

        Ok(Predicate::new(format!("{} {} ?", column, op.as_sql()), args))
    }
}

/// Translate `*` markers to `%`, matching everything else literally.
///
/// The pattern is anchored: `*-graph` matches values ending in `-graph`, and
/// no implicit `%` is added on either side.
fn wildcard_pattern(text: &str) -> String {
    escape_like(text).replace('*', "%")
}
