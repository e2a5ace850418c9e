//! Folds token sequences into a predicate tree.
//!
//! Precedence is conventional: adjacent terms and explicit `AND` bind tighter
//! than `OR`, and a parenthesized group always binds as one operand. Each
//! call works on its own token slice and returns the unconsumed rest, so no
//! connector state leaks between nesting levels.

use super::ast::{Connector, Expression, Literal, Term, Token, ValueSpec};
use super::term::TermCompiler;
use crate::core::{Result, SearchError};

/// Deepest group nesting a query may use
pub const MAX_NESTING_DEPTH: usize = 64;

/// Builds one [`Expression`] from a token sequence
#[derive(Debug, Clone, Copy)]
pub struct Combinator<'a> {
    terms: TermCompiler<'a>,
}

impl<'a> Combinator<'a> {
    /// Create a combinator compiling terms with `terms`
    pub fn new(terms: TermCompiler<'a>) -> Self {
        Self { terms }
    }

    /// Combine all tokens. `None` means the query has no terms.
    pub fn combine(&self, tokens: &[Token]) -> Result<Option<Expression>> {
        if tokens.is_empty() {
            return Ok(None);
        }

        let (expr, rest) = self.sequence(tokens, 0)?;
        if !rest.is_empty() {
            return Err(SearchError::syntax("unmatched ')'"));
        }
        Ok(Some(expr))
    }

    /// Parse `operand (connector? operand)*` up to the end or a `)`.
    ///
    /// `depth` counts the enclosing groups; above zero the sequence must end
    /// at a `)`, which is left in the returned slice for the caller.
    fn sequence<'t>(&self, tokens: &'t [Token], depth: usize) -> Result<(Expression, &'t [Token])> {
        let in_group = depth > 0;
        let mut nodes = Vec::new();
        let mut connectors = Vec::new();
        let mut pending: Option<Connector> = None;
        let mut rest = tokens;

        loop {
            match rest.first() {
                None if in_group => return Err(SearchError::syntax("unmatched '('")),
                None => break,
                Some(Token::RParen) if in_group => break,
                Some(Token::RParen) => return Err(SearchError::syntax("unmatched ')'")),
                Some(Token::Keyword(connector)) => {
                    if nodes.is_empty() {
                        return Err(SearchError::syntax(format!(
                            "'{}' has no term on its left",
                            connector
                        )));
                    }
                    if let Some(previous) = pending {
                        return Err(SearchError::syntax(format!(
                            "'{}' directly follows '{}'",
                            connector, previous
                        )));
                    }
                    pending = Some(*connector);
                    rest = &rest[1..];
                },
                Some(_) => {
                    let (node, remaining) = self.operand(rest, depth)?;
                    if !nodes.is_empty() {
                        connectors.push(pending.take().unwrap_or(Connector::And));
                    }
                    nodes.push(node);
                    rest = remaining;
                },
            }
        }

        if let Some(connector) = pending {
            return Err(SearchError::syntax(format!(
                "'{}' has no term on its right",
                connector
            )));
        }
        if nodes.is_empty() {
            return Err(SearchError::syntax("empty group '()'"));
        }

        Ok((fold(nodes, connectors), rest))
    }

    /// Parse one group, keyed term or body term
    fn operand<'t>(&self, tokens: &'t [Token], depth: usize) -> Result<(Expression, &'t [Token])> {
        match tokens {
            [Token::LParen, rest @ ..] => {
                if depth >= MAX_NESTING_DEPTH {
                    return Err(SearchError::syntax(format!(
                        "query nests deeper than {} groups",
                        MAX_NESTING_DEPTH
                    )));
                }
                let (inner, rest) = self.sequence(rest, depth + 1)?;
                match rest {
                    [Token::RParen, rest @ ..] => Ok((inner, rest)),
                    _ => Err(SearchError::syntax("unmatched '('")),
                }
            },
            [Token::Word(key), Token::Operator(op), rest @ ..] => {
                let (value, rest) = value_spec(rest, key)?;
                let term = Term::Keyed {
                    key: key.clone(),
                    op: *op,
                    value,
                };
                Ok((Expression::Predicate(self.terms.compile(&term)?), rest))
            },
            [Token::Phrase(_), Token::Operator(op), ..] => Err(SearchError::syntax(format!(
                "operator '{}' must follow a bare key, not a quoted phrase",
                op
            ))),
            [Token::Word(text), rest @ ..] => {
                let term = Term::Body(Literal::word(text.as_str()));
                Ok((Expression::Predicate(self.terms.compile(&term)?), rest))
            },
            [Token::Phrase(text), rest @ ..] => {
                let term = Term::Body(Literal::phrase(text.as_str()));
                Ok((Expression::Predicate(self.terms.compile(&term)?), rest))
            },
            [Token::Operator(op), ..] => Err(SearchError::syntax(format!(
                "operator '{}' has no key",
                op
            ))),
            _ => Err(SearchError::syntax("expected a term")),
        }
    }
}

/// Parse the value after `key OP`
fn value_spec<'t>(tokens: &'t [Token], key: &str) -> Result<(ValueSpec, &'t [Token])> {
    match tokens {
        [Token::Word(text), rest @ ..] => {
            Ok((ValueSpec::Single(Literal::word(text.as_str())), rest))
        },
        [Token::Phrase(text), rest @ ..] => {
            Ok((ValueSpec::Single(Literal::phrase(text.as_str())), rest))
        },
        [Token::LParen, rest @ ..] => {
            let (literals, rest) = value_list(rest, key)?;
            Ok((ValueSpec::List(literals), rest))
        },
        _ => Err(SearchError::syntax(format!("'{}' has no value", key))),
    }
}

/// Parse `v1 OR v2 ... )`, consuming the closing parenthesis
fn value_list<'t>(tokens: &'t [Token], key: &str) -> Result<(Vec<Literal>, &'t [Token])> {
    let mut literals = Vec::new();
    let mut rest = tokens;

    loop {
        let literal = match rest.first() {
            Some(Token::Word(text)) => Literal::word(text.as_str()),
            Some(Token::Phrase(text)) => Literal::phrase(text.as_str()),
            Some(Token::RParen) if literals.is_empty() => {
                return Err(SearchError::syntax(format!("empty value list for '{}'", key)));
            },
            _ => {
                return Err(SearchError::syntax(format!(
                    "expected a value in the list for '{}'",
                    key
                )));
            },
        };
        literals.push(literal);
        rest = &rest[1..];

        match rest.first() {
            Some(Token::RParen) => return Ok((literals, &rest[1..])),
            Some(Token::Keyword(Connector::Or)) => rest = &rest[1..],
            _ => {
                return Err(SearchError::syntax(format!(
                    "values in the list for '{}' must be separated by OR",
                    key
                )));
            },
        }
    }
}

/// Group nodes into OR-separated runs of AND
fn fold(nodes: Vec<Expression>, connectors: Vec<Connector>) -> Expression {
    let mut runs: Vec<Vec<Expression>> = Vec::new();
    let mut current = Vec::new();
    let mut nodes = nodes.into_iter();

    if let Some(first) = nodes.next() {
        current.push(first);
    }
    for (connector, node) in connectors.into_iter().zip(nodes) {
        if connector == Connector::Or {
            runs.push(std::mem::take(&mut current));
        }
        current.push(node);
    }
    runs.push(current);

    let conjunctions = runs
        .into_iter()
        .map(|run| Expression::join(Connector::And, run))
        .collect();
    Expression::join(Connector::Or, conjunctions)
}
