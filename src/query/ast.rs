//! Syntax and predicate trees for the search language.

use crate::sql::Condition;
use std::fmt;

/// Lexical tokens, in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Bare word: a key, a body term or a value
    Word(String),
    /// Double-quoted phrase, quotes stripped
    Phrase(String),
    /// Comparison operator between a key and its value
    Operator(Operator),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// Standalone `AND` / `OR`, any case
    Keyword(Connector),
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Equals (`=` or `:`)
    Eq,
    /// Not equals
    NotEq,
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
}

impl Operator {
    /// True for the ordering operators
    pub fn is_comparison(&self) -> bool {
        matches!(self, Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte)
    }

    /// SQL spelling of the operator
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
        }
    }
}

/// Boolean connectors between sibling expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

/// A value as typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub text: String,
    pub quoted: bool,
}

impl Literal {
    /// Unquoted literal
    pub fn word(text: impl Into<String>) -> Self {
        Literal {
            text: text.into(),
            quoted: false,
        }
    }

    /// Quoted literal
    pub fn phrase(text: impl Into<String>) -> Self {
        Literal {
            text: text.into(),
            quoted: true,
        }
    }

    /// True if the literal contains a `*` wildcard marker
    pub fn has_wildcard(&self) -> bool {
        self.text.contains('*')
    }
}

/// Right-hand side of a keyed term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSpec {
    Single(Literal),
    /// `(v1 OR v2 OR ...)`
    List(Vec<Literal>),
}

/// One unit of query meaning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// `key OP value`
    Keyed {
        key: String,
        op: Operator,
        value: ValueSpec,
    },
    /// Bare value searched in the body column
    Body(Literal),
}

/// Elementary SQL condition with `?` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub fragment: String,
    pub args: Vec<String>,
}

impl Predicate {
    /// Create a predicate
    pub fn new(fragment: impl Into<String>, args: Vec<String>) -> Self {
        Predicate {
            fragment: fragment.into(),
            args,
        }
    }

    /// Predicate that never matches
    pub fn never() -> Self {
        Predicate::new("1 = 0", Vec::new())
    }

    /// `NOT (self)`
    pub fn negate(self) -> Self {
        Predicate {
            fragment: format!("NOT ({})", self.fragment),
            args: self.args,
        }
    }

    /// Parenthesized OR of `predicates`
    pub fn any_of(predicates: Vec<Predicate>) -> Self {
        let mut fragments = Vec::with_capacity(predicates.len());
        let mut args = Vec::new();
        for p in predicates {
            fragments.push(p.fragment);
            args.extend(p.args);
        }
        Predicate {
            fragment: format!("({})", fragments.join(" OR ")),
            args,
        }
    }
}

/// Predicate tree produced by the compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Predicate(Predicate),
    /// `connectors.len() == children.len() - 1`
    Group {
        children: Vec<Expression>,
        connectors: Vec<Connector>,
    },
}

impl Expression {
    /// Join `children` with `connector`, splicing nested groups that use the
    /// same connector. A single child is returned as is.
    pub fn join(connector: Connector, children: Vec<Expression>) -> Self {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Expression::Group {
                    children: nested,
                    connectors,
                } if connectors.iter().all(|c| *c == connector) => flat.extend(nested),
                other => flat.push(other),
            }
        }

        if flat.len() == 1 {
            if let Some(only) = flat.pop() {
                return only;
            }
        }

        let connectors = vec![connector; flat.len().saturating_sub(1)];
        Expression::Group {
            children: flat,
            connectors,
        }
    }

    /// Number of elementary predicates in the tree
    pub fn predicate_count(&self) -> usize {
        match self {
            Expression::Predicate(_) => 1,
            Expression::Group { children, .. } => {
                children.iter().map(Expression::predicate_count).sum()
            },
        }
    }

    /// Render into a single condition
    pub fn to_condition(&self) -> Condition {
        let mut fragment = String::new();
        let mut args = Vec::new();
        self.render(false, &mut fragment, &mut args);
        Condition::new(fragment, args)
    }

    fn render(&self, nested: bool, out: &mut String, args: &mut Vec<String>) {
        match self {
            Expression::Predicate(p) => {
                out.push_str(&p.fragment);
                args.extend(p.args.iter().cloned());
            },
            Expression::Group { children, connectors } => {
                if children.len() == 1 {
                    children[0].render(nested, out, args);
                    return;
                }

                // OR always gets parentheses so callers can AND more conditions on
                let wrap = nested || connectors.contains(&Connector::Or);
                if wrap {
                    out.push('(');
                }
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        let connector = connectors.get(i - 1).copied().unwrap_or(Connector::And);
                        out.push_str(match connector {
                            Connector::And => " AND ",
                            Connector::Or => " OR ",
                        });
                    }
                    child.render(true, out, args);
                }
                if wrap {
                    out.push(')');
                }
            },
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connector::And => write!(f, "AND"),
            Connector::Or => write!(f, "OR"),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "\"{}\"", self.text)
        } else {
            write!(f, "{}", self.text)
        }
    }
}

impl fmt::Display for ValueSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSpec::Single(lit) => write!(f, "{}", lit),
            ValueSpec::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " OR ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            },
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Keyed { key, op, value } => write!(f, "{}{}{}", key, op, value),
            Term::Body(lit) => write!(f, "{}", lit),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_condition().fragment)
    }
}
