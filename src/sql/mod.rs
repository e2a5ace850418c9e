//! SQL statement building and literal escaping.
//!
//! The search compiler never writes user input into SQL text. It hands a
//! [`Condition`] (fragment with `?` placeholders plus arguments) to a
//! [`ConditionSink`]; [`SelectBuilder`] is the sink used by the CLI and tests.

pub mod builder;
pub mod escape;

pub use builder::{Condition, ConditionSink, Flavor, SelectBuilder};
pub use escape::{escape_like, escape_string, quote_string, unescape_string};
