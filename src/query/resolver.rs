//! Maps logical keys onto physical storage.

use crate::core::TableConfig;

/// Where a term's value lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedField<'a> {
    /// A plain column
    Column {
        name: &'a str,
        /// Values are nanoseconds and literals need unit normalization
        duration: bool,
    },
    /// A cell of an attribute map, addressed by the full key
    AttributeCell { column: &'a str, key: &'a str },
    /// The free-text body column
    Body(&'a str),
    /// Nothing is configured for this key
    Unresolved,
}

impl ResolvedField<'_> {
    /// Whether equality comparisons wrap the column in `toString(...)`.
    ///
    /// Only plain columns need it; ordering comparisons and pattern
    /// matches use the native value.
    pub fn needs_string_cast(&self, comparison: bool, wildcard: bool) -> bool {
        matches!(self, ResolvedField::Column { .. }) && !comparison && !wildcard
    }

    /// SQL expression reading the field, with `?` for the map key if any
    pub fn column_expr(&self) -> Option<String> {
        match self {
            ResolvedField::Column { name, .. } | ResolvedField::Body(name) => {
                Some((*name).to_string())
            },
            ResolvedField::AttributeCell { column, .. } => Some(format!("{}[?]", column)),
            ResolvedField::Unresolved => None,
        }
    }

    /// Arguments consumed by [`column_expr`](Self::column_expr)
    pub fn column_args(&self) -> Vec<String> {
        match self {
            ResolvedField::AttributeCell { key, .. } => vec![(*key).to_string()],
            _ => Vec::new(),
        }
    }
}

/// Resolves keys against one table layout
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver<'a> {
    table: &'a TableConfig,
}

impl<'a> FieldResolver<'a> {
    /// Create a resolver over `table`
    pub fn new(table: &'a TableConfig) -> Self {
        Self { table }
    }

    /// The body column
    pub fn body(&self) -> ResolvedField<'a> {
        ResolvedField::Body(&self.table.body_column)
    }

    /// Resolve a logical key.
    ///
    /// Direct columns win. Otherwise the first attribute mapping whose
    /// non-empty prefix starts the key is used, then the catch-all.
    pub fn resolve<'k>(&self, key: &'k str) -> ResolvedField<'k>
    where
        'a: 'k,
    {
        if let Some(column) = self.table.keys_to_columns.get(key) {
            return ResolvedField::Column {
                name: column,
                duration: self.table.is_duration(key),
            };
        }

        let mapping = self
            .table
            .attributes_columns
            .iter()
            .find(|m| !m.is_catch_all() && key.starts_with(&m.prefix))
            .or_else(|| self.table.catch_all());

        match mapping {
            Some(m) => ResolvedField::AttributeCell {
                column: &m.column,
                key,
            },
            None => ResolvedField::Unresolved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ColumnMapping;

    #[test]
    fn test_direct_column() {
        let table = TableConfig::traces();
        let resolver = FieldResolver::new(&table);
        assert_eq!(
            resolver.resolve("span_name"),
            ResolvedField::Column {
                name: "SpanName",
                duration: false
            }
        );
        assert_eq!(
            resolver.resolve("duration"),
            ResolvedField::Column {
                name: "Duration",
                duration: true
            }
        );
    }

    #[test]
    fn test_direct_column_beats_prefix() {
        let table = TableConfig::traces();
        let resolver = FieldResolver::new(&table);
        assert!(matches!(
            resolver.resolve("http.url"),
            ResolvedField::Column { name: "HttpUrl", .. }
        ));
    }

    #[test]
    fn test_prefix_keeps_full_key() {
        let table = TableConfig::traces();
        let resolver = FieldResolver::new(&table);
        assert_eq!(
            resolver.resolve("http.custom"),
            ResolvedField::AttributeCell {
                column: "HttpAttributes",
                key: "http.custom"
            }
        );
    }

    #[test]
    fn test_catch_all() {
        let table = TableConfig::traces();
        let resolver = FieldResolver::new(&table);
        assert_eq!(
            resolver.resolve("custom"),
            ResolvedField::AttributeCell {
                column: "TraceAttributes",
                key: "custom"
            }
        );
    }

    #[test]
    fn test_first_prefix_wins_even_if_catch_all_listed_first() {
        let mut table = TableConfig::logs();
        table.attributes_columns = vec![
            ColumnMapping::catch_all("LogAttributes"),
            ColumnMapping::prefixed("k8s.", "K8sAttributes"),
            ColumnMapping::prefixed("k8s.pod.", "PodAttributes"),
        ];
        let resolver = FieldResolver::new(&table);
        assert_eq!(
            resolver.resolve("k8s.pod.name"),
            ResolvedField::AttributeCell {
                column: "K8sAttributes",
                key: "k8s.pod.name"
            }
        );
    }

    #[test]
    fn test_unresolved_without_catch_all() {
        let mut table = TableConfig::traces();
        table.attributes_columns.retain(|m| !m.is_catch_all());
        let resolver = FieldResolver::new(&table);
        assert_eq!(resolver.resolve("custom"), ResolvedField::Unresolved);
        assert!(matches!(resolver.resolve("http.method"), ResolvedField::AttributeCell { .. }));
    }

    #[test]
    fn test_string_cast_rules() {
        let column = ResolvedField::Column {
            name: "Level",
            duration: false,
        };
        assert!(column.needs_string_cast(false, false));
        assert!(!column.needs_string_cast(true, false));
        assert!(!column.needs_string_cast(false, true));

        let cell = ResolvedField::AttributeCell {
            column: "TraceAttributes",
            key: "custom",
        };
        assert!(!cell.needs_string_cast(false, false));
        assert_eq!(cell.column_expr().unwrap(), "TraceAttributes[?]");
        assert_eq!(cell.column_args(), vec!["custom"]);
    }
}
