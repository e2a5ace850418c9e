//! Common test utilities and fixtures.

#![allow(dead_code)]

use spanq_lib::core::{ColumnMapping, Result, TableConfig, UnknownFieldPolicy};
use spanq_lib::query::SearchCompiler;
use spanq_lib::sql::{Flavor, SelectBuilder};
use std::collections::{BTreeMap, BTreeSet};

/// The spans table used throughout the integration tests.
pub fn table_config() -> TableConfig {
    let keys_to_columns: BTreeMap<String, String> = [
        ("duration", "Duration"),
        ("level", "Level"),
        ("span_name", "SpanName"),
        ("service_name", "ServiceName"),
        ("source", "Source"),
        ("http.url", "HttpUrl"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    TableConfig {
        keys_to_columns,
        body_column: "SpanName".to_string(),
        attributes_columns: vec![
            ColumnMapping::prefixed("http.", "HttpAttributes"),
            ColumnMapping::catch_all("TraceAttributes"),
        ],
        duration_keys: BTreeSet::from(["duration".to_string()]),
    }
}

/// Render `SELECT * FROM t WHERE <query>` with arguments inlined.
pub fn build_sql_for_query(query: &str) -> Result<String> {
    build_sql_with(query, &table_config(), UnknownFieldPolicy::Reject)
}

/// Like [`build_sql_for_query`] with an explicit table and policy.
pub fn build_sql_with(
    query: &str,
    table: &TableConfig,
    policy: UnknownFieldPolicy,
) -> Result<String> {
    let mut sb = SelectBuilder::new().select(&["*"]).from("t");
    SearchCompiler::new(table)
        .with_unknown_fields(policy)
        .assign(&mut sb, query)?;
    sb.build_with_flavor(Flavor::ClickHouse)
}

/// Render only the WHERE condition for `query`.
pub fn where_clause(query: &str) -> String {
    let sql = build_sql_for_query(query).expect("query should compile");
    sql.strip_prefix("SELECT * FROM t WHERE ")
        .unwrap_or_else(|| panic!("no WHERE clause in {}", sql))
        .to_string()
}
