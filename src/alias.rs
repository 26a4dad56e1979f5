//! Logical-to-physical name mapping for tables and columns.

use std::collections::HashMap;

use serde::Deserialize;

use crate::{GateDbError, Result};

/// Maps logical table and column keys to physical schema names.
///
/// Lookups are total: a key without a configured alias resolves to
/// itself, so an empty table behaves as the identity mapping. The table
/// is built once at startup and injected by value wherever names are
/// rendered; nothing reads it from process-wide state.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NameAliasTable {
    /// table key -> physical table name
    #[serde(default)]
    tables: HashMap<String, String>,
    /// table key -> (column key -> physical column name)
    #[serde(default)]
    columns: HashMap<String, HashMap<String, String>>,
}

impl NameAliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the table from its JSON configuration form.
    ///
    /// Both sections are optional; absent sections default to empty.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|err| GateDbError::Config(format!("invalid alias table JSON: {err}")))
    }

    /// Registers a physical name for a table key.
    pub fn alias_table(&mut self, key: impl Into<String>, physical: impl Into<String>) {
        self.tables.insert(key.into(), physical.into());
    }

    /// Registers a physical name for a (table key, column key) pair.
    pub fn alias_column(
        &mut self,
        table: impl Into<String>,
        key: impl Into<String>,
        physical: impl Into<String>,
    ) {
        self.columns
            .entry(table.into())
            .or_default()
            .insert(key.into(), physical.into());
    }

    /// Physical table name for a key, or the key itself.
    pub fn resolve_table<'a>(&'a self, key: &'a str) -> &'a str {
        self.tables.get(key).map(String::as_str).unwrap_or(key)
    }

    /// Physical column name for a (table key, column key) pair, or the
    /// column key itself.
    pub fn resolve_column<'a>(&'a self, table: &str, key: &'a str) -> &'a str {
        self.columns
            .get(table)
            .and_then(|columns| columns.get(key))
            .map(String::as_str)
            .unwrap_or(key)
    }
}
