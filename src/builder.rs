//! Pure rendering of query descriptors into SQL text plus parameters.
//!
//! Both builders are leaves: they know nothing about the gate or the
//! driver. The emitted text and the 0-based `@N` positional-parameter
//! convention are the compatibility surface consumed by downstream
//! query logs — the exact strings matter.

use std::fmt::Write;

use crate::alias::NameAliasTable;
use crate::intent::{ComparisonOperator, SelectIntent, Statement, UpdateOperation, UpsertIntent};
use crate::value::Value;

fn push_quoted(sql: &mut String, name: &str) {
    sql.push('`');
    sql.push_str(name);
    sql.push('`');
}

/// Renders a single-table select.
pub fn build_select(intent: &SelectIntent, aliases: &NameAliasTable) -> Statement {
    let mut sql = String::from("SELECT ");
    if intent.select_all {
        sql.push('*');
    } else {
        for (index, (key, _)) in intent.columns.iter().enumerate() {
            if index > 0 {
                sql.push_str(", ");
            }
            push_quoted(&mut sql, aliases.resolve_column(&intent.table, key));
        }
    }
    sql.push_str(" FROM ");
    push_quoted(&mut sql, aliases.resolve_table(&intent.table));

    let mut params = Vec::new();
    if let Some(predicate) = &intent.predicate {
        // A predicate without a value, or with the None operator, is
        // silently dropped rather than rejected.
        if predicate.operator != ComparisonOperator::None {
            if let Some(value) = &predicate.value {
                sql.push_str(" WHERE ");
                push_quoted(&mut sql, aliases.resolve_column(&intent.table, &predicate.column));
                sql.push(' ');
                sql.push_str(predicate.operator.text());
                if predicate.operator.binds_value() {
                    sql.push_str(" @0");
                    params.push(value.clone());
                }
            }
        }
    }

    if intent.limit != -1 {
        let _ = write!(sql, " LIMIT {}", intent.limit);
    }
    sql.push(';');

    Statement::query(sql, params)
}

/// Renders an `INSERT ... ON DUPLICATE KEY UPDATE` statement.
///
/// New-value parameters occupy positions `0..N-1` in insertion order.
/// Each update operation that consumes a value advances the last
/// allocated index by one, so update placeholders continue directly
/// after the insert list — even when the explicit update-value list is
/// shorter than the number of consuming operations (the placeholders
/// keep advancing; binding simply stops).
pub fn build_upsert(intent: &UpsertIntent, aliases: &NameAliasTable) -> Statement {
    let mut sql = String::from("INSERT INTO ");
    push_quoted(&mut sql, aliases.resolve_table(&intent.table));
    sql.push_str(" (");
    for (index, (key, _)) in intent.values.iter().enumerate() {
        if index > 0 {
            sql.push_str(", ");
        }
        push_quoted(&mut sql, aliases.resolve_column(&intent.table, key));
    }
    sql.push_str(") VALUES(");
    for index in 0..intent.values.len() {
        if index > 0 {
            sql.push_str(", ");
        }
        let _ = write!(sql, "@{index}");
    }
    sql.push_str(") ON DUPLICATE KEY UPDATE ");

    let mut params: Vec<Value> = intent.values.iter().map(|(_, value)| value.clone()).collect();
    let mut next_index = intent.values.len();
    let mut update_values = intent.update_values.iter();

    for (index, (key, operation)) in intent.update_ops.iter().enumerate() {
        if index > 0 {
            sql.push_str(", ");
        }
        let column = aliases.resolve_column(&intent.table, key);
        push_quoted(&mut sql, column);
        sql.push_str(" = ");

        if *operation == UpdateOperation::SetFromValues {
            let _ = write!(sql, "VALUES({column})");
            continue;
        }

        let placeholder = next_index;
        next_index += 1;
        if let Some(value) = update_values.next() {
            params.push(value.clone());
        }

        match operation {
            UpdateOperation::Set => {
                let _ = write!(sql, "@{placeholder}");
            }
            UpdateOperation::Add => {
                let _ = write!(sql, "{column} + @{placeholder}");
            }
            UpdateOperation::Subtract => {
                let _ = write!(sql, "{column} - @{placeholder}");
            }
            // Multiply renders the divide operator. Existing query logs
            // and callers expect this exact text; do not normalize it.
            UpdateOperation::Multiply | UpdateOperation::Divide => {
                let _ = write!(sql, "{column} / @{placeholder}");
            }
            UpdateOperation::SetFromValues => {}
        }
    }
    sql.push(';');

    Statement::execute(sql, params)
}
