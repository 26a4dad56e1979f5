//! Decoding of driver output into the typed result model.
//!
//! All failures are folded into the result's status: a cast failure is
//! caught per column, logged with the offending command text, and the
//! remaining columns keep decoding.

use crate::driver::RowCursor;
use crate::error::GateDbError;
use crate::types::{ExecStatus, NonQueryResult, SelectColumn, SelectResult};
use crate::value::TypeTag;

/// Decodes a forward-only cursor into a column-oriented result.
///
/// `declared` carries the resolved (name, tag) pairs of the select's
/// column list; under `select_all` the cursor's own column names are
/// used instead, all tagged [`TypeTag::Native`].
pub(crate) fn decode_select(
    command: &str,
    declared: &[(String, TypeTag)],
    select_all: bool,
    cursor: &mut dyn RowCursor,
) -> SelectResult {
    let mut columns: Vec<SelectColumn> = if select_all {
        cursor
            .column_names()
            .iter()
            .map(|name| SelectColumn::new(name.clone(), TypeTag::Native))
            .collect()
    } else {
        declared
            .iter()
            .map(|(name, tag)| SelectColumn::new(name.clone(), *tag))
            .collect()
    };

    let mut failed = false;
    let mut rows = 0_usize;
    loop {
        match cursor.next_row() {
            Ok(Some(row)) => {
                rows += 1;
                for (ordinal, column) in columns.iter_mut().enumerate() {
                    let Some(raw) = row.get(ordinal) else {
                        failed = true;
                        let error = GateDbError::Cast {
                            column: column.name.clone(),
                            command: command.to_owned(),
                            detail: format!("row has no value at ordinal {ordinal}"),
                        };
                        tracing::error!(error = %error, "column decode failed");
                        continue;
                    };
                    match column.tag.decode(raw) {
                        Ok(value) => column.values.push(value),
                        Err(detail) => {
                            failed = true;
                            let error = GateDbError::Cast {
                                column: column.name.clone(),
                                command: command.to_owned(),
                                detail,
                            };
                            tracing::error!(error = %error, "column decode failed");
                        }
                    }
                }
            }
            Ok(None) => break,
            Err(err) => {
                failed = true;
                let error = GateDbError::Execution {
                    command: command.to_owned(),
                    detail: err.to_string(),
                };
                tracing::error!(error = %error, "row fetch failed");
                break;
            }
        }
    }

    let status = if failed {
        ExecStatus::Failure
    } else if rows == 0 {
        ExecStatus::NoResults
    } else {
        ExecStatus::Success
    };

    SelectResult {
        command: command.to_owned(),
        status,
        columns,
    }
}

/// Wraps a rows-affected count in the result model.
pub(crate) fn decode_non_query(command: &str, rows_affected: u64) -> NonQueryResult {
    let status = if rows_affected > 0 {
        ExecStatus::Success
    } else {
        ExecStatus::NoResults
    };
    NonQueryResult {
        command: command.to_owned(),
        status,
        rows_affected,
    }
}

/// Empty select result carrying the FAILURE status.
pub(crate) fn select_failure(command: &str) -> SelectResult {
    SelectResult {
        command: command.to_owned(),
        status: ExecStatus::Failure,
        columns: Vec::new(),
    }
}

/// Zero-row non-query result carrying the FAILURE status.
pub(crate) fn non_query_failure(command: &str) -> NonQueryResult {
    NonQueryResult {
        command: command.to_owned(),
        status: ExecStatus::Failure,
        rows_affected: 0,
    }
}
