use crate::value::{TypeTag, Value};

/// Execution status attached to every result.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ExecStatus {
    /// Execution has not happened yet.
    #[default]
    Unset,
    /// At least one row, column, or affected row was produced.
    Success,
    /// An error occurred during execution or decoding.
    Failure,
    /// Execution succeeded but produced nothing.
    NoResults,
}

/// One named, type-tagged column of a select result.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectColumn {
    /// Physical column name.
    pub name: String,
    /// Declared value kind driving the decode strategy.
    pub tag: TypeTag,
    /// Decoded values in row order.
    pub values: Vec<Value>,
}

impl SelectColumn {
    pub fn new(name: impl Into<String>, tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            tag,
            values: Vec::new(),
        }
    }

    /// Reads a decoded value by row index.
    ///
    /// Out-of-range reads return the tag's zero value instead of failing.
    pub fn value(&self, index: usize) -> Value {
        self.values
            .get(index)
            .cloned()
            .unwrap_or_else(|| self.tag.zero())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Column-oriented output of a row-bearing statement.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectResult {
    /// Command text the result was produced from.
    pub command: String,
    pub status: ExecStatus,
    /// Columns in declaration order.
    pub columns: Vec<SelectColumn>,
}

impl SelectResult {
    /// Looks a column up by its physical name.
    pub fn column(&self, name: &str) -> Option<&SelectColumn> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Number of decoded rows (the longest column's length).
    pub fn row_count(&self) -> usize {
        self.columns
            .iter()
            .map(SelectColumn::len)
            .max()
            .unwrap_or(0)
    }
}

/// Output of an execution-only statement.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NonQueryResult {
    /// Command text the result was produced from.
    pub command: String,
    pub status: ExecStatus,
    pub rows_affected: u64,
}

/// Outcome of one submitted operation.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryOutput {
    Select(SelectResult),
    NonQuery(NonQueryResult),
}

impl QueryOutput {
    pub fn command(&self) -> &str {
        match self {
            Self::Select(result) => &result.command,
            Self::NonQuery(result) => &result.command,
        }
    }

    pub fn status(&self) -> ExecStatus {
        match self {
            Self::Select(result) => result.status,
            Self::NonQuery(result) => result.status,
        }
    }

    pub fn as_select(&self) -> Option<&SelectResult> {
        match self {
            Self::Select(result) => Some(result),
            Self::NonQuery(_) => None,
        }
    }

    pub fn as_non_query(&self) -> Option<&NonQueryResult> {
        match self {
            Self::NonQuery(result) => Some(result),
            Self::Select(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ExecStatus, SelectColumn, SelectResult};
    use crate::{TypeTag, Value};

    #[test]
    fn out_of_range_reads_return_zero_value() {
        let mut column = SelectColumn::new("Steam64", TypeTag::Unsigned64);
        column.values.push(Value::UInt64(7));

        assert_eq!(column.value(0), Value::UInt64(7));
        assert_eq!(column.value(1), Value::UInt64(0));
        assert_eq!(column.value(999), Value::UInt64(0));
    }

    #[test]
    fn native_column_zero_is_null() {
        let column = SelectColumn::new("anything", TypeTag::Native);
        assert_eq!(column.value(0), Value::Null);
    }

    #[test]
    fn column_lookup_by_name() {
        let result = SelectResult {
            command: "SELECT `A` FROM `t`;".to_owned(),
            status: ExecStatus::Success,
            columns: vec![SelectColumn::new("A", TypeTag::Int32)],
        };
        assert!(result.column("A").is_some());
        assert!(result.column("B").is_none());
    }

    #[test]
    fn status_defaults_to_unset() {
        assert_eq!(ExecStatus::default(), ExecStatus::Unset);
    }
}
