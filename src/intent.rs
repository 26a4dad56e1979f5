//! One-shot query descriptors and the statements built from them.

use crate::value::{TypeTag, Value};

/// Comparison operator of a select predicate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ComparisonOperator {
    None,
    Equal,
    NotEqual,
    Like,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
    NullSafeEqual,
    Is,
    IsNot,
    IsNull,
    IsNotNull,
}

impl ComparisonOperator {
    /// SQL text of this operator.
    ///
    /// The table carries 12 distinct entries: `IsNot` renders the same
    /// text as `IsNull`. Emitted query logs depend on the exact strings,
    /// so the mapping is part of the compatibility surface.
    pub fn text(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Like => "LIKE",
            Self::Greater => ">",
            Self::Less => "<",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
            Self::NullSafeEqual => "<=>",
            Self::Is => "IS",
            Self::IsNot => "IS NULL",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }

    /// Whether a predicate with this operator binds the condition value
    /// to a positional placeholder.
    pub fn binds_value(self) -> bool {
        !matches!(self, Self::IsNull | Self::IsNotNull)
    }
}

/// Per-column operation of an upsert's update clause.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UpdateOperation {
    Set,
    SetFromValues,
    Subtract,
    Add,
    Multiply,
    Divide,
}

/// Single equality/comparison predicate of a select.
#[derive(Clone, Debug, PartialEq)]
pub struct Predicate {
    /// Logical column key the condition applies to.
    pub column: String,
    pub operator: ComparisonOperator,
    /// Condition value; a predicate without one is never emitted.
    pub value: Option<Value>,
}

/// Descriptor for a single-table select.
///
/// Created per call and never mutated after submission.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectIntent {
    /// Logical table key.
    pub table: String,
    /// Emit `SELECT *` and ignore the declared column list.
    pub select_all: bool,
    /// (column key, declared tag) pairs in emission order.
    pub columns: Vec<(String, TypeTag)>,
    pub predicate: Option<Predicate>,
    /// Row limit; `-1` means unlimited.
    pub limit: i64,
}

impl SelectIntent {
    /// Starts a descriptor with an explicit column list.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select_all: false,
            columns: Vec::new(),
            predicate: None,
            limit: -1,
        }
    }

    /// Starts a `SELECT *` descriptor.
    pub fn all(table: impl Into<String>) -> Self {
        Self {
            select_all: true,
            ..Self::new(table)
        }
    }

    /// Appends a typed column; order is emission order.
    pub fn column(mut self, key: impl Into<String>, tag: TypeTag) -> Self {
        self.columns.push((key.into(), tag));
        self
    }

    /// Sets the single predicate.
    pub fn filter(
        mut self,
        column: impl Into<String>,
        operator: ComparisonOperator,
        value: impl Into<Value>,
    ) -> Self {
        self.predicate = Some(Predicate {
            column: column.into(),
            operator,
            value: Some(value.into()),
        });
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }
}

/// Descriptor for an `INSERT ... ON DUPLICATE KEY UPDATE` statement.
///
/// Insertion order of the new-value list is semantically significant:
/// it drives positional parameter numbering.
#[derive(Clone, Debug, PartialEq)]
pub struct UpsertIntent {
    /// Logical table key.
    pub table: String,
    /// (column key, new value) pairs in insertion order.
    pub values: Vec<(String, Value)>,
    /// (column key, operation) pairs driving the update clause list.
    pub update_ops: Vec<(String, UpdateOperation)>,
    /// Explicit update values, consumed positionally by operations other
    /// than [`UpdateOperation::SetFromValues`].
    pub update_values: Vec<Value>,
}

impl UpsertIntent {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            values: Vec::new(),
            update_ops: Vec::new(),
            update_values: Vec::new(),
        }
    }

    /// Appends a new-value column.
    pub fn value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((key.into(), value.into()));
        self
    }

    /// Appends an update operation for a column.
    pub fn update(mut self, key: impl Into<String>, operation: UpdateOperation) -> Self {
        self.update_ops.push((key.into(), operation));
        self
    }

    /// Appends an explicit update value.
    pub fn update_value(mut self, value: impl Into<Value>) -> Self {
        self.update_values.push(value.into());
        self
    }
}

/// A rendered command: SQL text plus its ordered positional parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    /// SQL text with 0-based `@N` placeholders.
    pub sql: String,
    /// Parameter values in placeholder order.
    pub params: Vec<Value>,
    /// Whether the statement produces a row cursor.
    pub want_rows: bool,
}

impl Statement {
    /// Creates a row-returning statement.
    pub fn query(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
            want_rows: true,
        }
    }

    /// Creates an execution-only statement.
    pub fn execute(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
            want_rows: false,
        }
    }
}
