//! Defines the AST for an INSERT statement.

use crate::ast::common::TableRef;
use model::core::value::Value;

/// Represents a complete INSERT statement.
///
/// This structure supports both single-row and multi-row (batch) inserts
/// through the `values` field, which is a list of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insert {
    pub table: TableRef,
    pub columns: Vec<String>,
    /// The rows of values to be inserted. Each inner vector represents a single row.
    pub values: Vec<Vec<Value>>,
}

impl Insert {
    /// Builds a multi-row insert covering one batch of records, columns in
    /// declared destination order.
    pub fn multi_row(table: &str, columns: &[String], rows: Vec<Vec<Value>>) -> Self {
        Insert {
            table: TableRef::new(table),
            columns: columns.to_vec(),
            values: rows,
        }
    }
}
