//! Defines the AST for a DELETE statement.

use crate::ast::common::TableRef;

/// Represents a DELETE statement. With no predicate it covers every row of
/// the target table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delete {
    pub table: TableRef,
}

impl Delete {
    pub fn all_rows(table: &str) -> Self {
        Delete {
            table: TableRef::new(table),
        }
    }
}
