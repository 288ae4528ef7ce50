use crate::{
    error::DbError,
    metadata::{ColumnMetadata, TableStats},
};
use async_trait::async_trait;
use model::records::row::RowData;

/// Sort key for a fetch. SQL Server sorts ascending unless told otherwise.
#[derive(Debug, Clone)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn asc(column: &str) -> Self {
        OrderBy {
            column: column.to_string(),
            descending: false,
        }
    }

    pub fn desc(column: &str) -> Self {
        OrderBy {
            column: column.to_string(),
            descending: true,
        }
    }
}

/// A read request for the complete, ordered contents of a source table.
/// No pagination: the full result set is materialized in memory.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub table: String,
    pub order_by: Vec<OrderBy>,
}

impl FetchRequest {
    pub fn new(table: &str, order_by: Vec<OrderBy>) -> Self {
        FetchRequest {
            table: table.to_string(),
            order_by,
        }
    }

    pub fn to_sql(&self) -> String {
        let mut sql = format!("SELECT * FROM {}", quote_ident(&self.table));
        if !self.order_by.is_empty() {
            let keys: Vec<String> = self
                .order_by
                .iter()
                .map(|key| {
                    if key.descending {
                        format!("{} DESC", quote_ident(&key.column))
                    } else {
                        quote_ident(&key.column)
                    }
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&keys.join(", "));
        }
        sql
    }
}

/// Bracket-quotes a SQL Server identifier.
pub(crate) fn quote_ident(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}

/// Read-only access to the source store: ordered row fetches plus the
/// schema-introspection and row-count queries the inspection commands use.
#[async_trait]
pub trait SourceReader: Send {
    async fn fetch_rows(&mut self, request: &FetchRequest) -> Result<Vec<RowData>, DbError>;

    async fn table_schema(&mut self, table: &str) -> Result<Vec<ColumnMetadata>, DbError>;

    async fn list_tables(&mut self) -> Result<Vec<String>, DbError>;

    async fn row_count(&mut self, table: &str) -> Result<u64, DbError>;

    async fn table_stats(&mut self, table: &str) -> Result<TableStats, DbError>;

    /// Attempts a trivial query; returns Err if the store is unreachable.
    async fn ping(&mut self) -> Result<(), DbError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_request_renders_ordering_keys() {
        let request = FetchRequest::new(
            "executive_report_new_month",
            vec![
                OrderBy::desc("month"),
                OrderBy::asc("clinic"),
                OrderBy::asc("traffic_source"),
            ],
        );

        assert_eq!(
            request.to_sql(),
            "SELECT * FROM [executive_report_new_month] \
             ORDER BY [month] DESC, [clinic], [traffic_source]"
        );
    }

    #[test]
    fn test_fetch_request_without_ordering() {
        let request = FetchRequest::new("paid_ads", vec![]);
        assert_eq!(request.to_sql(), "SELECT * FROM [paid_ads]");
    }

    #[test]
    fn test_quote_ident_escapes_closing_bracket() {
        assert_eq!(quote_ident("odd]name"), "[odd]]name]");
    }
}
