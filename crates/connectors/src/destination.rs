use crate::error::DbError;
use async_trait::async_trait;
use model::core::value::Value;

/// Write access to the destination store. All statements are parameterized;
/// values never appear as literal text.
#[async_trait]
pub trait DestinationClient: Send + Sync {
    /// Issues a single unconditional delete covering all rows of the table.
    async fn delete_all(&self, table: &str) -> Result<(), DbError>;

    /// Writes one batch of records as a single multi-row insert, columns in
    /// declared destination order.
    async fn write_batch(
        &self,
        table: &str,
        columns: &[String],
        rows: Vec<Vec<Value>>,
    ) -> Result<(), DbError>;

    async fn row_count(&self, table: &str) -> Result<u64, DbError>;

    /// Attempts a trivial statement; returns Err if the store is unreachable.
    async fn ping(&self) -> Result<(), DbError>;
}
