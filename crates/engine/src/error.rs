use crate::transform::TransformError;
use connectors::error::{ConnectorError, DbError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// A store could not be reached.
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectorError),

    /// A statement was malformed or rejected.
    #[error("Query error: {0}")]
    Query(#[from] DbError),

    /// A source record could not be mapped to the destination schema.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// The unconditional delete failed; no insert was attempted.
    #[error("Delete of destination table '{table}' failed: {source}")]
    DeleteFailed {
        table: String,
        #[source]
        source: DbError,
    },

    /// One or more batches failed after the destructive delete succeeded.
    /// The most consequential failure mode: the destination table is left
    /// truncated with no automatic rollback.
    #[error(
        "Partial write: {failed} of {total} batches failed after the delete, {lost} records lost"
    )]
    PartialWrite {
        failed: usize,
        total: usize,
        lost: usize,
    },

    #[error("Sync timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Shutdown requested")]
    ShutdownRequested,

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}
