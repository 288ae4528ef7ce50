use connectors::error::{ConnectorError, DbError, RelayError};
use engine::error::SyncError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),

    #[error("Connection error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("Invalid test target '{0}' (expected \"source\" or \"destination\")")]
    InvalidTestTarget(String),

    #[error("Row counts differ: source has {source_rows} rows, destination has {destination}")]
    CountMismatch { source_rows: u64, destination: u64 },
}
