use std::string::FromUtf8Error;
use thiserror::Error;

/// All errors coming from the database/query layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Low-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any SQL Server driver error.
    #[error("SQL error: {0}")]
    Sql(#[from] tiberius::error::Error),

    /// A row or column could not be decoded into the generic value model.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The relay process reported or produced an error.
    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Errors happening during adapter or connection setup.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The driver failed to establish the connection.
    #[error("SQL Server connection failed: {0}")]
    Tiberius(#[from] tiberius::error::Error),

    /// The TCP stream could not be opened.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from invoking the external command-line relay process.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The configured relay command line was empty.
    #[error("Relay command is empty")]
    EmptyCommand,

    /// The relay process could not be spawned.
    #[error("Failed to spawn relay process: {0}")]
    Spawn(#[from] std::io::Error),

    /// The relay process exited with a non-zero status.
    #[error("Relay process exited with {code:?}: {stderr}")]
    Process { code: Option<i32>, stderr: String },

    /// The relay reply was not valid UTF-8.
    #[error("Relay reply is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// The relay reply was not valid JSON.
    #[error("Failed to parse relay reply as JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The relay reported a remote statement error.
    #[error("Destination store rejected the statement: {0}")]
    Remote(String),
}
