pub mod destination;
pub mod error;
pub mod metadata;
pub mod mssql;
pub mod relay;
pub mod source;
