use crate::error::SyncError;
use std::time::Duration;

/// Records per multi-row insert statement.
pub const DEFAULT_BATCH_SIZE: usize = 50;

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub batch_size: usize,
    /// Continue past failed batches instead of stopping at the first one.
    pub keep_going: bool,
    /// Concurrent batch writes. 1 = strictly sequential.
    pub parallelism: usize,
    /// Overall operation timeout.
    pub timeout: Option<Duration>,
    /// Fetch and transform only; no destructive writes.
    pub dry_run: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            batch_size: DEFAULT_BATCH_SIZE,
            keep_going: false,
            parallelism: 1,
            timeout: None,
            dry_run: false,
        }
    }
}

impl SyncSettings {
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.batch_size == 0 {
            return Err(SyncError::InvalidSettings(
                "batch size must be at least 1".into(),
            ));
        }
        if self.parallelism == 0 {
            return Err(SyncError::InvalidSettings(
                "parallelism must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
