use crate::error::SyncError;
use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum FindingKind {
    Mapping,          // field map issues
    SourceData,       // e.g., missing data, type mismatch
    DestinationWrite, // failed or skipped batches
    Connectivity,     // auth/connection
    Other,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Finding {
    pub code: String,    // stable programmatic id
    pub message: String, // human-readable
    pub severity: Severity,
    pub kind: FindingKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>, // how to fix
}

/// Constants for finding codes.
const CODE_MAPPING_DUPLICATE_SOURCE: &str = "MAPPING_DUPLICATE_SOURCE";
const CODE_BATCH_WRITE_FAILED: &str = "BATCH_WRITE_FAILED";
const CODE_SHUTDOWN_REQUESTED: &str = "SHUTDOWN_REQUESTED";

impl Finding {
    pub fn new(
        code: &str,
        message: String,
        severity: Severity,
        kind: FindingKind,
        suggestion: Option<String>,
    ) -> Self {
        Finding {
            code: code.to_string(),
            message,
            severity,
            kind,
            suggestion,
        }
    }

    /// Creates a new finding for a source column feeding multiple destination
    /// columns.
    pub fn new_duplicate_mapping(source: &str, destinations: &[String]) -> Self {
        Self::new(
            CODE_MAPPING_DUPLICATE_SOURCE,
            format!(
                "Source column `{source}` feeds {} destination columns: {}.",
                destinations.len(),
                destinations.join(", ")
            ),
            Severity::Warning,
            FindingKind::Mapping,
            Some("Confirm with the data owner whether this duplication is intentional.".into()),
        )
    }

    /// Creates a new finding for a failed batch write.
    pub fn new_batch_failed(index: usize, records: usize, cause: &str) -> Self {
        Self::new(
            CODE_BATCH_WRITE_FAILED,
            format!("Batch {index} ({records} records) failed: {cause}"),
            Severity::Error,
            FindingKind::DestinationWrite,
            None,
        )
    }

    /// Creates a new finding for an interrupted run.
    pub fn new_shutdown_requested(skipped_batches: usize) -> Self {
        Self::new(
            CODE_SHUTDOWN_REQUESTED,
            format!("Shutdown requested; {skipped_batches} batches were not written."),
            Severity::Warning,
            FindingKind::Other,
            Some("Re-run the sync to fully replace the destination table.".into()),
        )
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum BatchStatus {
    Succeeded,
    Failed { cause: String },
    /// Not attempted because an earlier batch failed (or shutdown was
    /// requested) and continuation was not enabled.
    Skipped,
}

/// Outcome of one batch write, keyed by batch index and record range.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub index: usize,
    pub record_start: usize,
    pub record_end: usize,
    pub records: usize,
    #[serde(flatten)]
    pub status: BatchStatus,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, BatchStatus::Succeeded)
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SyncStatus {
    Succeeded,
    Failed,
    DryRun,
}

/// Structured result of one sync run: totals, per-batch outcomes, and
/// findings. Replaces the original success flag so partial failures are
/// debuggable.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub run_id: String,
    pub source_table: String,
    pub destination_table: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub duration_ms: u64,
    pub status: SyncStatus,
    pub total_records: usize,
    pub batch_size: usize,
    pub batches_total: usize,
    pub batches_succeeded: usize,
    pub batches_failed: usize,
    pub batches_skipped: usize,
    pub records_synced: usize,
    pub records_lost: usize,
    pub findings: Vec<Finding>,
    pub batches: Vec<BatchOutcome>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        matches!(self.status, SyncStatus::Succeeded | SyncStatus::DryRun)
    }

    pub fn failed_batch_indices(&self) -> Vec<usize> {
        self.batches
            .iter()
            .filter(|b| matches!(b.status, BatchStatus::Failed { .. }))
            .map(|b| b.index)
            .collect()
    }

    /// Maps the report to the run's top-level result: `PartialWrite` when any
    /// batch failed or was skipped after the destructive delete.
    pub fn to_result(&self) -> Result<(), SyncError> {
        if self.is_success() {
            return Ok(());
        }
        Err(SyncError::PartialWrite {
            failed: self.batches_failed + self.batches_skipped,
            total: self.batches_total,
            lost: self.records_lost,
        })
    }

    /// One-line operator summary, e.g. "3/3 records synced".
    pub fn summary_line(&self) -> String {
        format!("{}/{} records synced", self.records_synced, self.total_records)
    }
}
