use crate::{
    error::SyncError,
    mapping,
    metrics::Metrics,
    report::{BatchOutcome, BatchStatus, Finding, SyncReport, SyncStatus},
    settings::SyncSettings,
    transform,
};
use connectors::{
    destination::DestinationClient,
    error::DbError,
    source::{FetchRequest, OrderBy, SourceReader},
};
use futures::StreamExt;
use model::{
    core::value::Value,
    records::batch::{self, Batch},
};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

/// What to copy where: table names, fetch ordering, and the declared
/// destination column order.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub source_table: String,
    pub destination_table: String,
    pub order_by: Vec<OrderBy>,
    pub columns: Vec<String>,
}

impl SyncPlan {
    /// The executive monthly reporting transfer, with the table names taken
    /// from configuration and ordering/columns from the field map.
    pub fn executive_monthly(source_table: &str, destination_table: &str) -> Self {
        SyncPlan {
            source_table: source_table.to_string(),
            destination_table: destination_table.to_string(),
            order_by: mapping::ORDER_KEYS
                .iter()
                .map(|(column, descending)| {
                    if *descending {
                        OrderBy::desc(column)
                    } else {
                        OrderBy::asc(column)
                    }
                })
                .collect(),
            columns: mapping::destination_columns(),
        }
    }
}

/// Runs the transfer procedure: fetch, transform, delete-all, batched
/// parameterized inserts, structured report.
pub struct SyncExecutor {
    settings: SyncSettings,
    cancel: CancellationToken,
}

impl SyncExecutor {
    pub fn new(settings: SyncSettings, cancel: CancellationToken) -> Result<Self, SyncError> {
        settings.validate()?;
        Ok(Self { settings, cancel })
    }

    pub async fn run(
        &self,
        source: &mut dyn SourceReader,
        destination: Arc<dyn DestinationClient>,
        plan: &SyncPlan,
    ) -> Result<SyncReport, SyncError> {
        match self.settings.timeout {
            Some(limit) => tokio::time::timeout(limit, self.run_inner(source, destination, plan))
                .await
                .map_err(|_| SyncError::Timeout {
                    secs: limit.as_secs(),
                })?,
            None => self.run_inner(source, destination, plan).await,
        }
    }

    async fn run_inner(
        &self,
        source: &mut dyn SourceReader,
        destination: Arc<dyn DestinationClient>,
        plan: &SyncPlan,
    ) -> Result<SyncReport, SyncError> {
        let started = Instant::now();
        let started_at = chrono::Utc::now();
        let run_id = format!("run-{}", Uuid::new_v4().simple());

        info!(
            "Starting sync {run_id}: '{}' -> '{}'",
            plan.source_table, plan.destination_table
        );

        let mut findings: Vec<Finding> = mapping::duplicated_sources()
            .iter()
            .map(|(source, dests)| Finding::new_duplicate_mapping(source, dests))
            .collect();
        for finding in &findings {
            warn!("{}", finding.message);
        }

        // Read side. Any failure here aborts before the destructive delete.
        let request = FetchRequest::new(&plan.source_table, plan.order_by.clone());
        let rows = source.fetch_rows(&request).await?;
        let records = transform::transform_all(&rows)?;
        let total_records = records.len();

        let batches = batch::partition(records, self.settings.batch_size);
        let batches_total = batches.len();
        info!(
            "Transformed {total_records} records into {batches_total} batches of up to {}",
            self.settings.batch_size
        );

        if self.settings.dry_run {
            info!("Dry run: skipping delete and {batches_total} batch writes");
            return Ok(SyncReport {
                run_id,
                source_table: plan.source_table.clone(),
                destination_table: plan.destination_table.clone(),
                started_at,
                duration_ms: started.elapsed().as_millis() as u64,
                status: SyncStatus::DryRun,
                total_records,
                batch_size: self.settings.batch_size,
                batches_total,
                batches_succeeded: 0,
                batches_failed: 0,
                batches_skipped: 0,
                records_synced: 0,
                records_lost: 0,
                findings,
                batches: Vec::new(),
            });
        }

        if self.cancel.is_cancelled() {
            return Err(SyncError::ShutdownRequested);
        }

        destination
            .delete_all(&plan.destination_table)
            .await
            .map_err(|source| SyncError::DeleteFailed {
                table: plan.destination_table.clone(),
                source,
            })?;
        info!("Cleared destination table '{}'", plan.destination_table);

        let metrics = Metrics::new();
        let outcomes = if self.settings.parallelism > 1 {
            self.write_concurrent(&destination, plan, batches, total_records, &metrics)
                .await
        } else {
            self.write_sequential(&destination, plan, batches, total_records, &metrics)
                .await
        };

        let batches_succeeded = outcomes.iter().filter(|o| o.succeeded()).count();
        let batches_failed = outcomes
            .iter()
            .filter(|o| matches!(o.status, BatchStatus::Failed { .. }))
            .count();
        let batches_skipped = outcomes
            .iter()
            .filter(|o| matches!(o.status, BatchStatus::Skipped))
            .count();
        let records_synced: usize = outcomes
            .iter()
            .filter(|o| o.succeeded())
            .map(|o| o.records)
            .sum();
        let records_lost = total_records - records_synced;

        for outcome in &outcomes {
            if let BatchStatus::Failed { cause } = &outcome.status {
                findings.push(Finding::new_batch_failed(
                    outcome.index,
                    outcome.records,
                    cause,
                ));
            }
        }
        if batches_skipped > 0 && self.cancel.is_cancelled() {
            findings.push(Finding::new_shutdown_requested(batches_skipped));
        }

        let status = if batches_failed + batches_skipped == 0 {
            SyncStatus::Succeeded
        } else {
            SyncStatus::Failed
        };

        let report = SyncReport {
            run_id,
            source_table: plan.source_table.clone(),
            destination_table: plan.destination_table.clone(),
            started_at,
            duration_ms: started.elapsed().as_millis() as u64,
            status,
            total_records,
            batch_size: self.settings.batch_size,
            batches_total,
            batches_succeeded,
            batches_failed,
            batches_skipped,
            records_synced,
            records_lost,
            findings,
            batches: outcomes,
        };

        match report.status {
            SyncStatus::Succeeded => info!("Sync complete: {}", report.summary_line()),
            _ => error!(
                "Sync failed: {} ({} batches failed, {} skipped)",
                report.summary_line(),
                report.batches_failed,
                report.batches_skipped
            ),
        }

        Ok(report)
    }

    async fn write_sequential(
        &self,
        destination: &Arc<dyn DestinationClient>,
        plan: &SyncPlan,
        batches: Vec<Batch>,
        total_records: usize,
        metrics: &Metrics,
    ) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(batches.len());
        let mut stop = false;

        for batch in batches {
            if stop || self.cancel.is_cancelled() {
                outcomes.push(skipped(&batch));
                continue;
            }

            match write_one(destination.as_ref(), plan, &batch, total_records, metrics).await {
                Ok(()) => outcomes.push(succeeded(&batch)),
                Err(cause) => {
                    metrics.record_batch_failure(batch.len() as u64);
                    error!(
                        "Batch {} (records {}..{}) failed: {cause}",
                        batch.index,
                        batch.record_range().start,
                        batch.record_range().end
                    );
                    outcomes.push(failed(&batch, &cause));
                    if !self.settings.keep_going {
                        stop = true;
                    }
                }
            }
        }

        outcomes
    }

    async fn write_concurrent(
        &self,
        destination: &Arc<dyn DestinationClient>,
        plan: &SyncPlan,
        batches: Vec<Batch>,
        total_records: usize,
        metrics: &Metrics,
    ) -> Vec<BatchOutcome> {
        let abort = Arc::new(AtomicBool::new(false));
        let keep_going = self.settings.keep_going;

        let mut outcomes: Vec<BatchOutcome> = futures::stream::iter(batches.into_iter().map(
            |batch| {
                let destination = Arc::clone(destination);
                let abort = Arc::clone(&abort);
                let cancel = self.cancel.clone();
                let metrics = metrics.clone();
                let table = plan.destination_table.clone();
                let columns = plan.columns.clone();

                async move {
                    // No new batch starts after a failure (or shutdown);
                    // writes already in flight run to completion.
                    if abort.load(Ordering::SeqCst) || cancel.is_cancelled() {
                        return skipped(&batch);
                    }

                    let rows: Vec<Vec<Value>> = batch.rows.iter().map(|r| r.values()).collect();
                    match destination.write_batch(&table, &columns, rows).await {
                        Ok(()) => {
                            let synced = metrics.record_batch_success(batch.len() as u64);
                            info!("Synced {synced}/{total_records} records (batch {})", batch.index);
                            succeeded(&batch)
                        }
                        Err(cause) => {
                            metrics.record_batch_failure(batch.len() as u64);
                            error!(
                                "Batch {} (records {}..{}) failed: {cause}",
                                batch.index,
                                batch.record_range().start,
                                batch.record_range().end
                            );
                            if !keep_going {
                                abort.store(true, Ordering::SeqCst);
                            }
                            failed(&batch, &cause)
                        }
                    }
                }
            },
        ))
        .buffer_unordered(self.settings.parallelism)
        .collect()
        .await;

        outcomes.sort_by_key(|o| o.index);
        outcomes
    }
}

async fn write_one(
    destination: &dyn DestinationClient,
    plan: &SyncPlan,
    batch: &Batch,
    total_records: usize,
    metrics: &Metrics,
) -> Result<(), DbError> {
    let rows: Vec<Vec<Value>> = batch.rows.iter().map(|r| r.values()).collect();
    destination
        .write_batch(&plan.destination_table, &plan.columns, rows)
        .await?;

    let synced = metrics.record_batch_success(batch.len() as u64);
    info!("Synced {synced}/{total_records} records (batch {})", batch.index);
    Ok(())
}

fn succeeded(batch: &Batch) -> BatchOutcome {
    outcome(batch, BatchStatus::Succeeded)
}

fn failed(batch: &Batch, cause: &DbError) -> BatchOutcome {
    outcome(
        batch,
        BatchStatus::Failed {
            cause: cause.to_string(),
        },
    )
}

fn skipped(batch: &Batch) -> BatchOutcome {
    outcome(batch, BatchStatus::Skipped)
}

fn outcome(batch: &Batch, status: BatchStatus) -> BatchOutcome {
    let range = batch.record_range();
    BatchOutcome {
        index: batch.index,
        record_start: range.start,
        record_end: range.end,
        records: batch.len(),
        status,
    }
}
