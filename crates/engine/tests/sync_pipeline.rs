use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use connectors::{
    destination::DestinationClient,
    error::DbError,
    metadata::{ColumnMetadata, TableStats},
    source::{FetchRequest, SourceReader},
};
use engine::{
    error::SyncError,
    executor::{SyncExecutor, SyncPlan},
    mapping,
    report::SyncStatus,
    settings::SyncSettings,
};
use model::{
    core::value::{FieldValue, Value},
    records::row::RowData,
};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

struct MockSource {
    rows: Vec<RowData>,
    fail_fetch: bool,
}

impl MockSource {
    fn with_rows(rows: Vec<RowData>) -> Self {
        MockSource {
            rows,
            fail_fetch: false,
        }
    }
}

#[async_trait]
impl SourceReader for MockSource {
    async fn fetch_rows(&mut self, _request: &FetchRequest) -> Result<Vec<RowData>, DbError> {
        if self.fail_fetch {
            return Err(DbError::Unknown("simulated connectivity loss".into()));
        }
        Ok(self.rows.clone())
    }

    async fn table_schema(&mut self, _table: &str) -> Result<Vec<ColumnMetadata>, DbError> {
        Ok(Vec::new())
    }

    async fn list_tables(&mut self) -> Result<Vec<String>, DbError> {
        Ok(Vec::new())
    }

    async fn row_count(&mut self, _table: &str) -> Result<u64, DbError> {
        Ok(self.rows.len() as u64)
    }

    async fn table_stats(&mut self, _table: &str) -> Result<TableStats, DbError> {
        Ok(TableStats::default())
    }

    async fn ping(&mut self) -> Result<(), DbError> {
        Ok(())
    }
}

#[derive(Default)]
struct MockState {
    deletes: usize,
    insert_calls: usize,
    columns_seen: Vec<Vec<String>>,
    rows: Vec<Vec<Value>>,
}

#[derive(Default)]
struct MockDestination {
    state: Mutex<MockState>,
    fail_delete: bool,
    /// Fail the n-th insert call (0-based).
    fail_on_insert: Option<usize>,
}

impl MockDestination {
    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl DestinationClient for MockDestination {
    async fn delete_all(&self, _table: &str) -> Result<(), DbError> {
        if self.fail_delete {
            return Err(DbError::Unknown("simulated delete failure".into()));
        }
        let mut state = self.state();
        state.deletes += 1;
        state.rows.clear();
        Ok(())
    }

    async fn write_batch(
        &self,
        _table: &str,
        columns: &[String],
        rows: Vec<Vec<Value>>,
    ) -> Result<(), DbError> {
        let mut state = self.state();
        let call = state.insert_calls;
        state.insert_calls += 1;

        if self.fail_on_insert == Some(call) {
            return Err(DbError::Unknown("simulated batch failure".into()));
        }

        state.columns_seen.push(columns.to_vec());
        state.rows.extend(rows);
        Ok(())
    }

    async fn row_count(&self, _table: &str) -> Result<u64, DbError> {
        Ok(self.state().rows.len() as u64)
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }
}

fn source_row(clinic: &str) -> RowData {
    RowData::new(
        mapping::SOURCE_TABLE,
        vec![
            FieldValue::new("clinic", Value::String(clinic.to_string())),
            FieldValue::new(
                "month",
                Value::Timestamp(Utc.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap()),
            ),
            FieldValue::new("traffic_source", Value::String("google".into())),
            FieldValue::new("visits", Value::Float(120.0)),
            FieldValue::new("%total_conversion", Value::Float(0.25)),
        ],
    )
}

fn plan() -> SyncPlan {
    SyncPlan::executive_monthly(mapping::SOURCE_TABLE, mapping::DESTINATION_TABLE)
}

fn executor(settings: SyncSettings) -> SyncExecutor {
    SyncExecutor::new(settings, CancellationToken::new()).unwrap()
}

#[tokio::test]
async fn three_rows_with_batch_size_two_yield_two_batches() {
    let mut source = MockSource::with_rows(vec![
        source_row("A"),
        source_row("B"),
        source_row("C"),
    ]);
    let destination = Arc::new(MockDestination::default());

    let settings = SyncSettings {
        batch_size: 2,
        ..SyncSettings::default()
    };
    let report = executor(settings)
        .run(&mut source, destination.clone(), &plan())
        .await
        .unwrap();

    assert_eq!(report.status, SyncStatus::Succeeded);
    assert_eq!(report.batches_total, 2);
    assert_eq!(report.batches[0].records, 2);
    assert_eq!(report.batches[1].records, 1);
    assert_eq!(report.summary_line(), "3/3 records synced");

    let state = destination.state();
    assert_eq!(state.deletes, 1);
    assert_eq!(state.insert_calls, 2);
    assert_eq!(state.rows.len(), 3);
}

#[tokio::test]
async fn destination_receives_declared_columns_and_full_records() {
    let mut source = MockSource::with_rows(vec![source_row("A")]);
    let destination = Arc::new(MockDestination::default());

    executor(SyncSettings::default())
        .run(&mut source, destination.clone(), &plan())
        .await
        .unwrap();

    let state = destination.state();
    assert_eq!(state.columns_seen[0], mapping::destination_columns());
    assert_eq!(state.rows[0].len(), 30);
    // Declared order starts with the identifying fields.
    assert_eq!(state.rows[0][0], Value::String("A".into()));
    assert_eq!(state.rows[0][2], Value::String("google".into()));
    // The duplicated source column reaches both destination slots.
    let columns = mapping::destination_columns();
    let conversion_rate = columns.iter().position(|c| c == "conversion_rate").unwrap();
    let total_conversion = columns.iter().position(|c| c == "total_conversion").unwrap();
    assert_eq!(state.rows[0][conversion_rate], Value::Float(0.25));
    assert_eq!(state.rows[0][total_conversion], Value::Float(0.25));
}

#[tokio::test]
async fn failed_batch_is_reported_by_index_and_stops_the_run() {
    let rows: Vec<RowData> = ["A", "B", "C", "D", "E"].iter().map(|c| source_row(c)).collect();
    let mut source = MockSource::with_rows(rows);
    let destination = Arc::new(MockDestination {
        fail_on_insert: Some(1),
        ..MockDestination::default()
    });

    let settings = SyncSettings {
        batch_size: 2,
        ..SyncSettings::default()
    };
    let report = executor(settings)
        .run(&mut source, destination.clone(), &plan())
        .await
        .unwrap();

    assert_eq!(report.status, SyncStatus::Failed);
    assert_eq!(report.failed_batch_indices(), vec![1]);
    assert_eq!(report.batches_succeeded, 1);
    assert_eq!(report.batches_failed, 1);
    assert_eq!(report.batches_skipped, 1);
    assert_eq!(report.records_synced, 2);
    assert_eq!(report.records_lost, 3);

    // Never silent: the top-level result names the partial write.
    assert!(matches!(
        report.to_result(),
        Err(SyncError::PartialWrite {
            failed: 2,
            total: 3,
            lost: 3
        })
    ));
}

#[tokio::test]
async fn keep_going_continues_past_a_failed_batch() {
    let rows: Vec<RowData> = ["A", "B", "C", "D", "E"].iter().map(|c| source_row(c)).collect();
    let mut source = MockSource::with_rows(rows);
    let destination = Arc::new(MockDestination {
        fail_on_insert: Some(1),
        ..MockDestination::default()
    });

    let settings = SyncSettings {
        batch_size: 2,
        keep_going: true,
        ..SyncSettings::default()
    };
    let report = executor(settings)
        .run(&mut source, destination.clone(), &plan())
        .await
        .unwrap();

    assert_eq!(report.status, SyncStatus::Failed);
    assert_eq!(report.failed_batch_indices(), vec![1]);
    assert_eq!(report.batches_skipped, 0);
    assert_eq!(report.records_synced, 3);
    assert_eq!(report.records_lost, 2);
    assert_eq!(destination.state().rows.len(), 3);
}

#[tokio::test]
async fn delete_failure_aborts_before_any_insert() {
    let mut source = MockSource::with_rows(vec![source_row("A")]);
    let destination = Arc::new(MockDestination {
        fail_delete: true,
        ..MockDestination::default()
    });

    let result = executor(SyncSettings::default())
        .run(&mut source, destination.clone(), &plan())
        .await;

    assert!(matches!(result, Err(SyncError::DeleteFailed { .. })));
    assert_eq!(destination.state().insert_calls, 0);
}

#[tokio::test]
async fn read_failure_aborts_before_the_destructive_delete() {
    let mut source = MockSource {
        rows: Vec::new(),
        fail_fetch: true,
    };
    let destination = Arc::new(MockDestination::default());

    let result = executor(SyncSettings::default())
        .run(&mut source, destination.clone(), &plan())
        .await;

    assert!(matches!(result, Err(SyncError::Query(_))));
    assert_eq!(destination.state().deletes, 0);
}

#[tokio::test]
async fn dry_run_performs_no_writes() {
    let rows: Vec<RowData> = ["A", "B", "C"].iter().map(|c| source_row(c)).collect();
    let mut source = MockSource::with_rows(rows);
    let destination = Arc::new(MockDestination::default());

    let settings = SyncSettings {
        batch_size: 2,
        dry_run: true,
        ..SyncSettings::default()
    };
    let report = executor(settings)
        .run(&mut source, destination.clone(), &plan())
        .await
        .unwrap();

    assert_eq!(report.status, SyncStatus::DryRun);
    assert_eq!(report.batches_total, 2);
    assert!(report.is_success());

    let state = destination.state();
    assert_eq!(state.deletes, 0);
    assert_eq!(state.insert_calls, 0);
}

#[tokio::test]
async fn rerunning_with_unchanged_source_replaces_not_appends() {
    let rows: Vec<RowData> = ["A", "B", "C"].iter().map(|c| source_row(c)).collect();
    let mut source = MockSource::with_rows(rows);
    let destination = Arc::new(MockDestination::default());
    let plan = plan();

    for _ in 0..2 {
        let report = executor(SyncSettings::default())
            .run(&mut source, destination.clone(), &plan)
            .await
            .unwrap();
        assert_eq!(report.status, SyncStatus::Succeeded);
    }

    let state = destination.state();
    assert_eq!(state.deletes, 2);
    assert_eq!(state.rows.len(), 3);
}

#[tokio::test]
async fn cancelled_token_stops_the_run_before_the_delete() {
    let mut source = MockSource::with_rows(vec![source_row("A")]);
    let destination = Arc::new(MockDestination::default());

    let cancel = CancellationToken::new();
    cancel.cancel();
    let executor = SyncExecutor::new(SyncSettings::default(), cancel).unwrap();

    let result = executor.run(&mut source, destination.clone(), &plan()).await;

    assert!(matches!(result, Err(SyncError::ShutdownRequested)));
    assert_eq!(destination.state().deletes, 0);
}

#[tokio::test]
async fn duplicate_mapping_findings_appear_in_every_report() {
    let mut source = MockSource::with_rows(vec![source_row("A")]);
    let destination = Arc::new(MockDestination::default());

    let report = executor(SyncSettings::default())
        .run(&mut source, destination, &plan())
        .await
        .unwrap();

    let duplicate_findings: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.code == "MAPPING_DUPLICATE_SOURCE")
        .collect();
    assert_eq!(duplicate_findings.len(), 2);
}

#[tokio::test]
async fn concurrent_writes_report_outcomes_in_batch_order() {
    let rows: Vec<RowData> = (0..10)
        .map(|i| source_row(&format!("clinic-{i}")))
        .collect();
    let mut source = MockSource::with_rows(rows);
    let destination = Arc::new(MockDestination::default());

    let settings = SyncSettings {
        batch_size: 3,
        parallelism: 4,
        ..SyncSettings::default()
    };
    let report = executor(settings)
        .run(&mut source, destination.clone(), &plan())
        .await
        .unwrap();

    assert_eq!(report.status, SyncStatus::Succeeded);
    assert_eq!(report.batches_total, 4);
    let indices: Vec<usize> = report.batches.iter().map(|b| b.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    assert_eq!(destination.state().rows.len(), 10);
}
