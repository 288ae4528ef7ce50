use crate::error::CliError;
use connectors::metadata::{ColumnMetadata, TableStats};
use engine::report::SyncReport;

fn report_json(report: &SyncReport) -> Result<String, CliError> {
    serde_json::to_string_pretty(report).map_err(CliError::JsonSerialize)
}

pub async fn write_report(report: &SyncReport, path: String) -> Result<(), CliError> {
    let report_json = report_json(report)?;
    tokio::fs::write(path, report_json).await?;
    Ok(())
}

pub fn print_report(report: &SyncReport) -> Result<(), CliError> {
    let report_json = report_json(report)?;
    println!("{report_json}");
    Ok(())
}

pub fn print_schema(table: &str, columns: &[ColumnMetadata], stats: &TableStats) {
    println!("Schema for table '{table}':");
    println!("-----------------------------");
    println!(
        "{:<32} {:<12} {:<10} {}",
        "Column", "Type", "Nullable", "Max length"
    );
    for column in columns {
        let max_length = column
            .char_max_length
            .map(|len| len.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<32} {:<12} {:<10} {}",
            column.name,
            column.db_type,
            if column.is_nullable { "YES" } else { "NO" },
            max_length
        );
    }

    println!();
    println!("{:<18} {}", "Total records", stats.total_records);
    println!("{:<18} {}", "Unique clinics", stats.unique_clinics);
    println!("{:<18} {}", "Unique months", stats.unique_months);
    let range = match (&stats.earliest_month, &stats.latest_month) {
        (Some(earliest), Some(latest)) => format!("{earliest} to {latest}"),
        _ => "n/a".to_string(),
    };
    println!("{:<18} {}", "Month range", range);
}

pub fn print_tables(tables: &[(String, u64)]) {
    println!("{:<40} {}", "Table", "Rows");
    println!("-----------------------------");
    for (name, rows) in tables {
        println!("{name:<40} {rows}");
    }
}
