use model::core::data_type::DataType;
use serde::Serialize;

/// Column description as reported by the source store's
/// `INFORMATION_SCHEMA.COLUMNS`, in ordinal order.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub data_type: DataType,
    /// The raw type name the store reported, e.g. "nvarchar".
    pub db_type: String,
    pub is_nullable: bool,
    pub char_max_length: Option<i64>,
    pub ordinal: usize,
}

/// Row-count statistics for a reporting table, keyed by the clinic/month
/// dimensions the reporting schema carries.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableStats {
    pub total_records: u64,
    pub unique_clinics: u64,
    pub unique_months: u64,
    pub earliest_month: Option<String>,
    pub latest_month: Option<String>,
}
