use crate::{
    error::{ConnectorError, DbError},
    metadata::{ColumnMetadata, TableStats},
    source::{FetchRequest, SourceReader, quote_ident},
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use model::{
    core::value::{FieldValue, Value},
    records::row::RowData,
};
use tiberius::{AuthMethod, Client, Config, numeric::Numeric};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{error, info};

/// Connection settings for the SQL Server source, injected from the
/// environment at startup.
#[derive(Debug, Clone)]
pub struct MssqlConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
}

/// SQL Server source adapter over a single Tiberius connection.
pub struct MssqlAdapter {
    client: Client<Compat<TcpStream>>,
}

impl MssqlAdapter {
    pub async fn connect(config: &MssqlConfig) -> Result<Self, ConnectorError> {
        let mut tiberius_config = Config::new();
        tiberius_config.host(&config.host);
        tiberius_config.port(config.port);
        tiberius_config.database(&config.database);
        tiberius_config
            .authentication(AuthMethod::sql_server(&config.username, &config.password));
        tiberius_config.trust_cert();

        let tcp = TcpStream::connect(tiberius_config.get_addr()).await?;
        tcp.set_nodelay(true)?;

        let client = Client::connect(tiberius_config, tcp.compat_write())
            .await
            .map_err(|e| {
                error!(
                    "SQL Server connection to '{}:{}' failed: {}",
                    config.host, config.port, e
                );
                ConnectorError::Tiberius(e)
            })?;

        info!(
            "Connected to SQL Server at '{}:{}' / database '{}'",
            config.host, config.port, config.database
        );
        Ok(Self { client })
    }

    pub(crate) async fn query_rows(
        &mut self,
        sql: &str,
        entity: &str,
    ) -> Result<Vec<RowData>, DbError> {
        let stream = self.client.query(sql, &[]).await?;
        let rows = stream.into_first_result().await?;
        Ok(rows.iter().map(|row| decode_row(row, entity)).collect())
    }

    async fn query_scalar_u64(&mut self, sql: &str) -> Result<u64, DbError> {
        let rows = self.query_rows(sql, "scalar").await?;
        let row = rows
            .first()
            .ok_or_else(|| DbError::Decode("scalar query returned no rows".into()))?;
        let value = row
            .field_values
            .first()
            .and_then(|f| f.value.as_ref())
            .and_then(|v| v.as_f64())
            .ok_or_else(|| DbError::Decode("scalar query returned no value".into()))?;
        Ok(value as u64)
    }
}

/// Converts a driver row into the generic record model. Columns whose type
/// the reporting schema never produces decode as NULL.
fn decode_row(row: &tiberius::Row, entity: &str) -> RowData {
    let names: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();

    let mut field_values = Vec::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        let value = decode_column(row, i);
        let data_type = value.data_type();
        field_values.push(FieldValue {
            name: name.clone(),
            value: Some(value),
            data_type,
        });
    }

    RowData::new(entity, field_values)
}

fn decode_column(row: &tiberius::Row, i: usize) -> Value {
    if let Ok(Some(v)) = row.try_get::<i64, _>(i) {
        Value::Int(v)
    } else if let Ok(Some(v)) = row.try_get::<i32, _>(i) {
        Value::Int(v as i64)
    } else if let Ok(Some(v)) = row.try_get::<i16, _>(i) {
        Value::Int(v as i64)
    } else if let Ok(Some(v)) = row.try_get::<u8, _>(i) {
        Value::Int(v as i64)
    } else if let Ok(Some(v)) = row.try_get::<f64, _>(i) {
        Value::Float(v)
    } else if let Ok(Some(v)) = row.try_get::<f32, _>(i) {
        Value::Float(v as f64)
    } else if let Ok(Some(v)) = row.try_get::<Numeric, _>(i) {
        Value::Float(f64::from(v))
    } else if let Ok(Some(v)) = row.try_get::<bool, _>(i) {
        Value::Boolean(v)
    } else if let Ok(Some(v)) = row.try_get::<&str, _>(i) {
        Value::String(v.to_string())
    } else if let Ok(Some(v)) = row.try_get::<DateTime<Utc>, _>(i) {
        Value::Timestamp(v)
    } else if let Ok(Some(v)) = row.try_get::<NaiveDateTime, _>(i) {
        Value::Timestamp(v.and_utc())
    } else if let Ok(Some(v)) = row.try_get::<NaiveDate, _>(i) {
        Value::Date(v)
    } else {
        Value::Null
    }
}

#[async_trait]
impl SourceReader for MssqlAdapter {
    async fn fetch_rows(&mut self, request: &FetchRequest) -> Result<Vec<RowData>, DbError> {
        let sql = request.to_sql();
        let rows = self.query_rows(&sql, &request.table).await?;
        info!("Fetched {} rows from '{}'", rows.len(), request.table);
        Ok(rows)
    }

    async fn table_schema(&mut self, table: &str) -> Result<Vec<ColumnMetadata>, DbError> {
        super::metadata::table_schema(&mut self.client, table).await
    }

    async fn list_tables(&mut self) -> Result<Vec<String>, DbError> {
        super::metadata::list_tables(&mut self.client).await
    }

    async fn row_count(&mut self, table: &str) -> Result<u64, DbError> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        self.query_scalar_u64(&sql).await
    }

    async fn table_stats(&mut self, table: &str) -> Result<TableStats, DbError> {
        let sql = super::metadata::stats_query(table);
        let rows = self.query_rows(&sql, table).await?;
        let row = rows
            .first()
            .ok_or_else(|| DbError::Decode("stats query returned no rows".into()))?;

        Ok(TableStats {
            total_records: row.get_value("total_records").as_f64().unwrap_or(0.0) as u64,
            unique_clinics: row.get_value("unique_clinics").as_f64().unwrap_or(0.0) as u64,
            unique_months: row.get_value("unique_months").as_f64().unwrap_or(0.0) as u64,
            earliest_month: month_label(row.get_value("earliest_month")),
            latest_month: month_label(row.get_value("latest_month")),
        })
    }

    async fn ping(&mut self) -> Result<(), DbError> {
        let val = self.query_scalar_u64("SELECT 1").await?;
        if val != 1 {
            return Err(DbError::Unknown(format!(
                "ping returned unexpected result: {val}"
            )));
        }
        Ok(())
    }
}

fn month_label(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => other.as_string(),
    }
}
