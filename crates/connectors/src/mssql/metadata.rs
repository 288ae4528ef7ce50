use crate::{error::DbError, metadata::ColumnMetadata, source::quote_ident};
use model::core::data_type::DataType;
use tiberius::Client;
use tokio::net::TcpStream;
use tokio_util::compat::Compat;

/// Column schema in ordinal order, as the operator-facing inspect command
/// reports it.
pub(crate) async fn table_schema(
    client: &mut Client<Compat<TcpStream>>,
    table: &str,
) -> Result<Vec<ColumnMetadata>, DbError> {
    let sql = "SELECT \
                   COLUMN_NAME, \
                   DATA_TYPE, \
                   CHARACTER_MAXIMUM_LENGTH, \
                   IS_NULLABLE \
               FROM INFORMATION_SCHEMA.COLUMNS \
               WHERE TABLE_NAME = @P1 \
               ORDER BY ORDINAL_POSITION";

    let stream = client.query(sql, &[&table]).await?;
    let rows = stream.into_first_result().await?;

    let mut columns = Vec::with_capacity(rows.len());
    for (ordinal, row) in rows.iter().enumerate() {
        let name: &str = row
            .try_get(0)?
            .ok_or_else(|| DbError::Decode("column name is NULL".into()))?;
        let db_type: &str = row
            .try_get(1)?
            .ok_or_else(|| DbError::Decode("column data type is NULL".into()))?;
        let char_max_length: Option<i32> = row.try_get(2)?;
        let is_nullable: Option<&str> = row.try_get(3)?;

        columns.push(ColumnMetadata {
            name: name.to_string(),
            data_type: DataType::from_mssql_type(db_type),
            db_type: db_type.to_string(),
            is_nullable: is_nullable == Some("YES"),
            char_max_length: char_max_length.map(|len| len as i64),
            ordinal,
        });
    }

    Ok(columns)
}

/// User tables in the connected database, name-ordered.
pub(crate) async fn list_tables(
    client: &mut Client<Compat<TcpStream>>,
) -> Result<Vec<String>, DbError> {
    let sql = "SELECT t.name FROM sys.tables t \
               WHERE t.is_ms_shipped = 0 \
               ORDER BY t.name";

    let stream = client.query(sql, &[]).await?;
    let rows = stream.into_first_result().await?;

    let mut tables = Vec::with_capacity(rows.len());
    for row in rows.iter() {
        if let Some(name) = row.try_get::<&str, _>(0)? {
            tables.push(name.to_string());
        }
    }

    Ok(tables)
}

/// Statistics query over the reporting table's clinic/month dimensions.
pub(crate) fn stats_query(table: &str) -> String {
    format!(
        "SELECT \
             COUNT(*) as total_records, \
             COUNT(DISTINCT clinic) as unique_clinics, \
             COUNT(DISTINCT month) as unique_months, \
             MIN(month) as earliest_month, \
             MAX(month) as latest_month \
         FROM {}",
        quote_ident(table)
    )
}
