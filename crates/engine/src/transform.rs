use crate::mapping::{DESTINATION_TABLE, FIELD_MAP, KEY_FIELDS};
use model::{
    core::value::{FieldValue, Value},
    records::row::RowData,
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Record {index} is unmappable: {reason}")]
pub struct TransformError {
    pub index: usize,
    pub reason: String,
}

/// Maps one source record into a destination record per the field
/// correspondence table. Every destination field carries either the
/// source-derived value or the NULL sentinel; no field is omitted.
pub fn transform_record(row: &RowData, index: usize) -> Result<RowData, TransformError> {
    if KEY_FIELDS.iter().all(|field| row.get_value(field).is_null()) {
        return Err(TransformError {
            index,
            reason: format!("identifying fields {KEY_FIELDS:?} are all absent"),
        });
    }

    let field_values: Vec<FieldValue> = FIELD_MAP
        .iter()
        .map(|(dest, source)| {
            let value = row.get_value(source);
            let data_type = value.data_type();
            FieldValue {
                name: dest.to_string(),
                value: Some(value),
                data_type,
            }
        })
        .collect();

    Ok(RowData::new(DESTINATION_TABLE, field_values))
}

/// Transforms the full record set, preserving order. Fails on the first
/// unmappable record — transformation runs before any destructive action.
pub fn transform_all(rows: &[RowData]) -> Result<Vec<RowData>, TransformError> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| transform_record(row, index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::SOURCE_TABLE;
    use chrono::{TimeZone, Utc};

    fn source_row() -> RowData {
        RowData::new(
            SOURCE_TABLE,
            vec![
                FieldValue::new("clinic", Value::String("Alpha".into())),
                FieldValue::new(
                    "month",
                    Value::Timestamp(Utc.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap()),
                ),
                FieldValue::new("traffic_source", Value::String("google".into())),
                FieldValue::new("impressions", Value::Float(1000.0)),
                FieldValue::new("%total_conversion", Value::Float(0.12)),
                FieldValue::new("total_roas", Value::Float(3.4)),
            ],
        )
    }

    #[test]
    fn test_every_destination_field_is_present() {
        let record = transform_record(&source_row(), 0).unwrap();

        assert_eq!(record.len(), 30);
        assert!(record.field_values.iter().all(|f| f.value.is_some()));
    }

    #[test]
    fn test_missing_source_fields_map_to_null_sentinel() {
        let record = transform_record(&source_row(), 0).unwrap();

        assert_eq!(record.get_value("spend"), Value::Null);
        assert_eq!(record.get_value("new_roas"), Value::Null);
        assert_eq!(record.get_value("impressions"), Value::Float(1000.0));
    }

    #[test]
    fn test_duplicated_sources_populate_both_destinations() {
        let record = transform_record(&source_row(), 0).unwrap();

        assert_eq!(record.get_value("conversion_rate"), Value::Float(0.12));
        assert_eq!(record.get_value("total_conversion"), Value::Float(0.12));
        assert_eq!(record.get_value("roas"), Value::Float(3.4));
        assert_eq!(record.get_value("total_roas"), Value::Float(3.4));
    }

    #[test]
    fn test_transform_is_deterministic() {
        let row = source_row();
        let first = transform_record(&row, 0).unwrap();
        let second = transform_record(&row, 0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_record_without_identifying_fields_is_rejected() {
        let row = RowData::new(
            SOURCE_TABLE,
            vec![FieldValue::new("impressions", Value::Float(5.0))],
        );

        let err = transform_record(&row, 7).unwrap_err();
        assert_eq!(err.index, 7);
    }

    #[test]
    fn test_transform_all_preserves_order() {
        let rows: Vec<RowData> = ["A", "B", "C"]
            .iter()
            .map(|clinic| {
                RowData::new(
                    SOURCE_TABLE,
                    vec![FieldValue::new("clinic", Value::String(clinic.to_string()))],
                )
            })
            .collect();

        let records = transform_all(&rows).unwrap();
        let clinics: Vec<Value> = records.iter().map(|r| r.get_value("clinic")).collect();
        assert_eq!(
            clinics,
            vec![
                Value::String("A".into()),
                Value::String("B".into()),
                Value::String("C".into())
            ]
        );
    }
}
