use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DataType {
    Int,
    Float,
    Decimal,
    VarChar,
    String,
    Boolean,
    Date,
    Timestamp,
    Null,
    Custom(String),
}

impl DataType {
    /// Maps a SQL Server type name (as reported by
    /// `INFORMATION_SCHEMA.COLUMNS.DATA_TYPE`) to a generic data type.
    pub fn from_mssql_type(type_name: &str) -> Self {
        match Self::normalize_type_name(type_name).as_str() {
            "tinyint" | "smallint" | "int" | "bigint" => DataType::Int,
            "float" | "real" => DataType::Float,
            "decimal" | "numeric" | "money" | "smallmoney" => DataType::Decimal,
            "varchar" | "nvarchar" | "char" | "nchar" => DataType::VarChar,
            "text" | "ntext" | "uniqueidentifier" | "xml" => DataType::String,
            "bit" => DataType::Boolean,
            "date" => DataType::Date,
            "datetime" | "datetime2" | "smalldatetime" | "datetimeoffset" | "time" => {
                DataType::Timestamp
            }
            other => DataType::Custom(other.to_string()),
        }
    }

    fn normalize_type_name(type_name: &str) -> String {
        // Strip any length suffix, e.g. "varchar(255)" -> "varchar"
        let base = type_name.split('(').next().unwrap_or(type_name);
        base.trim().to_ascii_lowercase()
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Int => write!(f, "int"),
            DataType::Float => write!(f, "float"),
            DataType::Decimal => write!(f, "decimal"),
            DataType::VarChar => write!(f, "varchar"),
            DataType::String => write!(f, "text"),
            DataType::Boolean => write!(f, "bit"),
            DataType::Date => write!(f, "date"),
            DataType::Timestamp => write!(f, "datetime"),
            DataType::Null => write!(f, "null"),
            DataType::Custom(name) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mssql_type_known_names() {
        assert_eq!(DataType::from_mssql_type("bigint"), DataType::Int);
        assert_eq!(DataType::from_mssql_type("FLOAT"), DataType::Float);
        assert_eq!(DataType::from_mssql_type("nvarchar(100)"), DataType::VarChar);
        assert_eq!(DataType::from_mssql_type("datetime2"), DataType::Timestamp);
    }

    #[test]
    fn test_from_mssql_type_unknown_falls_through() {
        assert_eq!(
            DataType::from_mssql_type("geography"),
            DataType::Custom("geography".to_string())
        );
    }
}
