//! Closed type-code vocabulary for column and parameter types.

use serde::{Deserialize, Serialize};

/// Driver-independent SQL type code, resolved from a dialect type name.
///
/// This mirrors the classic driver-level type constants without
/// carrying their integer values around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    Char,
    Varchar,
    LongVarchar,
    Clob,
    Blob,
    Binary,
    VarBinary,
    SmallInt,
    Integer,
    BigInt,
    Decimal,
    Real,
    Double,
    DecFloat,
    Date,
    Time,
    Timestamp,
    Boolean,
    RowId,
    Xml,
    /// Anything the dialect reports that has no closed mapping.
    Other,
}

impl SqlType {
    /// Resolve a dialect type name to the closed code.
    ///
    /// Length/precision suffixes are ignored: `VARCHAR(200)` resolves
    /// the same as `VARCHAR`.
    pub fn from_type_name(name: &str) -> Self {
        let base = name
            .trim()
            .split(['(', ' '])
            .next()
            .unwrap_or("")
            .to_uppercase();
        match base.as_str() {
            "CHAR" | "CHARACTER" | "GRAPHIC" | "NCHAR" => SqlType::Char,
            "VARCHAR" | "VARGRAPHIC" | "NVARCHAR" => SqlType::Varchar,
            "LONG" => SqlType::LongVarchar,
            "CLOB" | "DBCLOB" | "NCLOB" | "TEXT" | "NTEXT" => SqlType::Clob,
            "BLOB" | "IMAGE" => SqlType::Blob,
            "BINARY" => SqlType::Binary,
            "VARBINARY" => SqlType::VarBinary,
            "SMALLINT" | "TINYINT" => SqlType::SmallInt,
            "INTEGER" | "INT" => SqlType::Integer,
            "BIGINT" => SqlType::BigInt,
            "DECIMAL" | "NUMERIC" | "DEC" | "MONEY" => SqlType::Decimal,
            "REAL" => SqlType::Real,
            "DOUBLE" | "FLOAT" => SqlType::Double,
            "DECFLOAT" => SqlType::DecFloat,
            "DATE" => SqlType::Date,
            "TIME" => SqlType::Time,
            "TIMESTAMP" | "DATETIME" | "DATETIME2" | "SMALLDATETIME" => SqlType::Timestamp,
            "BOOLEAN" | "BIT" => SqlType::Boolean,
            "ROWID" => SqlType::RowId,
            "XML" => SqlType::Xml,
            _ => SqlType::Other,
        }
    }

    /// Whether this is a large-object type.
    pub fn is_lob(self) -> bool {
        matches!(self, SqlType::Clob | SqlType::Blob)
    }

    /// Whether this is a character type.
    pub fn is_character(self) -> bool {
        matches!(
            self,
            SqlType::Char | SqlType::Varchar | SqlType::LongVarchar | SqlType::Clob
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_with_length_suffix() {
        assert_eq!(SqlType::from_type_name("VARCHAR(200)"), SqlType::Varchar);
        assert_eq!(SqlType::from_type_name("DECIMAL(10, 2)"), SqlType::Decimal);
        assert_eq!(SqlType::from_type_name("timestamp"), SqlType::Timestamp);
    }

    #[test]
    fn test_unknown_maps_to_other() {
        assert_eq!(SqlType::from_type_name("GEOMETRY"), SqlType::Other);
    }

    #[test]
    fn test_lob_detection() {
        assert!(SqlType::from_type_name("CLOB(1M)").is_lob());
        assert!(SqlType::from_type_name("BLOB").is_lob());
        assert!(!SqlType::from_type_name("VARCHAR(10)").is_lob());
    }
}
