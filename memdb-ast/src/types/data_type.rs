use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A column data type.
///
/// The dialect is deliberately loose about type names: any unrecognized name
/// parses as [`DataType::None`] (an untyped column), the SQLite convention.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DataType {
    /// 64-bit signed integer.
    Integer,
    /// 64-bit float.
    Real,
    /// UTF-8 text.
    Text,
    /// Byte string.
    Blob,
    /// Calendar date plus time of day.
    Date,
    /// Boolean.
    Boolean,
    /// A packed color value; stored as text inside the core.
    Color,
    /// Untyped.
    None,
}

impl DataType {
    /// Maps a type name to a data type, case-insensitively. Unknown names are
    /// untyped.
    pub fn from_name(name: &str) -> DataType {
        match name.to_uppercase().as_str() {
            "INT" | "INTEGER" | "BIGINT" | "SMALLINT" | "TINYINT" => DataType::Integer,
            "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" | "DECIMAL" => DataType::Real,
            "TEXT" | "CHAR" | "VARCHAR" | "CLOB" | "STRING" => DataType::Text,
            "BLOB" => DataType::Blob,
            "DATE" | "DATETIME" | "TIMESTAMP" => DataType::Date,
            "BOOL" | "BOOLEAN" => DataType::Boolean,
            "COLOR" => DataType::Color,
            _ => DataType::None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            DataType::Integer => "INTEGER",
            DataType::Real => "REAL",
            DataType::Text => "TEXT",
            DataType::Blob => "BLOB",
            DataType::Date => "DATE",
            DataType::Boolean => "BOOLEAN",
            DataType::Color => "COLOR",
            DataType::None => "NONE",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_is_case_insensitive() {
        assert_eq!(DataType::from_name("int"), DataType::Integer);
        assert_eq!(DataType::from_name("Integer"), DataType::Integer);
        assert_eq!(DataType::from_name("VARCHAR"), DataType::Text);
        assert_eq!(DataType::from_name("mystery"), DataType::None);
    }

    #[test]
    fn display_round_trips_through_from_name() {
        for ty in [
            DataType::Integer,
            DataType::Real,
            DataType::Text,
            DataType::Blob,
            DataType::Date,
            DataType::Boolean,
            DataType::Color,
        ] {
            assert_eq!(DataType::from_name(&ty.to_string()), ty);
        }
    }
}
