use crate::{stmt::Value, Result};

/// Semantic type of a model column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Clob,
    Blob,
    Integer,
    Decimal,
    Float,
    Boolean,
    Date,
    Time,
    Timestamp,
}

impl FieldType {
    /// Maps a database type name, as reported by `INFORMATION_SCHEMA`, onto a
    /// field type. Unrecognized types are treated as text.
    pub fn from_db_type(ty: &str) -> FieldType {
        let ty = ty.trim().to_ascii_lowercase();

        // MySQL reports booleans as `tinyint(1)`
        if ty == "tinyint(1)" || ty == "bool" || ty == "boolean" {
            return FieldType::Boolean;
        }

        let base = ty.split(['(', ' ']).next().unwrap_or_default();

        match base {
            "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" | "serial"
            | "bigserial" | "smallserial" | "int2" | "int4" | "int8" | "year" => {
                FieldType::Integer
            }
            "decimal" | "numeric" | "money" => FieldType::Decimal,
            "float" | "double" | "real" | "float4" | "float8" => FieldType::Float,
            "date" => FieldType::Date,
            "time" | "timetz" => FieldType::Time,
            "timestamp" | "timestamptz" | "datetime" => FieldType::Timestamp,
            "text" | "tinytext" | "mediumtext" | "longtext" | "json" | "jsonb" | "xml" => {
                FieldType::Clob
            }
            "blob" | "tinyblob" | "mediumblob" | "longblob" | "bytea" | "binary"
            | "varbinary" => FieldType::Blob,
            _ => FieldType::Text,
        }
    }

    /// Converts a value read from the database into this field's
    /// representation.
    pub fn from_db(self, value: Value) -> Value {
        if value.is_null() {
            return Value::Null;
        }

        match self {
            FieldType::Boolean => Value::Bool(value.to_bool()),
            FieldType::Integer => match value.to_i64() {
                Ok(value) => Value::I64(value),
                Err(_) => value,
            },
            FieldType::Float => match value.to_f64() {
                Ok(value) => Value::F64(value),
                Err(_) => value,
            },
            _ => value,
        }
    }

    /// Converts a model value into the value written to the database.
    ///
    /// Booleans are stored as `'0'`/`'1'` and integer timestamps are formatted
    /// as `YYYY-MM-DD HH:MM:SS` in UTC.
    pub fn to_db(self, value: &Value) -> Result<Value> {
        Ok(match (self, value) {
            (_, Value::Null) => Value::Null,
            (FieldType::Boolean, value) => {
                Value::String(if value.to_bool() { "1" } else { "0" }.to_string())
            }
            (FieldType::Timestamp, Value::I64(secs)) => {
                let ts = jiff::Timestamp::from_second(*secs)?;
                Value::String(ts.strftime("%Y-%m-%d %H:%M:%S").to_string())
            }
            (_, value) => value.clone(),
        })
    }
}
