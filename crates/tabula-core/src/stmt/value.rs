use crate::{bail, Result};

/// A column value.
///
/// Both drivers read rows through the text protocol, so values coming back
/// from the database are usually `String` until a model converts them with
/// its declared field types.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// Reads the value as an integer, parsing textual values.
    pub fn to_i64(&self) -> Result<i64> {
        match self {
            Value::I64(value) => Ok(*value),
            Value::Bool(value) => Ok(*value as i64),
            Value::F64(value) if value.fract() == 0.0 => Ok(*value as i64),
            Value::String(value) => Ok(value.trim().parse()?),
            value => bail!("cannot convert {value:?} to an integer"),
        }
    }

    pub fn to_f64(&self) -> Result<f64> {
        match self {
            Value::F64(value) => Ok(*value),
            Value::I64(value) => Ok(*value as f64),
            Value::String(value) => Ok(value.trim().parse()?),
            value => bail!("cannot convert {value:?} to a float"),
        }
    }

    /// Reads the value as a boolean. `0`, `false`, `f` and the empty string
    /// are false; any other text is true.
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(value) => *value,
            Value::I64(value) => *value != 0,
            Value::F64(value) => *value != 0.0,
            Value::String(value) => {
                let value = value.trim().to_ascii_lowercase();
                !matches!(value.as_str(), "" | "0" | "false" | "f")
            }
            Value::Bytes(value) => !value.is_empty(),
        }
    }

    /// Renders the value as plain text, the way it is keyed in `table:id`
    /// object keys.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(value) => (if *value { "1" } else { "0" }).to_string(),
            Value::I64(value) => value.to_string(),
            Value::F64(value) => value.to_string(),
            Value::String(value) => value.clone(),
            Value::Bytes(value) => String::from_utf8_lossy(value).into_owned(),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I64(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::I64(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Value::Null,
        }
    }
}
