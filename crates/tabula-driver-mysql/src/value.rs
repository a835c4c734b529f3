use tabula_core::stmt::Value as CoreValue;

/// A MySQL text-protocol value converted into a tabula value.
#[derive(Debug)]
pub struct Value(CoreValue);

impl Value {
    pub fn into_inner(self) -> CoreValue {
        self.0
    }
}

impl From<&mysql_async::Value> for Value {
    fn from(value: &mysql_async::Value) -> Self {
        use mysql_async::Value::*;

        Value(match value {
            NULL => CoreValue::Null,
            Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => CoreValue::String(text.to_string()),
                Err(_) => CoreValue::Bytes(bytes.clone()),
            },
            Int(v) => CoreValue::I64(*v),
            UInt(v) => match i64::try_from(*v) {
                Ok(v) => CoreValue::I64(v),
                Err(_) => CoreValue::String(v.to_string()),
            },
            Float(v) => CoreValue::F64(f64::from(*v)),
            Double(v) => CoreValue::F64(*v),
            Date(year, month, day, hour, minute, second, _) => CoreValue::String(format!(
                "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
            )),
            Time(negative, days, hours, minutes, seconds, _) => {
                let sign = if *negative { "-" } else { "" };
                let hours = u32::from(*hours) + days * 24;
                CoreValue::String(format!("{sign}{hours:02}:{minutes:02}:{seconds:02}"))
            }
        })
    }
}
