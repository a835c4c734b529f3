use super::{Formatter, ToSql};

use crate::stmt::Value;

impl ToSql for &Value {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            Value::Null => f.dst.push_str("NULL"),
            Value::Bool(true) => f.dst.push_str("'1'"),
            Value::Bool(false) => f.dst.push_str("'0'"),
            Value::I64(v) => f.dst.push_str(&v.to_string()),
            Value::F64(v) if v.is_finite() => f.dst.push_str(&v.to_string()),
            Value::F64(_) => f.dst.push_str("NULL"),
            Value::String(v) => {
                let literal = f.serializer.dialect().escape_literal(v);
                f.dst.push_str(&literal);
            }
            Value::Bytes(v) => {
                let hex: String = v.iter().map(|b| format!("{b:02x}")).collect();

                if f.serializer.is_mysql() {
                    fmt!(f, "X'" hex.as_str() "'");
                } else {
                    fmt!(f, "'\\x" hex.as_str() "'::bytea");
                }
            }
        }
    }
}
