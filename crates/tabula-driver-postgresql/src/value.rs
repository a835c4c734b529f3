use tabula_core::stmt::{Row, Value};
use tokio_postgres::SimpleQueryRow;

/// Converts a simple-query row. The text protocol reports every non-null
/// value as text; field types convert them later.
pub(crate) fn row(row: &SimpleQueryRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let value = match row.get(i) {
                Some(text) => Value::String(text.to_string()),
                None => Value::Null,
            };
            (column.name().to_string(), value)
        })
        .collect()
}
