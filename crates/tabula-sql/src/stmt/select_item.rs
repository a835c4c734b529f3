use super::ColumnRef;

#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// `*` or `table.*`
    Wildcard(Option<String>),

    Column {
        column: ColumnRef,
        alias: Option<String>,
    },

    /// `COUNT(*) AS alias`
    Count { alias: String },

    /// Projection text emitted as-is
    Raw(String),
}

impl SelectItem {
    /// Selects `column` under its `table:column` alias.
    pub fn aliased(column: ColumnRef) -> SelectItem {
        let alias = column.alias();
        SelectItem::Column {
            column,
            alias: Some(alias),
        }
    }
}
