use super::Expr;

/// Deletes rows of `table`, optionally filtered through `using` tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub comment: Option<String>,

    /// Table rows are deleted from
    pub table: String,

    /// Additional tables referenced by the filter
    pub using: Vec<String>,

    pub filter: Option<Expr>,
}

impl Delete {
    pub fn new(table: impl Into<String>) -> Delete {
        Delete {
            comment: None,
            table: table.into(),
            using: vec![],
            filter: None,
        }
    }
}
