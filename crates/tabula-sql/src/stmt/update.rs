use super::{Expr, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub comment: Option<String>,

    /// Table whose rows are assigned
    pub table: String,

    /// Additional tables referenced by the filter
    pub from: Vec<String>,

    pub assignments: Vec<Assignment>,
    pub filter: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Value,
}

impl Update {
    pub fn new(table: impl Into<String>) -> Update {
        Update {
            comment: None,
            table: table.into(),
            from: vec![],
            assignments: vec![],
            filter: None,
        }
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.assignments.push(Assignment {
            column: column.into(),
            value: value.into(),
        });
    }
}
