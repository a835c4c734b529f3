use crate::stmt::Row;

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub rows: Rows,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rows {
    /// Number of rows impacted by the operation
    Count(u64),

    /// Rows returned by the statement
    Values(Vec<Row>),
}

impl Response {
    pub fn count(count: u64) -> Self {
        Self {
            rows: Rows::Count(count),
        }
    }

    pub fn rows(rows: impl Into<Vec<Row>>) -> Self {
        Self {
            rows: Rows::Values(rows.into()),
        }
    }

    pub fn empty() -> Self {
        Self::rows(Vec::new())
    }
}

impl Rows {
    pub fn is_count(&self) -> bool {
        matches!(self, Self::Count(_))
    }

    pub fn is_values(&self) -> bool {
        matches!(self, Self::Values(_))
    }

    /// Returns the affected row count, or the number of returned rows.
    pub fn count(&self) -> u64 {
        match self {
            Rows::Count(count) => *count,
            Rows::Values(rows) => rows.len() as u64,
        }
    }

    /// Returns the returned rows; a count response yields no rows.
    pub fn into_values(self) -> Vec<Row> {
        match self {
            Rows::Values(rows) => rows,
            Rows::Count(_) => Vec::new(),
        }
    }
}

/// Identifier generated by the last INSERT.
///
/// PostgreSQL reads the identifier with `SELECT lastval()`, which fails when
/// no sequence has been touched yet on the connection. That case is reported
/// as `Unknown` rather than as a sentinel number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastInsertId {
    Known(i64),
    Unknown,
}

impl LastInsertId {
    pub fn known(self) -> Option<i64> {
        match self {
            LastInsertId::Known(id) => Some(id),
            LastInsertId::Unknown => None,
        }
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, LastInsertId::Unknown)
    }
}
