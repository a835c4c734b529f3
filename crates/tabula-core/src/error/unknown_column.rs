use super::Error;

/// Error when a column reference matches no table in the query.
#[derive(Debug)]
pub(super) struct UnknownColumnError {
    column: Box<str>,
}

impl std::error::Error for UnknownColumnError {}

impl core::fmt::Display for UnknownColumnError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "no such column: {}", self.column)
    }
}

impl Error {
    pub fn unknown_column(column: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnknownColumn(UnknownColumnError {
            column: column.into().into(),
        }))
    }

    pub fn is_unknown_column(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnknownColumn(_))
    }
}
