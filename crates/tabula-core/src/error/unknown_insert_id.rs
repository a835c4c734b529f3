use super::Error;

/// Error when an INSERT succeeded but the connection could not report the
/// generated identifier.
#[derive(Debug)]
pub(super) struct UnknownInsertIdError {
    table: Box<str>,
}

impl std::error::Error for UnknownInsertIdError {}

impl core::fmt::Display for UnknownInsertIdError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "database did not report an identifier for the row inserted into `{}`",
            self.table
        )
    }
}

impl Error {
    pub fn unknown_insert_id(table: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnknownInsertId(UnknownInsertIdError {
            table: table.into().into(),
        }))
    }

    pub fn is_unknown_insert_id(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnknownInsertId(_))
    }
}
