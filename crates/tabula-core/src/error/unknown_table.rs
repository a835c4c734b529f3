use super::Error;

/// Error when a table does not exist or is not part of the query.
#[derive(Debug)]
pub(super) struct UnknownTableError {
    message: Box<str>,
}

impl std::error::Error for UnknownTableError {}

impl core::fmt::Display for UnknownTableError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unknown table: {}", self.message)
    }
}

impl Error {
    pub fn unknown_table(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnknownTable(UnknownTableError {
            message: message.into().into(),
        }))
    }

    pub fn is_unknown_table(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnknownTable(_))
    }
}
