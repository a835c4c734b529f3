use super::Error;

/// Error when two models declare relation kinds that do not complement each
/// other, or a through model lacks the declarations a link needs.
#[derive(Debug)]
pub(super) struct RelationMismatchError {
    message: Box<str>,
}

impl std::error::Error for RelationMismatchError {}

impl core::fmt::Display for RelationMismatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "relation mismatch: {}", self.message)
    }
}

impl Error {
    pub fn relation_mismatch(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::RelationMismatch(RelationMismatchError {
            message: message.into().into(),
        }))
    }

    pub fn is_relation_mismatch(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::RelationMismatch(_))
    }
}
