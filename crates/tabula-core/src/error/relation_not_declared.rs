use super::Error;

/// Error when traversing or linking a relation the model never declared.
#[derive(Debug)]
pub(super) struct RelationNotDeclaredError {
    from: Box<str>,
    to: Box<str>,
}

impl std::error::Error for RelationNotDeclaredError {}

impl core::fmt::Display for RelationNotDeclaredError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "no relation declared from `{}` to `{}`", self.from, self.to)
    }
}

impl Error {
    pub fn relation_not_declared(from: impl Into<String>, to: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::RelationNotDeclared(
            RelationNotDeclaredError {
                from: from.into().into(),
                to: to.into().into(),
            },
        ))
    }

    pub fn is_relation_not_declared(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::RelationNotDeclared(_))
    }
}
