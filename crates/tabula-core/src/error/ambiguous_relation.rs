use super::Error;

/// Error when more than one relation kind is declared to the same table and
/// the caller did not say which one to use.
#[derive(Debug)]
pub(super) struct AmbiguousRelationError {
    from: Box<str>,
    to: Box<str>,
}

impl std::error::Error for AmbiguousRelationError {}

impl core::fmt::Display for AmbiguousRelationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "more than one relation declared from `{}` to `{}`",
            self.from, self.to
        )
    }
}

impl Error {
    pub fn ambiguous_relation(from: impl Into<String>, to: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::AmbiguousRelation(AmbiguousRelationError {
            from: from.into().into(),
            to: to.into().into(),
        }))
    }

    pub fn is_ambiguous_relation(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::AmbiguousRelation(_))
    }
}
