use super::Error;

/// Error when no model factory is registered for a table.
#[derive(Debug)]
pub(super) struct UnknownModelError {
    key: Box<str>,
}

impl std::error::Error for UnknownModelError {}

impl core::fmt::Display for UnknownModelError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "no model registered as `{}`", self.key)
    }
}

impl Error {
    pub fn unknown_model(key: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnknownModel(UnknownModelError {
            key: key.into().into(),
        }))
    }

    pub fn is_unknown_model(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnknownModel(_))
    }
}
