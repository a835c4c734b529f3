use super::Error;

/// Error when a bare column name matches more than one joined table.
#[derive(Debug)]
pub(super) struct AmbiguousColumnError {
    column: Box<str>,
    tables: Box<str>,
}

impl std::error::Error for AmbiguousColumnError {}

impl core::fmt::Display for AmbiguousColumnError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "column reference `{}` is ambiguous; matches {}",
            self.column, self.tables
        )
    }
}

impl Error {
    pub fn ambiguous_column<I, S>(column: impl Into<String>, tables: I) -> Error
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tables = tables
            .into_iter()
            .map(|table| table.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        Error::from(super::ErrorKind::AmbiguousColumn(AmbiguousColumnError {
            column: column.into().into(),
            tables: tables.into(),
        }))
    }

    pub fn is_ambiguous_column(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::AmbiguousColumn(_))
    }
}
