/// Row window of a SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    /// Number of rows skipped (0-based).
    pub offset: Option<u64>,

    /// Maximum number of rows returned.
    pub limit: Option<u64>,
}

impl Limit {
    pub fn is_empty(&self) -> bool {
        self.offset.is_none() && self.limit.is_none()
    }
}
