use std::fmt;

/// The six association kinds a model may declare toward another table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// This row holds a foreign key pointing at one target row.
    BelongsTo,

    /// One target row holds a foreign key pointing at this row.
    HasOne,

    /// Any number of target rows hold a foreign key pointing at this row.
    HasMany,

    /// A through-table row points at this row and the target row points at
    /// the through-table row.
    HasOneThrough,

    /// Through-table rows point at both this row and target rows.
    HasManyThrough,

    /// A pure join table pairs this row with target rows.
    HasAndBelongsToMany,
}

impl RelationKind {
    pub const ALL: [RelationKind; 6] = [
        RelationKind::BelongsTo,
        RelationKind::HasOne,
        RelationKind::HasMany,
        RelationKind::HasOneThrough,
        RelationKind::HasManyThrough,
        RelationKind::HasAndBelongsToMany,
    ];

    /// Returns `true` for the kinds whose other side may hold at most one row.
    pub fn is_singular(self) -> bool {
        matches!(
            self,
            RelationKind::BelongsTo | RelationKind::HasOne | RelationKind::HasOneThrough
        )
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RelationKind::BelongsTo => "belongs_to",
            RelationKind::HasOne => "has_one",
            RelationKind::HasMany => "has_many",
            RelationKind::HasOneThrough => "has_one_through",
            RelationKind::HasManyThrough => "has_many_through",
            RelationKind::HasAndBelongsToMany => "has_and_belongs_to_many",
        })
    }
}

/// Overrides for the conventional key and table names of a declared
/// relation. Any option left unset falls back to the per-kind default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationOptions {
    /// Foreign key column (`BelongsTo`, `HasOne`, `HasMany`).
    pub fk: Option<String>,

    /// Primary key column referenced by `fk`.
    pub pk: Option<String>,

    /// Through-table (`HasOneThrough`, `HasManyThrough`).
    pub through: Option<String>,

    /// Join table (`HasAndBelongsToMany`).
    pub jointable: Option<String>,

    /// Source key: through/join column pointing at this row.
    pub sk: Option<String>,

    /// Destination key: the column pointing at the target (or, for
    /// `HasOneThrough`, the target column pointing at the through row).
    pub dk: Option<String>,

    /// Primary key of this (source) table.
    pub spk: Option<String>,

    /// Primary key of the through (middle) table.
    pub mpk: Option<String>,

    /// Primary key of the destination table.
    pub dpk: Option<String>,
}

impl RelationOptions {
    pub fn new() -> RelationOptions {
        RelationOptions::default()
    }

    pub fn fk(mut self, column: impl Into<String>) -> Self {
        self.fk = Some(column.into());
        self
    }

    pub fn pk(mut self, column: impl Into<String>) -> Self {
        self.pk = Some(column.into());
        self
    }

    pub fn through(mut self, table: impl Into<String>) -> Self {
        self.through = Some(table.into());
        self
    }

    pub fn jointable(mut self, table: impl Into<String>) -> Self {
        self.jointable = Some(table.into());
        self
    }

    pub fn sk(mut self, column: impl Into<String>) -> Self {
        self.sk = Some(column.into());
        self
    }

    pub fn dk(mut self, column: impl Into<String>) -> Self {
        self.dk = Some(column.into());
        self
    }

    pub fn spk(mut self, column: impl Into<String>) -> Self {
        self.spk = Some(column.into());
        self
    }

    pub fn mpk(mut self, column: impl Into<String>) -> Self {
        self.mpk = Some(column.into());
        self
    }

    pub fn dpk(mut self, column: impl Into<String>) -> Self {
        self.dpk = Some(column.into());
        self
    }
}
