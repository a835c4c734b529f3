use indexmap::IndexMap;
use tabula_core::schema::{table_name, FieldType, RelationKind, RelationOptions};

/// Declaration of one model: its table, primary key, field types and
/// relations to other tables.
///
/// Definitions are produced by the factory closures registered with
/// [`crate::db::Builder::register`]. Relations are never discovered from the
/// database; only what is declared here can be traversed, joined or linked.
#[derive(Debug, Clone)]
pub struct ModelDef {
    table: String,
    primary_key: String,
    field_types: IndexMap<String, FieldType>,
    relations: IndexMap<RelationKind, IndexMap<String, RelationOptions>>,
}

impl ModelDef {
    pub fn new(table: &str) -> ModelDef {
        ModelDef {
            table: table_name(table),
            primary_key: "id".to_string(),
            field_types: IndexMap::new(),
            relations: IndexMap::new(),
        }
    }

    /// Overrides the primary key column (`id` by default).
    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = column.into();
        self
    }

    /// Declares a field. A definition without any declared field has its
    /// field types detected from the table's columns when it is loaded.
    pub fn field(mut self, column: impl Into<String>, ty: FieldType) -> Self {
        self.field_types.insert(column.into(), ty);
        self
    }

    pub fn relation(mut self, kind: RelationKind, target: &str, options: RelationOptions) -> Self {
        self.relations
            .entry(kind)
            .or_default()
            .insert(table_name(target), options);
        self
    }

    pub fn belongs_to(self, target: &str) -> Self {
        self.belongs_to_with(target, RelationOptions::new())
    }

    pub fn belongs_to_with(self, target: &str, options: RelationOptions) -> Self {
        self.relation(RelationKind::BelongsTo, target, options)
    }

    pub fn has_one(self, target: &str) -> Self {
        self.has_one_with(target, RelationOptions::new())
    }

    pub fn has_one_with(self, target: &str, options: RelationOptions) -> Self {
        self.relation(RelationKind::HasOne, target, options)
    }

    pub fn has_many(self, target: &str) -> Self {
        self.has_many_with(target, RelationOptions::new())
    }

    pub fn has_many_with(self, target: &str, options: RelationOptions) -> Self {
        self.relation(RelationKind::HasMany, target, options)
    }

    pub fn has_one_through(self, target: &str, through: &str) -> Self {
        self.has_one_through_with(target, RelationOptions::new().through(table_name(through)))
    }

    pub fn has_one_through_with(self, target: &str, options: RelationOptions) -> Self {
        self.relation(RelationKind::HasOneThrough, target, options)
    }

    pub fn has_many_through(self, target: &str, through: &str) -> Self {
        self.has_many_through_with(target, RelationOptions::new().through(table_name(through)))
    }

    pub fn has_many_through_with(self, target: &str, options: RelationOptions) -> Self {
        self.relation(RelationKind::HasManyThrough, target, options)
    }

    pub fn has_and_belongs_to_many(self, target: &str) -> Self {
        self.has_and_belongs_to_many_with(target, RelationOptions::new())
    }

    pub fn has_and_belongs_to_many_with(self, target: &str, options: RelationOptions) -> Self {
        self.relation(RelationKind::HasAndBelongsToMany, target, options)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Name of the primary key column.
    pub fn pk(&self) -> &str {
        &self.primary_key
    }

    pub fn field_types(&self) -> &IndexMap<String, FieldType> {
        &self.field_types
    }

    pub fn field_type(&self, column: &str) -> Option<FieldType> {
        self.field_types.get(column).copied()
    }

    /// Returns `true` if `column` is the primary key or a declared field.
    pub fn has_column(&self, column: &str) -> bool {
        column == self.primary_key || self.field_types.contains_key(column)
    }

    /// Column names in select order: the primary key, then every field.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary_key.as_str())
            .chain(self.field_types.keys().map(String::as_str))
    }

    /// Options declared for the `kind` relation to `target`, if any.
    pub fn relation_options(&self, kind: RelationKind, target: &str) -> Option<&RelationOptions> {
        self.relations.get(&kind)?.get(target)
    }

    pub fn declares(&self, kind: RelationKind, target: &str) -> bool {
        self.relation_options(kind, target).is_some()
    }

    /// Kinds of every relation declared toward `target`.
    pub fn relations_to<'a>(&'a self, target: &'a str) -> impl Iterator<Item = RelationKind> + 'a {
        RelationKind::ALL
            .into_iter()
            .filter(move |kind| self.declares(*kind, target))
    }

    pub(crate) fn has_declared_fields(&self) -> bool {
        !self.field_types.is_empty()
    }

    /// Sets field types detected from the table's columns. The primary key
    /// column is not a field.
    pub(crate) fn detect_fields<'a>(&mut self, columns: impl IntoIterator<Item = (&'a str, &'a str)>) {
        for (column, db_type) in columns {
            if column != self.primary_key {
                self.field_types
                    .insert(column.to_string(), FieldType::from_db_type(db_type));
            }
        }
    }
}
