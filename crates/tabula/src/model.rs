mod link;
mod traverse;

use crate::{Db, ModelDef};

use indexmap::IndexMap;
use tabula_core::{
    driver::LastInsertId,
    schema::FieldType,
    stmt::{Row, Value},
    Error, Result,
};
use tabula_sql::stmt::{ColumnRef, Delete, Expr, Insert, Select, SelectItem, Update};

use std::sync::Arc;

/// One record of a registered table.
///
/// The primary key is held apart from the field map: `id() <= 0` means the
/// record has not been persisted yet.
#[derive(Debug, Clone)]
pub struct Model {
    def: Arc<ModelDef>,
    id: i64,
    fields: IndexMap<String, Value>,
    dirty: bool,
    last_error: Option<Error>,
}

impl Model {
    pub(crate) fn new(def: Arc<ModelDef>) -> Model {
        Model {
            def,
            id: -1,
            fields: IndexMap::new(),
            dirty: false,
            last_error: None,
        }
    }

    pub fn def(&self) -> &Arc<ModelDef> {
        &self.def
    }

    pub fn table(&self) -> &str {
        self.def.table()
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Forgets the primary key; the next save inserts a new row.
    pub fn clear_id(&mut self) {
        self.id = -1;
        self.dirty = true;
    }

    pub fn is_persisted(&self) -> bool {
        self.id > 0
    }

    /// `table:id`, the key this record is indexed under in object results.
    pub fn key(&self) -> String {
        format!("{}:{}", self.table(), self.id)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn fields(&self) -> &IndexMap<String, Value> {
        &self.fields
    }

    pub fn field_types(&self) -> &IndexMap<String, FieldType> {
        self.def.field_types()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.def.has_column(column)
    }

    /// The most recent error returned by one of this record's operations.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(|value| value.to_i64().ok())
    }

    pub fn get_f64(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(|value| value.to_f64().ok())
    }

    /// Missing and null fields read as `false`.
    pub fn get_bool(&self, column: &str) -> bool {
        self.get(column).is_some_and(Value::to_bool)
    }

    /// Sets a declared field, or the primary key.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();

        if column == self.def.pk() {
            let res = value.to_i64();
            let id = self.track(res)?;
            if id != self.id {
                self.id = id;
                self.dirty = true;
            }
            return Ok(());
        }

        let Some(ty) = self.def.field_type(column) else {
            let err = Error::unknown_column(format!("{}.{column}", self.table()));
            return self.track(Err(err));
        };

        let value = ty.from_db(value);

        if self.fields.get(column) != Some(&value) {
            self.fields.insert(column.to_string(), value);
            self.dirty = true;
        }

        Ok(())
    }

    pub fn unset(&mut self, column: &str) -> Option<Value> {
        let value = self.fields.shift_remove(column);
        if value.is_some() {
            self.dirty = true;
        }
        value
    }

    /// Hydrates the record from a row keyed by bare column names. Only the
    /// primary key and declared fields are read.
    pub fn bulk_set(&mut self, row: &Row) -> Result<()> {
        let res = self.bulk_set_inner(row);
        self.track(res)
    }

    fn bulk_set_inner(&mut self, row: &Row) -> Result<()> {
        let pk = self.def.pk();

        let Some(id) = row.get(pk) else {
            return Err(Error::invalid_statement(format!(
                "row for `{}` has no `{pk}` column",
                self.table()
            )));
        };

        let id = id.to_i64()?;
        let mut fields = IndexMap::new();

        for (column, ty) in self.def.field_types() {
            if let Some(value) = row.get(column) {
                fields.insert(column.clone(), ty.from_db(value.clone()));
            }
        }

        self.id = id;
        self.fields = fields;
        self.dirty = false;
        Ok(())
    }

    /// Reads the row `id` (or this record's own id when `id <= 0`).
    pub async fn restore(&mut self, db: &mut Db, id: i64) -> Result<i64> {
        let res = self.restore_inner(db, id).await;
        self.track(res)
    }

    async fn restore_inner(&mut self, db: &mut Db, id: i64) -> Result<i64> {
        let id = if id > 0 { id } else { self.id };

        if id <= 0 {
            return Err(Error::record_not_found(format!(
                "table={}; no id to restore",
                self.table()
            )));
        }

        let rows = db.query_rows(self.select_by_pk(id)).await?;

        let Some(row) = rows.first() else {
            return Err(Error::record_not_found(format!(
                "table={}; id={id}",
                self.table()
            )));
        };

        self.bulk_set_inner(row)?;
        Ok(self.id)
    }

    pub async fn save(&mut self, db: &mut Db) -> Result<i64> {
        let id = self.id;
        self.save_as(db, id).await
    }

    /// Saves the record under `id`. A non-positive id inserts a new row and
    /// captures the generated identifier; a positive id updates that row, or
    /// inserts it with the explicit id if this record was never saved and no
    /// such row exists.
    pub async fn save_as(&mut self, db: &mut Db, id: i64) -> Result<i64> {
        let res = self.save_inner(db, id).await;
        self.track(res)
    }

    async fn save_inner(&mut self, db: &mut Db, id: i64) -> Result<i64> {
        if !self.dirty && id == self.id && id > 0 {
            return Ok(id);
        }

        let values = self.db_values()?;

        if id > 0 {
            let mut update = Update::new(self.table());
            for (column, value) in &values {
                update.set(column, value.clone());
            }
            update.filter = Some(self.pk_filter(id));

            let affected = if update.assignments.is_empty() {
                0
            } else {
                db.exec_stmt(update).await?.rows.count()
            };

            if affected > 0 || self.id > 0 {
                self.id = id;
                self.dirty = false;
                tracing::info!(table = %self.table(), id, "model updated");
                return Ok(id);
            }
        }

        let mut insert = Insert::new(self.table());
        if id > 0 {
            insert.push(self.def.pk(), id);
        }
        for (column, value) in values {
            insert.push(column, value);
        }

        db.exec_stmt(insert).await?;

        let id = if id > 0 {
            id
        } else {
            match db.last_insert_id().await? {
                LastInsertId::Known(id) => id,
                LastInsertId::Unknown => return Err(Error::unknown_insert_id(self.table())),
            }
        };

        self.id = id;
        self.dirty = false;
        tracing::info!(table = %self.table(), id, "model inserted");
        Ok(id)
    }

    /// Deletes this record's row and resets the record.
    pub async fn destroy(&mut self, db: &mut Db) -> Result<bool> {
        let id = self.id;
        self.destroy_id(db, id).await
    }

    /// Deletes the row `id`. Destroying this record's own row resets it.
    pub async fn destroy_id(&mut self, db: &mut Db, id: i64) -> Result<bool> {
        let res = self.destroy_inner(db, id).await;
        self.track(res)
    }

    async fn destroy_inner(&mut self, db: &mut Db, id: i64) -> Result<bool> {
        if id <= 0 {
            return Ok(false);
        }

        let mut delete = Delete::new(self.table());
        delete.filter = Some(self.pk_filter(id));

        let deleted = db.exec_stmt(delete).await?.rows.count() > 0;

        if id == self.id {
            self.id = -1;
            self.fields.clear();
            self.dirty = false;
        }

        tracing::info!(table = %self.table(), id, deleted, "model destroyed");
        Ok(deleted)
    }

    /// Field values converted for writing, in declaration order.
    fn db_values(&self) -> Result<Vec<(String, Value)>> {
        let mut values = vec![];

        for (column, ty) in self.def.field_types() {
            if let Some(value) = self.fields.get(column) {
                values.push((column.clone(), ty.to_db(value)?));
            }
        }

        Ok(values)
    }

    /// Value of `column` for use in a key comparison: the id for the primary
    /// key, else the field value.
    pub(crate) fn key_value(&self, column: &str) -> Value {
        if column == self.def.pk() {
            Value::I64(self.id)
        } else {
            self.fields.get(column).cloned().unwrap_or_default()
        }
    }

    fn pk_filter(&self, id: i64) -> Expr {
        Expr::eq(ColumnRef::new(self.table(), self.def.pk()), Value::I64(id))
    }

    fn select_by_pk(&self, id: i64) -> Select {
        Select {
            returning: vec![SelectItem::Wildcard(None)],
            from: vec![self.table().to_string()],
            filter: Some(self.pk_filter(id)),
            ..Select::default()
        }
    }

    pub(crate) fn require_persisted(&self) -> Result<()> {
        if self.is_persisted() {
            Ok(())
        } else {
            Err(Error::invalid_statement(format!(
                "`{}` record has not been saved",
                self.table()
            )))
        }
    }

    /// Records the error of a failed operation.
    pub(crate) fn track<T>(&mut self, res: Result<T>) -> Result<T> {
        if let Err(err) = &res {
            self.last_error = Some(err.clone());
        }
        res
    }
}
