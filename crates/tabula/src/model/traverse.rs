use super::Model;
use crate::{Db, ModelDef};

use tabula_core::{schema::RelationKind, stmt::Row, Error, Result};
use tabula_sql::stmt::{ColumnRef, Expr, Select, SelectItem};

use std::sync::Arc;

impl Model {
    /// The record this one points at through its foreign key.
    pub async fn belongs_to(&mut self, db: &mut Db, table: &str) -> Result<Option<Model>> {
        let res = self.belongs_to_inner(db, table).await;
        self.track(res)
    }

    async fn belongs_to_inner(&self, db: &mut Db, table: &str) -> Result<Option<Model>> {
        self.require_persisted()?;
        let keys = self.def.options(RelationKind::BelongsTo, table)?;

        let fk = self.key_value(&keys.fk);
        if fk.is_null() {
            return Ok(None);
        }

        let target = db.model_def(table).await?;
        let select = Select {
            returning: vec![SelectItem::Wildcard(None)],
            from: vec![target.table().to_string()],
            filter: Some(Expr::eq(ColumnRef::new(target.table(), &keys.pk), fk)),
            ..Select::default()
        };

        let rows = db.query_rows(select).await?;
        at_most_one(&target, rows, RelationKind::BelongsTo)
    }

    /// The single record whose foreign key points at this one.
    pub async fn has_one(&mut self, db: &mut Db, table: &str) -> Result<Option<Model>> {
        let res = self.has_one_inner(db, table).await;
        self.track(res)
    }

    async fn has_one_inner(&self, db: &mut Db, table: &str) -> Result<Option<Model>> {
        let (target, rows) = self.fetch_direct(db, RelationKind::HasOne, table).await?;
        at_most_one(&target, rows, RelationKind::HasOne)
    }

    /// Every record whose foreign key points at this one.
    pub async fn has_many(&mut self, db: &mut Db, table: &str) -> Result<Vec<Model>> {
        let res = self.has_many_inner(db, table).await;
        self.track(res)
    }

    async fn has_many_inner(&self, db: &mut Db, table: &str) -> Result<Vec<Model>> {
        let (target, rows) = self.fetch_direct(db, RelationKind::HasMany, table).await?;
        hydrate(&target, rows)
    }

    pub async fn has_one_through(&mut self, db: &mut Db, table: &str) -> Result<Option<Model>> {
        let res = self.has_one_through_inner(db, table).await;
        self.track(res)
    }

    async fn has_one_through_inner(&self, db: &mut Db, table: &str) -> Result<Option<Model>> {
        let kind = RelationKind::HasOneThrough;
        let (target, rows) = self.fetch_through(db, kind, table).await?;
        at_most_one(&target, rows, kind)
    }

    pub async fn has_many_through(&mut self, db: &mut Db, table: &str) -> Result<Vec<Model>> {
        let res = self.has_many_through_inner(db, table).await;
        self.track(res)
    }

    async fn has_many_through_inner(&self, db: &mut Db, table: &str) -> Result<Vec<Model>> {
        let (target, rows) = self
            .fetch_through(db, RelationKind::HasManyThrough, table)
            .await?;
        hydrate(&target, rows)
    }

    pub async fn has_and_belongs_to_many(&mut self, db: &mut Db, table: &str) -> Result<Vec<Model>> {
        let res = self.habtm_inner(db, table).await;
        self.track(res)
    }

    async fn habtm_inner(&self, db: &mut Db, table: &str) -> Result<Vec<Model>> {
        let (target, rows) = self
            .fetch_through(db, RelationKind::HasAndBelongsToMany, table)
            .await?;
        hydrate(&target, rows)
    }

    /// Follows the relation to `table`. Without an explicit kind, exactly one
    /// relation to `table` must be declared.
    pub async fn related(
        &mut self,
        db: &mut Db,
        table: &str,
        kind: Option<RelationKind>,
    ) -> Result<Vec<Model>> {
        let kind = match kind {
            Some(kind) => kind,
            None => {
                let res = self.def.default_relation(table);
                self.track(res)?
            }
        };

        Ok(match kind {
            RelationKind::BelongsTo => self.belongs_to(db, table).await?.into_iter().collect(),
            RelationKind::HasOne => self.has_one(db, table).await?.into_iter().collect(),
            RelationKind::HasMany => self.has_many(db, table).await?,
            RelationKind::HasOneThrough => {
                self.has_one_through(db, table).await?.into_iter().collect()
            }
            RelationKind::HasManyThrough => self.has_many_through(db, table).await?,
            RelationKind::HasAndBelongsToMany => self.has_and_belongs_to_many(db, table).await?,
        })
    }

    /// `HasOne`/`HasMany`: target rows whose foreign key holds this id.
    async fn fetch_direct(
        &self,
        db: &mut Db,
        kind: RelationKind,
        table: &str,
    ) -> Result<(Arc<ModelDef>, Vec<Row>)> {
        self.require_persisted()?;
        let keys = self.def.options(kind, table)?;
        let target = db.model_def(table).await?;

        let select = Select {
            returning: vec![SelectItem::Wildcard(None)],
            from: vec![target.table().to_string()],
            filter: Some(Expr::eq(
                ColumnRef::new(target.table(), &keys.fk),
                self.key_value(&keys.pk),
            )),
            ..Select::default()
        };

        let rows = db.query_rows(select).await?;
        Ok((target, rows))
    }

    /// Through and join-table relations: target rows reached through the
    /// middle table.
    async fn fetch_through(
        &self,
        db: &mut Db,
        kind: RelationKind,
        table: &str,
    ) -> Result<(Arc<ModelDef>, Vec<Row>)> {
        self.require_persisted()?;
        let keys = self.def.options(kind, table)?;
        let through = keys.through_table()?;
        let target = db.model_def(table).await?;

        let table = target.table();

        let reaches_target = match kind {
            RelationKind::HasOneThrough => Expr::eq(
                ColumnRef::new(table, &keys.dk),
                ColumnRef::new(through, &keys.mpk),
            ),
            _ => Expr::eq(
                ColumnRef::new(through, &keys.dk),
                ColumnRef::new(table, &keys.dpk),
            ),
        };

        let select = Select {
            returning: vec![SelectItem::Wildcard(Some(table.to_string()))],
            from: vec![through.to_string(), table.to_string()],
            filter: Some(Expr::and(
                Expr::eq(ColumnRef::new(through, &keys.sk), self.key_value(&keys.spk)),
                reaches_target,
            )),
            ..Select::default()
        };

        let rows = db.query_rows(select).await?;
        Ok((target, rows))
    }
}

fn hydrate(def: &Arc<ModelDef>, rows: Vec<Row>) -> Result<Vec<Model>> {
    rows.iter()
        .map(|row| {
            let mut model = Model::new(def.clone());
            model.bulk_set_inner(row)?;
            Ok(model)
        })
        .collect()
}

fn at_most_one(def: &Arc<ModelDef>, rows: Vec<Row>, kind: RelationKind) -> Result<Option<Model>> {
    if rows.len() > 1 {
        return Err(Error::too_many_records(format!(
            "{kind}({}) matched {} rows",
            def.table(),
            rows.len()
        )));
    }

    Ok(hydrate(def, rows)?.pop())
}
