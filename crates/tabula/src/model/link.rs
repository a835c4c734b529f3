use super::Model;
use crate::{Db, RelationKeys};

use tabula_core::{schema::RelationKind, stmt::Value, Error, Result};
use tabula_sql::stmt::{ColumnRef, Delete, Expr, Insert, Select, SelectItem};

impl Model {
    /// Links this record with `other` through the single relation declared
    /// between their tables. Unsaved records are saved first. Linking
    /// records that are already linked does nothing.
    pub async fn link(&mut self, db: &mut Db, other: &mut Model) -> Result<()> {
        let res = self.link_inner(db, other, None).await;
        self.track(res)
    }

    /// Like [`Model::link`], using `middle` as the through-table record.
    pub async fn link_through(
        &mut self,
        db: &mut Db,
        other: &mut Model,
        middle: &mut Model,
    ) -> Result<()> {
        let res = self.link_inner(db, other, Some(middle)).await;
        self.track(res)
    }

    /// Removes the link between this record and `other`. Foreign keys are
    /// cleared to NULL; join-table rows are deleted.
    pub async fn unlink(&mut self, db: &mut Db, other: &mut Model) -> Result<()> {
        let res = self.unlink_inner(db, other).await;
        self.track(res)
    }

    /// Number of links between this record and `other`.
    pub async fn link_count(&mut self, db: &mut Db, other: &Model) -> Result<u64> {
        let res = self.count_links(db, other, true).await;
        self.track(res)
    }

    /// Number of links of this record to any record of `other`'s table
    /// (for `BelongsTo`, links of any record of this table to `other`).
    pub async fn link_count_any(&mut self, db: &mut Db, other: &Model) -> Result<u64> {
        let res = self.count_links(db, other, false).await;
        self.track(res)
    }

    pub async fn are_linked(&mut self, db: &mut Db, other: &Model) -> Result<bool> {
        Ok(self.link_count(db, other).await? > 0)
    }

    async fn link_inner(
        &mut self,
        db: &mut Db,
        other: &mut Model,
        middle: Option<&mut Model>,
    ) -> Result<()> {
        let keys = self.check_complementary(db, other).await?;

        if middle.is_some() && !matches!(keys.kind, RelationKind::HasOneThrough | RelationKind::HasManyThrough) {
            return Err(Error::invalid_statement(format!(
                "{} relation from `{}` to `{}` has no through record",
                keys.kind, keys.source, keys.target
            )));
        }

        if !self.is_persisted() {
            self.save_inner(db, self.id).await?;
        }

        if !other.is_persisted() {
            other.save(db).await?;
        }

        if self.count_links(db, other, true).await? > 0 {
            return Ok(());
        }

        if matches!(keys.kind, RelationKind::HasOne | RelationKind::HasOneThrough)
            && self.count_links(db, other, false).await? > 0
        {
            return Err(Error::too_many_records(format!(
                "`{}` record {} already has one `{}`",
                keys.source, self.id, keys.target
            )));
        }

        match keys.kind {
            RelationKind::BelongsTo => {
                self.set(&keys.fk, other.key_value(&keys.pk))?;
                self.save_inner(db, self.id).await?;
            }
            RelationKind::HasOne | RelationKind::HasMany => {
                other.set(&keys.fk, self.key_value(&keys.pk))?;
                other.save(db).await?;
            }
            RelationKind::HasOneThrough => {
                let through = keys.through_table()?;
                let mut created;
                let middle = match middle {
                    Some(middle) => middle,
                    None => {
                        created = db.create(through).await?;
                        &mut created
                    }
                };

                middle.set(&keys.sk, self.key_value(&keys.spk))?;
                middle.save(db).await?;

                other.set(&keys.dk, middle.key_value(&keys.mpk))?;
                other.save(db).await?;
            }
            RelationKind::HasManyThrough => {
                let through = keys.through_table()?;
                let mut created;
                let middle = match middle {
                    Some(middle) => middle,
                    None => {
                        created = db.create(through).await?;
                        &mut created
                    }
                };

                middle.set(&keys.sk, self.key_value(&keys.spk))?;
                middle.set(&keys.dk, other.key_value(&keys.dpk))?;
                middle.save(db).await?;
            }
            RelationKind::HasAndBelongsToMany => {
                let mut insert = Insert::new(keys.through_table()?);
                insert.push(&keys.sk, self.key_value(&keys.spk));
                insert.push(&keys.dk, other.key_value(&keys.dpk));
                db.exec_stmt(insert).await?;
            }
        }

        tracing::info!(from = %self.key(), to = %other.key(), kind = %keys.kind, "linked");
        Ok(())
    }

    async fn unlink_inner(&mut self, db: &mut Db, other: &mut Model) -> Result<()> {
        self.require_persisted()?;
        other.require_persisted()?;

        let keys = self.check_complementary(db, other).await?;

        if self.count_links(db, other, true).await? == 0 {
            return Ok(());
        }

        match keys.kind {
            RelationKind::BelongsTo => {
                self.set(&keys.fk, Value::Null)?;
                self.save_inner(db, self.id).await?;
            }
            RelationKind::HasOne | RelationKind::HasMany => {
                other.set(&keys.fk, Value::Null)?;
                other.save(db).await?;
            }
            RelationKind::HasOneThrough => {
                let through = keys.through_table()?;
                let middles = self.middle_rows(db, &keys, None).await?;

                let points_at_middle = middles.iter().any(|middle| {
                    middle.key_value(&keys.mpk).to_text() == other.key_value(&keys.dk).to_text()
                });

                if !points_at_middle {
                    return Err(Error::relation_mismatch(format!(
                        "`{}` record {} is not reached through `{through}`",
                        keys.target, other.id
                    )));
                }

                other.set(&keys.dk, Value::Null)?;
                other.save(db).await?;
            }
            RelationKind::HasManyThrough => {
                let mut middles = self.middle_rows(db, &keys, Some(&*other)).await?;

                if middles.len() > 1 {
                    return Err(Error::too_many_records(format!(
                        "{} `{}` rows link `{}` record {} to `{}` record {}",
                        middles.len(),
                        keys.through_table()?,
                        keys.source,
                        self.id,
                        keys.target,
                        other.id
                    )));
                }

                if let Some(middle) = middles.first_mut() {
                    middle.destroy(db).await?;
                }
            }
            RelationKind::HasAndBelongsToMany => {
                let join = keys.through_table()?;
                let mut delete = Delete::new(join);
                delete.filter = Some(Expr::and(
                    Expr::eq(ColumnRef::new(join, &keys.sk), self.key_value(&keys.spk)),
                    Expr::eq(ColumnRef::new(join, &keys.dk), other.key_value(&keys.dpk)),
                ));
                db.exec_stmt(delete).await?;
            }
        }

        tracing::info!(from = %self.key(), to = %other.key(), kind = %keys.kind, "unlinked");
        Ok(())
    }

    /// Through-table records pointing at this record (and at `other`, when
    /// given).
    async fn middle_rows(
        &self,
        db: &mut Db,
        keys: &RelationKeys,
        other: Option<&Model>,
    ) -> Result<Vec<Model>> {
        let through = keys.through_table()?;
        let def = db.model_def(through).await?;

        let mut filter = Expr::eq(ColumnRef::new(through, &keys.sk), self.key_value(&keys.spk));

        if let Some(other) = other {
            filter = Expr::and(
                filter,
                Expr::eq(ColumnRef::new(through, &keys.dk), other.key_value(&keys.dpk)),
            );
        }

        let select = Select {
            returning: vec![SelectItem::Wildcard(None)],
            from: vec![through.to_string()],
            filter: Some(filter),
            ..Select::default()
        };

        db.query_rows(select)
            .await?
            .iter()
            .map(|row| {
                let mut middle = Model::new(def.clone());
                middle.bulk_set_inner(row)?;
                Ok(middle)
            })
            .collect()
    }

    /// Resolves the relation from this record to `other` and checks that
    /// `other`'s table declares the matching inverse.
    async fn check_complementary(&self, db: &mut Db, other: &Model) -> Result<RelationKeys> {
        let this = self.table();
        let that = other.table();

        let kind = self.def.default_relation(that)?;
        let keys = self.def.options(kind, that)?;

        if kind == RelationKind::HasOneThrough {
            let through = keys.through_table()?;
            let middle = db.model_def(through).await?;

            if !middle.declares(RelationKind::BelongsTo, this)
                || !middle.declares(RelationKind::HasOne, that)
            {
                return Err(Error::relation_mismatch(format!(
                    "`{this}` has one `{that}` through `{through}`, but `{through}` does not \
                     declare belongs_to `{this}` and has_one `{that}`"
                )));
            }

            return Ok(keys);
        }

        let inverse = other.def.default_relation(this).map_err(|err| {
            Error::relation_mismatch(format!("`{this}` {kind} `{that}`: {err}"))
        })?;

        let complementary = match kind {
            RelationKind::BelongsTo => {
                matches!(inverse, RelationKind::HasOne | RelationKind::HasMany)
            }
            RelationKind::HasOne | RelationKind::HasMany => inverse == RelationKind::BelongsTo,
            RelationKind::HasManyThrough => inverse == RelationKind::HasManyThrough,
            RelationKind::HasAndBelongsToMany => inverse == RelationKind::HasAndBelongsToMany,
            RelationKind::HasOneThrough => true,
        };

        if !complementary {
            return Err(Error::relation_mismatch(format!(
                "`{this}` {kind} `{that}`, but `{that}` {inverse} `{this}`"
            )));
        }

        Ok(keys)
    }

    /// Counts links to `other`; with `exact` unset, counts links to any
    /// record of `other`'s table.
    pub(crate) async fn count_links(&self, db: &mut Db, other: &Model, exact: bool) -> Result<u64> {
        let kind = self.def.default_relation(other.table())?;
        let keys = self.def.options(kind, other.table())?;
        let this = self.table();
        let that = other.table();

        let (from, filter) = match kind {
            RelationKind::BelongsTo => {
                let mut filter = vec![Expr::eq(
                    ColumnRef::new(this, &keys.fk),
                    other.key_value(&keys.pk),
                )];
                if exact {
                    filter.push(Expr::eq(ColumnRef::new(this, self.def.pk()), Value::I64(self.id)));
                }
                (vec![this.to_string()], filter)
            }
            RelationKind::HasOne | RelationKind::HasMany => {
                let mut filter = vec![Expr::eq(
                    ColumnRef::new(that, &keys.fk),
                    self.key_value(&keys.pk),
                )];
                if exact {
                    filter.push(Expr::eq(ColumnRef::new(that, other.def.pk()), Value::I64(other.id)));
                }
                (vec![that.to_string()], filter)
            }
            RelationKind::HasOneThrough | RelationKind::HasManyThrough => {
                let through = keys.through_table()?;

                let reaches_target = if kind == RelationKind::HasOneThrough {
                    Expr::eq(ColumnRef::new(that, &keys.dk), ColumnRef::new(through, &keys.mpk))
                } else {
                    Expr::eq(ColumnRef::new(through, &keys.dk), ColumnRef::new(that, &keys.dpk))
                };

                let mut filter = vec![
                    Expr::eq(ColumnRef::new(this, self.def.pk()), Value::I64(self.id)),
                    Expr::eq(ColumnRef::new(through, &keys.sk), ColumnRef::new(this, &keys.spk)),
                    reaches_target,
                ];
                if exact {
                    filter.push(Expr::eq(ColumnRef::new(that, &keys.dpk), other.key_value(&keys.dpk)));
                }
                (vec![this.to_string(), through.to_string(), that.to_string()], filter)
            }
            RelationKind::HasAndBelongsToMany => {
                let join = keys.through_table()?;
                let mut filter = vec![Expr::eq(
                    ColumnRef::new(join, &keys.sk),
                    self.key_value(&keys.spk),
                )];
                if exact {
                    filter.push(Expr::eq(ColumnRef::new(join, &keys.dk), other.key_value(&keys.dpk)));
                }
                (vec![join.to_string()], filter)
            }
        };

        let select = Select {
            returning: vec![SelectItem::Count {
                alias: "count".to_string(),
            }],
            from,
            filter: Expr::and_all(filter),
            ..Select::default()
        };

        let rows = db.query_rows(select).await?;

        match rows.first().and_then(|row| row.first()) {
            Some(count) => Ok(count.to_i64()?.max(0) as u64),
            None => Ok(0),
        }
    }
}
