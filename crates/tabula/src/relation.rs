//! Resolves declared relations into concrete key columns and join
//! conditions.

use crate::ModelDef;

use tabula_core::{
    schema::{table_name, RelationKind},
    Error, Result,
};
use tabula_sql::stmt::{ColumnRef, Expr};

/// Key and table names of one declared relation, with every option not
/// overridden by the declaration filled in with its conventional default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationKeys {
    pub kind: RelationKind,

    /// Table declaring the relation
    pub source: String,

    /// Related table
    pub target: String,

    /// Foreign key column (`BelongsTo`: on `source`; `HasOne`/`HasMany`: on
    /// `target`)
    pub fk: String,

    /// Primary key column `fk` points at
    pub pk: String,

    /// Through table, or join table for `HasAndBelongsToMany`
    pub through: Option<String>,

    pub sk: String,
    pub dk: String,
    pub spk: String,
    pub mpk: String,
    pub dpk: String,
}

/// One `extend()` hop: the tables it adds to the query and the conditions
/// joining them to the previous destination.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinHop {
    pub kind: RelationKind,
    pub tables: Vec<String>,
    pub conditions: Vec<Expr>,
}

/// Default join table of a `HasAndBelongsToMany` relation: both table names,
/// sorted, joined by `_`. Both sides of the relation derive the same name.
pub fn default_join_table(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}_{b}")
    } else {
        format!("{b}_{a}")
    }
}

impl RelationKeys {
    /// The table holding `sk`/`dk` for through and join relations.
    pub fn through_table(&self) -> Result<&str> {
        self.through.as_deref().ok_or_else(|| {
            Error::relation_mismatch(format!(
                "{} relation from `{}` to `{}` declares no through table",
                self.kind, self.source, self.target
            ))
        })
    }
}

impl ModelDef {
    /// Merges the declared options of the `kind` relation to `target` with
    /// the conventional defaults.
    pub fn options(&self, kind: RelationKind, target: &str) -> Result<RelationKeys> {
        let target = &table_name(target);
        let declared = self
            .relation_options(kind, target)
            .ok_or_else(|| Error::relation_not_declared(self.table(), target))?;

        let this = self.table();
        let or = |value: &Option<String>, default: String| value.clone().unwrap_or(default);
        let id = || "id".to_string();

        let mut keys = RelationKeys {
            kind,
            source: this.to_string(),
            target: target.to_string(),
            fk: String::new(),
            pk: String::new(),
            through: None,
            sk: String::new(),
            dk: String::new(),
            spk: or(&declared.spk, self.pk().to_string()),
            mpk: or(&declared.mpk, id()),
            dpk: or(&declared.dpk, id()),
        };

        match kind {
            RelationKind::BelongsTo => {
                keys.fk = or(&declared.fk, format!("{target}_id"));
                keys.pk = or(&declared.pk, id());
            }
            RelationKind::HasOne | RelationKind::HasMany => {
                keys.fk = or(&declared.fk, format!("{this}_id"));
                keys.pk = or(&declared.pk, self.pk().to_string());
            }
            RelationKind::HasOneThrough => {
                keys.through = declared.through.clone();
                keys.sk = or(&declared.sk, format!("{this}_id"));
                // `dk` lives on the target table and points at the through row
                keys.dk = match (&declared.dk, &keys.through) {
                    (Some(dk), _) => dk.clone(),
                    (None, Some(through)) => format!("{through}_id"),
                    (None, None) => String::new(),
                };
            }
            RelationKind::HasManyThrough => {
                keys.through = declared.through.clone();
                keys.sk = or(&declared.sk, format!("{this}_id"));
                keys.dk = or(&declared.dk, format!("{target}_id"));
            }
            RelationKind::HasAndBelongsToMany => {
                keys.through = Some(or(&declared.jointable, default_join_table(this, target)));
                keys.sk = or(&declared.sk, format!("{this}_id"));
                keys.dk = or(&declared.dk, format!("{target}_id"));
            }
        }

        Ok(keys)
    }

    /// The single relation kind declared toward `target`.
    pub fn default_relation(&self, target: &str) -> Result<RelationKind> {
        let target = &table_name(target);
        let mut kinds = self.relations_to(target);

        match (kinds.next(), kinds.next()) {
            (Some(kind), None) => Ok(kind),
            (None, _) => Err(Error::relation_not_declared(self.table(), target)),
            (Some(_), Some(_)) => Err(Error::ambiguous_relation(self.table(), target)),
        }
    }

    /// Builds the join hop from this table to `target`.
    pub fn can_link_to(&self, target: &str) -> Result<JoinHop> {
        let target = &table_name(target);
        let kind = self.default_relation(target)?;
        let keys = self.options(kind, target)?;
        let this = self.table();

        fn col(table: &str, column: &str) -> ColumnRef {
            ColumnRef::new(table, column)
        }

        let (tables, conditions) = match kind {
            RelationKind::BelongsTo => (
                vec![target.to_string()],
                vec![Expr::eq(col(this, &keys.fk), col(target, &keys.pk))],
            ),
            RelationKind::HasOne | RelationKind::HasMany => (
                vec![target.to_string()],
                vec![Expr::eq(col(target, &keys.fk), col(this, &keys.pk))],
            ),
            RelationKind::HasOneThrough => {
                let through = keys.through_table()?;
                (
                    vec![through.to_string(), target.to_string()],
                    vec![
                        Expr::eq(col(through, &keys.sk), col(this, &keys.spk)),
                        Expr::eq(col(target, &keys.dk), col(through, &keys.mpk)),
                    ],
                )
            }
            RelationKind::HasManyThrough | RelationKind::HasAndBelongsToMany => {
                let through = keys.through_table()?;
                (
                    vec![through.to_string(), target.to_string()],
                    vec![
                        Expr::eq(col(through, &keys.sk), col(this, &keys.spk)),
                        Expr::eq(col(through, &keys.dk), col(target, &keys.dpk)),
                    ],
                )
            }
        };

        Ok(JoinHop {
            kind,
            tables,
            conditions,
        })
    }
}
