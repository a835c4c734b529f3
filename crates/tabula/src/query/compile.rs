//! Lowers a [`Query`] onto SQL statements once its [`Scope`] is known.

use super::{filter::Node, op::OperatorKind, Operand, Projection, Query, Scope};
use crate::{Db, Mode};

use tabula_core::{schema::table_name, stmt::Value, Error, Result};
use tabula_sql::stmt::{
    ColumnRef, Delete, Expr, Limit, OrderByExpr, Select, SelectItem, Update,
};

impl Query {
    /// Rows come back as flat maps once any column is selected explicitly.
    pub(crate) fn output_mode(&self) -> Mode {
        if self.projection.is_empty() {
            self.mode
        } else {
            Mode::Rows
        }
    }

    pub(crate) fn is_paged(&self) -> bool {
        self.page_start.is_some() || self.page_size.is_some()
    }

    pub(crate) fn compile_select(&self, scope: &Scope, db: &Db) -> Result<Select> {
        let primary = scope.primary();
        let mut returning = vec![];

        match self.output_mode() {
            Mode::Ids => {
                returning.push(SelectItem::aliased(ColumnRef::new(primary, scope.pk(primary))));
            }
            Mode::Rows if !self.projection.is_empty() => {
                for projection in &self.projection {
                    self.project(scope, projection, &mut returning)?;
                }
            }
            Mode::Rows => {
                for (table, _) in scope.tables() {
                    all_columns(scope, table, &mut returning);
                }
            }
            Mode::Objects => {
                all_columns(scope, primary, &mut returning);

                for table in &self.includes {
                    if !scope.contains(table) {
                        return Err(Error::invalid_statement(format!(
                            "`{table}` is included but not joined"
                        )));
                    }

                    if table != primary {
                        all_columns(scope, table, &mut returning);
                    }
                }
            }
        }

        if returning.is_empty() {
            return Err(Error::invalid_statement(format!(
                "query on `{primary}` selects no columns"
            )));
        }

        let order_by = self
            .order_by
            .iter()
            .map(|(column, direction)| {
                Ok(OrderByExpr {
                    column: scope.resolve(column)?,
                    direction: *direction,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let group_by = self
            .group_by
            .iter()
            .map(|column| scope.resolve(column))
            .collect::<Result<Vec<_>>>()?;

        let limit = self.limit_clause();

        if limit.is_some() && order_by.is_empty() {
            tracing::warn!(table = %primary, "LIMIT without ORDER BY; page contents are unstable");
        }

        Ok(Select {
            comment: self.comment.clone(),
            distinct: self.distinct,
            returning,
            from: scope.table_names(),
            filter: self.compile_filter(scope, db)?,
            group_by,
            order_by,
            limit,
        })
    }

    /// `SELECT COUNT(*)` over the same tables and filter, without ordering
    /// or paging.
    pub(crate) fn compile_count(&self, scope: &Scope, db: &Db) -> Result<Select> {
        Ok(Select {
            comment: self.comment.clone(),
            returning: vec![SelectItem::Count {
                alias: "count".to_string(),
            }],
            from: scope.table_names(),
            filter: self.compile_filter(scope, db)?,
            ..Select::default()
        })
    }

    pub(crate) fn compile_update(
        &self,
        scope: &Scope,
        db: &Db,
        fields: &[(String, Value)],
    ) -> Result<Update> {
        let primary = scope.primary();

        if fields.is_empty() {
            return Err(Error::invalid_statement(format!(
                "update of `{primary}` sets no columns"
            )));
        }

        let mut update = Update::new(primary);
        update.comment = self.comment.clone();
        update.from = scope.table_names().into_iter().skip(1).collect();

        for (column, value) in fields {
            let target = scope.resolve(column)?;

            if target.table.as_deref() != Some(primary) {
                return Err(Error::invalid_statement(format!(
                    "cannot SET `{target}`; only columns of `{primary}` can be updated"
                )));
            }

            let value = match scope.def(primary).and_then(|def| def.field_type(&target.column)) {
                Some(ty) => ty.to_db(value)?,
                None => value.clone(),
            };

            update.set(target.column, value);
        }

        update.filter = self.compile_filter(scope, db)?;
        Ok(update)
    }

    pub(crate) fn compile_delete(&self, scope: &Scope, db: &Db) -> Result<Delete> {
        let mut delete = Delete::new(scope.primary());
        delete.comment = self.comment.clone();
        delete.using = scope.table_names().into_iter().skip(1).collect();
        delete.filter = self.compile_filter(scope, db)?;
        Ok(delete)
    }

    /// Join conditions first, then the user filter.
    fn compile_filter(&self, scope: &Scope, db: &Db) -> Result<Option<Expr>> {
        let mut operands = scope.conditions().to_vec();

        if let Some(node) = self.filter.finish()? {
            let expr = lower(node, scope, db)?;

            operands.push(if operands.is_empty() {
                expr
            } else {
                nest(expr, |expr| matches!(expr, Expr::And(_)))
            });
        }

        Ok(Expr::and_all(operands))
    }

    fn limit_clause(&self) -> Option<Limit> {
        let limit = Limit {
            offset: self
                .page_start
                .map(|start| start.max(1) - 1)
                .filter(|offset| *offset > 0),
            limit: self.page_size,
        };

        (!limit.is_empty()).then_some(limit)
    }

    fn project(
        &self,
        scope: &Scope,
        projection: &Projection,
        returning: &mut Vec<SelectItem>,
    ) -> Result<()> {
        let name = match projection {
            Projection::Raw(sql) => {
                returning.push(SelectItem::Raw(sql.clone()));
                return Ok(());
            }
            Projection::Name(name) => name,
        };

        let table = table_name(name);

        if scope.contains(&table) {
            all_columns(scope, &table, returning);
            return Ok(());
        }

        match scope.resolve(name) {
            Ok(column) => returning.push(SelectItem::aliased(column)),
            Err(err) if err.is_unknown_column() && !name.contains(['.', ':']) => {
                tracing::warn!(column = %name, "selected column matches no joined table; skipped");
            }
            Err(err) => return Err(err),
        }

        Ok(())
    }
}

fn all_columns(scope: &Scope, table: &str, returning: &mut Vec<SelectItem>) {
    for column in scope.columns(table) {
        returning.push(SelectItem::aliased(ColumnRef::new(table, column)));
    }
}

fn lower(node: &Node, scope: &Scope, db: &Db) -> Result<Expr> {
    Ok(match node {
        Node::Leaf {
            column,
            op,
            operand,
        } => {
            let target = scope.resolve(column)?;

            match (op.kind(), operand) {
                (OperatorKind::Binary(binary), Operand::Value(value)) => {
                    Expr::binary_op(target, binary, value.clone())
                }
                (OperatorKind::List { negated }, Operand::List(list)) => {
                    Expr::in_list(target, list.clone(), negated)
                }
                (OperatorKind::Is { test, negated }, _) => Expr::is(target, test, negated),
                _ => {
                    return Err(Error::invalid_statement(format!(
                        "`{column} {op}` has a mismatched operand"
                    )))
                }
            }
        }
        Node::Raw { sql, vars } => Expr::raw(substitute(sql, vars, db)?),
        Node::And(lhs, rhs) => {
            let same = |expr: &Expr| matches!(expr, Expr::And(_));
            Expr::and(
                nest(lower(lhs, scope, db)?, same),
                nest(lower(rhs, scope, db)?, same),
            )
        }
        Node::Or(lhs, rhs) => {
            let same = |expr: &Expr| matches!(expr, Expr::Or(_));
            Expr::or(
                nest(lower(lhs, scope, db)?, same),
                nest(lower(rhs, scope, db)?, same),
            )
        }
        Node::Xor(lhs, rhs) => Expr::xor(
            nest(lower(lhs, scope, db)?, |_| false),
            nest(lower(rhs, scope, db)?, |_| false),
        ),
        Node::Not(inner) => Expr::not(nest(lower(inner, scope, db)?, |_| false)),
        Node::Grouped(inner) => Expr::grouped(lower(inner, scope, db)?),
    })
}

/// Parenthesizes a compound operand unless it flattens into its parent.
fn nest(expr: Expr, flattens: impl Fn(&Expr) -> bool) -> Expr {
    match expr {
        Expr::And(_) | Expr::Or(_) | Expr::Xor(_) | Expr::Raw(_) if !flattens(&expr) => {
            Expr::grouped(expr)
        }
        expr => expr,
    }
}

/// Replaces each `?` of a raw fragment with the next variable as an
/// escaped literal.
fn substitute(sql: &str, vars: &[Value], db: &Db) -> Result<String> {
    let serializer = db.serializer();
    let mut vars = vars.iter();
    let mut out = String::with_capacity(sql.len());

    for c in sql.chars() {
        if c != '?' {
            out.push(c);
            continue;
        }

        let Some(var) = vars.next() else {
            return Err(Error::invalid_statement(format!(
                "raw filter `{sql}` has more placeholders than values"
            )));
        };

        match var {
            Value::String(text) => out.push_str(&db.escape_literal(text)),
            value => out.push_str(&serializer.serialize_expr(&Expr::value(value.clone()))),
        }
    }

    if vars.next().is_some() {
        return Err(Error::invalid_statement(format!(
            "raw filter `{sql}` has more values than placeholders"
        )));
    }

    Ok(out)
}
