use crate::{Db, ModelDef};

use indexmap::IndexMap;
use tabula_core::{schema::table_name, Error, Result};
use tabula_sql::stmt::{ColumnRef, Expr};

use std::sync::Arc;

/// The tables a query reaches once every `extend()` hop is applied, with
/// the columns each one contributes to column resolution.
#[derive(Debug)]
pub(crate) struct Scope {
    /// Primary table first, then hop tables in join order
    tables: IndexMap<String, ScopeTable>,

    /// Join conditions of every hop
    conditions: Vec<Expr>,
}

#[derive(Debug)]
pub(crate) struct ScopeTable {
    /// `None` for tables without a registered model, such as join tables
    pub(crate) def: Option<Arc<ModelDef>>,

    pub(crate) columns: Vec<String>,
}

impl Scope {
    /// Walks the join path. Each hop starts at the previous hop's
    /// destination, so `extend("a").extend("b")` joins `b` through `a`.
    pub(crate) async fn build(db: &mut Db, primary: &str, joins: &[String]) -> Result<Scope> {
        let mut scope = Scope {
            tables: IndexMap::new(),
            conditions: vec![],
        };

        scope.add_table(db, primary).await?;

        let mut from = primary.to_string();

        for target in joins {
            let Some(def) = scope.def(&from).cloned() else {
                return Err(Error::relation_not_declared(&from, target));
            };

            let hop = def.can_link_to(target)?;

            for table in &hop.tables {
                scope.add_table(db, table).await?;
            }

            scope.conditions.extend(hop.conditions);
            from = target.clone();
        }

        Ok(scope)
    }

    async fn add_table(&mut self, db: &mut Db, table: &str) -> Result<()> {
        if self.tables.contains_key(table) {
            return Ok(());
        }

        let def = db.model_def_opt(table).await?;

        let columns = match &def {
            Some(def) => def.columns().map(str::to_string).collect(),
            None => db.columns_of_table(table).await?,
        };

        self.tables
            .insert(table.to_string(), ScopeTable { def, columns });
        Ok(())
    }

    pub(crate) fn primary(&self) -> &str {
        self.tables
            .first()
            .map(|(name, _)| name.as_str())
            .unwrap_or_default()
    }

    /// Primary key column of `table`, `id` unless a model says otherwise.
    pub(crate) fn pk(&self, table: &str) -> &str {
        self.def(table).map(|def| def.pk()).unwrap_or("id")
    }

    pub(crate) fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub(crate) fn def(&self, table: &str) -> Option<&Arc<ModelDef>> {
        self.tables.get(table).and_then(|table| table.def.as_ref())
    }

    pub(crate) fn tables(&self) -> impl Iterator<Item = (&str, &ScopeTable)> {
        self.tables.iter().map(|(name, table)| (name.as_str(), table))
    }

    pub(crate) fn columns(&self, table: &str) -> &[String] {
        self.tables
            .get(table)
            .map(|table| table.columns.as_slice())
            .unwrap_or_default()
    }

    pub(crate) fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub(crate) fn conditions(&self) -> &[Expr] {
        &self.conditions
    }

    /// Resolves a column reference. `table.column` (or `table:column`) must
    /// name a table in scope and one of its columns; a bare column must
    /// belong to exactly one table.
    pub(crate) fn resolve(&self, column: &str) -> Result<ColumnRef> {
        let column = column.trim();

        if let Some((table, name)) = column.split_once(['.', ':']) {
            let table = table_name(table);

            if !self.contains(&table) {
                return Err(Error::unknown_column(format!(
                    "{column}; table `{table}` is not joined (yet)"
                )));
            }

            let name = name.trim();

            if !self.columns(&table).iter().any(|c| c == name) {
                return Err(Error::unknown_column(format!("{table}.{name}")));
            }

            return Ok(ColumnRef::new(table, name));
        }

        let mut matches = self
            .tables
            .iter()
            .filter(|(_, table)| table.columns.iter().any(|c| c == column))
            .map(|(name, _)| name.as_str());

        match (matches.next(), matches.next()) {
            (Some(table), None) => Ok(ColumnRef::new(table, column)),
            (None, _) => Err(Error::unknown_column(column)),
            (Some(first), Some(second)) => Err(Error::ambiguous_column(
                column,
                [first, second].into_iter().chain(matches),
            )),
        }
    }
}
