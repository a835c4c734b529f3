mod builder;
pub use builder::Builder;

mod connect;

use crate::{Model, ModelDef, Query, Registry};

use tabula_core::{
    driver::{Connection, Dialect, LastInsertId, Response, Rows},
    schema::{is_valid_table_name, table_name},
    Error, Result,
};
use tabula_sql::{Serializer, Statement};

use std::sync::Arc;

/// A database handle: the model registry plus one connection.
///
/// Every operation takes `&mut Db`, so statements run one at a time in the
/// order they are issued.
#[derive(Debug)]
pub struct Db {
    registry: Arc<Registry>,
    conn: Box<dyn Connection>,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn dialect(&self) -> Dialect {
        self.conn.dialect()
    }

    pub fn serializer(&self) -> Serializer {
        Serializer::for_dialect(self.dialect())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Executes one SQL statement.
    pub async fn exec(&mut self, sql: &str) -> Result<Response> {
        tracing::debug!(sql = %sql, dialect = %self.dialect(), "executing SQL");
        self.conn.exec(sql).await
    }

    /// Serializes and executes a statement.
    pub(crate) async fn exec_stmt(&mut self, stmt: impl Into<Statement>) -> Result<Response> {
        let sql = self.serializer().serialize(&stmt.into());
        self.exec(&sql).await
    }

    pub(crate) async fn query_rows(&mut self, stmt: impl Into<Statement>) -> Result<Vec<tabula_core::stmt::Row>> {
        Ok(self.exec_stmt(stmt).await?.rows.into_values())
    }

    /// Runs SQL text as-is and returns its rows or affected count.
    pub async fn passthrough(&mut self, sql: &str) -> Result<Rows> {
        Ok(self.exec(sql).await?.rows)
    }

    /// Rows affected by the most recent statement.
    pub fn affected_rows(&self) -> u64 {
        self.conn.affected_rows()
    }

    pub async fn last_insert_id(&mut self) -> Result<LastInsertId> {
        self.conn.last_insert_id().await
    }

    pub fn escape_literal(&self, text: &str) -> String {
        self.conn.escape_literal(text)
    }

    pub async fn table_exists(&mut self, table: &str) -> Result<bool> {
        let table = table_name(table);
        if !is_valid_table_name(&table) {
            return Ok(false);
        }
        self.conn.table_exists(&table).await
    }

    /// Column names of `table`, read from the database.
    pub async fn columns_of_table(&mut self, table: &str) -> Result<Vec<String>> {
        Ok(self
            .conn
            .columns_of_table(&table_name(table))
            .await?
            .into_keys()
            .collect())
    }

    pub async fn current_database(&mut self) -> Result<String> {
        self.conn.current_database().await
    }

    pub fn connection(&mut self) -> &mut dyn Connection {
        &mut *self.conn
    }

    /// Loads the definition registered for `table`. Definitions without
    /// declared fields have them detected from the table's columns.
    pub async fn model_def(&mut self, table: &str) -> Result<Arc<ModelDef>> {
        let mut def = self.registry.resolve(&table_name(table))?;
        let table = def.table().to_string();

        if !self.table_exists(&table).await? {
            return Err(Error::unknown_table(format!(
                "`{table}` does not exist in the database"
            )));
        }

        if !def.has_declared_fields() {
            let columns = self.conn.columns_of_table(&table).await?;
            def.detect_fields(columns.iter().map(|(name, ty)| (name.as_str(), ty.as_str())));
        }

        Ok(Arc::new(def))
    }

    /// Like [`Db::model_def`], but `None` for tables without a registered
    /// model (such as join tables).
    pub(crate) async fn model_def_opt(&mut self, table: &str) -> Result<Option<Arc<ModelDef>>> {
        if self.registry.contains(table) {
            Ok(Some(self.model_def(table).await?))
        } else {
            Ok(None)
        }
    }

    /// Creates a new, unsaved instance of the model registered for `table`.
    pub async fn create(&mut self, table: &str) -> Result<Model> {
        let def = self.model_def(table).await?;
        tracing::info!(table = %def.table(), "model created");
        Ok(Model::new(def))
    }

    /// Creates an instance and restores the row `id` into it when `id` is
    /// positive.
    pub async fn create_with_id(&mut self, table: &str, id: i64) -> Result<Model> {
        let mut model = self.create(table).await?;
        if id > 0 {
            model.restore(self, id).await?;
        }
        Ok(model)
    }

    /// Starts a query on `table`. A missing table is reported by the
    /// query's terminal operations.
    pub async fn query(&mut self, table: &str) -> Query {
        let name = table_name(table);

        let error = match self.table_exists(&name).await {
            Ok(true) => None,
            Ok(false) => Some(Error::unknown_table(format!(
                "`{name}` does not exist in the database"
            ))),
            Err(err) => Some(err),
        };

        Query::new(name, error)
    }
}
