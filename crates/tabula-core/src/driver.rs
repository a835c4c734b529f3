mod connect_args;
pub use connect_args::ConnectArgs;

mod dialect;
pub use dialect::Dialect;

mod response;
pub use response::{LastInsertId, Response, Rows};

mod schema_cache;
pub use schema_cache::{Columns, SchemaCache};

use crate::async_trait;

use std::fmt::Debug;

#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Opens a new connection to the database.
    async fn connect(&self) -> crate::Result<Box<dyn Connection>>;
}

/// The storage collaborator: executes SQL text and answers schema questions
/// for one of the two supported dialects.
#[async_trait]
pub trait Connection: Debug + Send + 'static {
    /// The SQL dialect this connection speaks.
    fn dialect(&self) -> Dialect;

    /// Executes one SQL statement.
    ///
    /// Statements returning rows respond with [`Rows::Values`]; all other
    /// statements respond with the affected row count.
    async fn exec(&mut self, sql: &str) -> crate::Result<Response>;

    /// Quotes and escapes `text` as a string literal.
    fn escape_literal(&self, text: &str) -> String {
        self.dialect().escape_literal(text)
    }

    /// Identifier generated by the most recent INSERT on this connection.
    async fn last_insert_id(&mut self) -> crate::Result<LastInsertId>;

    /// Rows affected by the most recent statement.
    fn affected_rows(&self) -> u64;

    /// Returns `true` if `table` exists in the current database.
    async fn table_exists(&mut self, table: &str) -> crate::Result<bool>;

    /// Column names of `table`, mapped to their database type names.
    async fn columns_of_table(&mut self, table: &str) -> crate::Result<Columns>;

    /// Name of the database this connection is using.
    async fn current_database(&mut self) -> crate::Result<String>;
}
