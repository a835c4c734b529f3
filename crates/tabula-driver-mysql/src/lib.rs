mod value;
pub(crate) use value::Value;

use mysql_async::{prelude::Queryable, Conn, Pool};
use tabula_core::{
    async_trait,
    driver::{Columns, ConnectArgs, Dialect, Driver, LastInsertId, Response, Rows, SchemaCache},
    stmt::Row,
    Error, Result,
};
use url::Url;

#[derive(Debug)]
pub struct MySQL {
    pool: Pool,
}

impl MySQL {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let args = ConnectArgs::parse(&url_str)?;

        if args.dialect != Dialect::Mysql {
            return Err(Error::invalid_connection_url(format!(
                "connection url does not have a `mysql` scheme; url={url_str}"
            )));
        }

        let url = Url::parse(&url_str)?;
        let opts = mysql_async::Opts::from_url(url.as_ref()).map_err(Error::driver)?;
        let opts = mysql_async::OptsBuilder::from_opts(opts).client_found_rows(true);

        let pool = Pool::new(opts);
        Ok(Self { pool })
    }
}

impl From<Pool> for MySQL {
    fn from(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Driver for MySQL {
    async fn connect(&self) -> Result<Box<dyn tabula_core::Connection>> {
        let conn = self.pool.get_conn().await.map_err(Error::driver)?;
        Ok(Box::new(Connection::new(conn)))
    }
}

#[derive(Debug)]
pub struct Connection {
    conn: Conn,
    schema: SchemaCache,
    affected_rows: u64,
    last_insert_id: Option<u64>,
}

impl Connection {
    pub fn new(conn: Conn) -> Self {
        Self {
            conn,
            schema: SchemaCache::new(),
            affected_rows: 0,
            last_insert_id: None,
        }
    }

    /// Runs `sql` through the text protocol.
    async fn query(&mut self, sql: &str) -> Result<Rows> {
        let mut result = self.conn.query_iter(sql).await.map_err(Error::driver)?;
        let columns = result.columns();
        let rows: Vec<mysql_async::Row> = result.collect().await.map_err(Error::driver)?;
        result.drop_result().await.map_err(Error::driver)?;

        self.affected_rows = self.conn.affected_rows();

        if let Some(id) = self.conn.last_insert_id().filter(|id| *id > 0) {
            self.last_insert_id = Some(id);
        }

        let columns = match columns {
            Some(columns) if !columns.is_empty() => columns,
            _ => return Ok(Rows::Count(self.affected_rows)),
        };

        let rows = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(i, column)| {
                        let value = row
                            .as_ref(i)
                            .map(|value| Value::from(value).into_inner())
                            .unwrap_or_default();
                        (column.name_str().into_owned(), value)
                    })
                    .collect::<Row>()
            })
            .collect();

        Ok(Rows::Values(rows))
    }

    /// Reads one text column from every returned row.
    async fn query_column(&mut self, sql: &str) -> Result<Vec<String>> {
        Ok(self
            .query(sql)
            .await?
            .into_values()
            .iter()
            .filter_map(|row| row.first().map(|value| value.to_text()))
            .collect())
    }
}

impl From<Conn> for Connection {
    fn from(conn: Conn) -> Self {
        Self::new(conn)
    }
}

#[async_trait]
impl tabula_core::Connection for Connection {
    fn dialect(&self) -> Dialect {
        Dialect::Mysql
    }

    async fn exec(&mut self, sql: &str) -> Result<Response> {
        if self.schema.observe(sql) {
            tracing::debug!("schema cache invalidated");
        }

        let rows = self.query(sql).await?;
        Ok(Response { rows })
    }

    async fn last_insert_id(&mut self) -> Result<LastInsertId> {
        Ok(match self.last_insert_id {
            Some(id) => LastInsertId::Known(id as i64),
            None => LastInsertId::Unknown,
        })
    }

    fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    async fn table_exists(&mut self, table: &str) -> Result<bool> {
        if self.schema.tables().is_none() {
            let tables = self
                .query_column(
                    "SELECT table_name FROM information_schema.tables \
                     WHERE table_schema = DATABASE()",
                )
                .await?;
            self.schema.set_tables(tables);
        }

        Ok(self
            .schema
            .tables()
            .is_some_and(|tables| tables.contains(table)))
    }

    async fn columns_of_table(&mut self, table: &str) -> Result<Columns> {
        if let Some(columns) = self.schema.columns(table) {
            return Ok(columns.clone());
        }

        let sql = format!(
            "SELECT column_name, column_type FROM information_schema.columns \
             WHERE table_schema = DATABASE() AND table_name = {} \
             ORDER BY ordinal_position",
            Dialect::Mysql.escape_literal(table)
        );

        let columns: Columns = self
            .query(&sql)
            .await?
            .into_values()
            .iter()
            .filter_map(|row| {
                let mut values = row.iter().map(|(_, value)| value.to_text());
                Some((values.next()?, values.next()?))
            })
            .collect();

        self.schema.set_columns(table, columns.clone());
        Ok(columns)
    }

    async fn current_database(&mut self) -> Result<String> {
        if let Some(database) = self.schema.database() {
            return Ok(database.to_string());
        }

        let database = self
            .query_column("SELECT DATABASE()")
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();

        self.schema.set_database(database.clone());
        Ok(database)
    }
}
