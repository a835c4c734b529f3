mod value;

use tabula_core::{
    async_trait,
    driver::{Columns, ConnectArgs, Dialect, LastInsertId, Response, Rows, SchemaCache},
    Error, Result,
};
use tokio_postgres::{
    tls::MakeTlsConnect, Client, Config, NoTls, SimpleQueryMessage, Socket,
};

#[derive(Debug)]
pub struct PostgreSQL {
    config: Config,
}

impl PostgreSQL {
    /// Builds a driver from a `postgresql://`, `postgres://` or `pgsql://`
    /// connection URL.
    pub fn new(url: &str) -> Result<Self> {
        let args = ConnectArgs::parse(url)?;

        if args.dialect != Dialect::Postgresql {
            return Err(Error::invalid_connection_url(format!(
                "connection URL does not have a `postgresql` scheme; url={url}"
            )));
        }

        let mut config = Config::new();
        config.host(&args.host);
        config.port(args.port);
        config.dbname(&args.database);

        if let Some(user) = &args.user {
            config.user(user);
        }

        if let Some(password) = &args.password {
            config.password(password);
        }

        Ok(Self { config })
    }

    pub fn from_config(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl tabula_core::Driver for PostgreSQL {
    async fn connect(&self) -> Result<Box<dyn tabula_core::Connection>> {
        let connection = Connection::connect_with_config(self.config.clone(), NoTls).await?;
        Ok(Box::new(connection))
    }
}

#[derive(Debug)]
pub struct Connection {
    client: Client,
    schema: SchemaCache,
    affected_rows: u64,
    last_insert_id: LastInsertId,
}

impl Connection {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            schema: SchemaCache::new(),
            affected_rows: 0,
            last_insert_id: LastInsertId::Unknown,
        }
    }

    /// Connects to a PostgreSQL database using a [`tokio_postgres::Config`].
    pub async fn connect_with_config<T>(config: Config, tls: T) -> Result<Self>
    where
        T: MakeTlsConnect<Socket> + 'static,
        T::Stream: Send,
    {
        let (client, connection) = config.connect(tls).await.map_err(Error::driver)?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "connection error");
            }
        });

        Ok(Self::new(client))
    }

    /// Runs `sql` through the simple query protocol.
    async fn query(&mut self, sql: &str) -> Result<Rows> {
        let messages = self.client.simple_query(sql).await.map_err(Error::driver)?;

        let mut rows = vec![];
        let mut returns_rows = false;
        let mut count = 0;

        for message in messages {
            match message {
                SimpleQueryMessage::Row(row) => {
                    returns_rows = true;
                    rows.push(value::row(&row));
                }
                SimpleQueryMessage::RowDescription(_) => returns_rows = true,
                SimpleQueryMessage::CommandComplete(n) => count = n,
                _ => {}
            }
        }

        self.affected_rows = count;

        if returns_rows {
            Ok(Rows::Values(rows))
        } else {
            Ok(Rows::Count(count))
        }
    }

    async fn query_column(&mut self, sql: &str) -> Result<Vec<String>> {
        Ok(self
            .query(sql)
            .await?
            .into_values()
            .iter()
            .filter_map(|row| row.first().map(|value| value.to_text()))
            .collect())
    }

    /// Reads the session's last sequence value. Fails when no sequence has
    /// been used yet on this connection.
    async fn lastval(&mut self) -> LastInsertId {
        let value = match self.client.simple_query("SELECT lastval()").await {
            Ok(messages) => messages.into_iter().find_map(|message| match message {
                SimpleQueryMessage::Row(row) => row.get(0).and_then(|v| v.parse().ok()),
                _ => None,
            }),
            Err(e) => {
                tracing::debug!(error = %e, "lastval() unavailable");
                None
            }
        };

        value.map_or(LastInsertId::Unknown, LastInsertId::Known)
    }
}

fn is_write(sql: &str) -> bool {
    let verb = sql
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();

    matches!(verb.as_str(), "INSERT" | "UPDATE" | "DELETE" | "REPLACE")
}

#[async_trait]
impl tabula_core::Connection for Connection {
    fn dialect(&self) -> Dialect {
        Dialect::Postgresql
    }

    async fn exec(&mut self, sql: &str) -> Result<Response> {
        if self.schema.observe(sql) {
            tracing::debug!("schema cache invalidated");
        }

        let rows = self.query(sql).await?;

        if is_write(sql) {
            self.last_insert_id = self.lastval().await;
        }

        Ok(Response { rows })
    }

    async fn last_insert_id(&mut self) -> Result<LastInsertId> {
        Ok(self.last_insert_id)
    }

    fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    async fn table_exists(&mut self, table: &str) -> Result<bool> {
        if self.schema.tables().is_none() {
            let tables = self
                .query_column(
                    "SELECT table_name FROM information_schema.tables \
                     WHERE table_schema = current_schema()",
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
            "SELECT column_name, data_type FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = {} \
             ORDER BY ordinal_position",
            Dialect::Postgresql.escape_literal(table)
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
            .query_column("SELECT current_database()")
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();

        self.schema.set_database(database.clone());
        Ok(database)
    }
}
