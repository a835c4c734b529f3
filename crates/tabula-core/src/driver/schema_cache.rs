use indexmap::{IndexMap, IndexSet};

/// Column name to database type name, in table order.
pub type Columns = IndexMap<String, String>;

/// Schema facts a connection has already looked up: the current database
/// name, the table list and per-table column lists.
///
/// The cache is owned by the connection. It is invalidated by DDL seen
/// through [`SchemaCache::observe`] (creating or dropping a table or a
/// database). Ordinary writes never invalidate it, so a table created or
/// altered through another connection stays invisible until this connection
/// runs DDL of its own.
#[derive(Debug, Default)]
pub struct SchemaCache {
    database: Option<String>,
    tables: Option<IndexSet<String>>,
    columns: IndexMap<String, Columns>,
}

impl SchemaCache {
    pub fn new() -> SchemaCache {
        SchemaCache::default()
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn set_database(&mut self, name: impl Into<String>) {
        self.database = Some(name.into());
    }

    pub fn tables(&self) -> Option<&IndexSet<String>> {
        self.tables.as_ref()
    }

    pub fn set_tables(&mut self, tables: impl IntoIterator<Item = String>) {
        self.tables = Some(tables.into_iter().collect());
    }

    pub fn columns(&self, table: &str) -> Option<&Columns> {
        self.columns.get(table)
    }

    pub fn set_columns(&mut self, table: impl Into<String>, columns: Columns) {
        self.columns.insert(table.into(), columns);
    }

    /// Drops every cached fact.
    pub fn invalidate(&mut self) {
        self.database = None;
        self.tables = None;
        self.columns.clear();
    }

    /// Inspects a statement about to run and invalidates the cache if it is
    /// DDL that changes the table or database list. Returns `true` when the
    /// cache was invalidated.
    pub fn observe(&mut self, sql: &str) -> bool {
        if is_schema_ddl(sql) {
            self.invalidate();
            true
        } else {
            false
        }
    }
}

fn is_schema_ddl(sql: &str) -> bool {
    let mut words = sql.split_whitespace().map(|word| word.to_ascii_uppercase());

    let Some(verb) = words.next() else {
        return false;
    };

    if verb != "CREATE" && verb != "DROP" {
        return false;
    }

    for word in words.take(3) {
        match word.as_str() {
            "TABLE" | "DATABASE" | "SCHEMA" => return true,
            "TEMPORARY" | "TEMP" | "UNLOGGED" | "OR" | "REPLACE" => continue,
            _ => return false,
        }
    }

    false
}
