mod compile;

mod filter;
use filter::{Combinator, FilterBuilder, Node};

mod op;
pub use op::{Operand, Operator};

mod scope;
pub(crate) use scope::Scope;

use crate::{Db, Mode, Paging, QueryResult};

use indexmap::IndexSet;
use tabula_core::{schema::table_name, stmt::Value, Error, Result};
use tabula_sql::stmt::Direction;

/// A query against one primary table, built up fluently and run by one of
/// the terminal operations.
///
/// Column references are resolved only when the query runs, so filters may
/// name columns of tables joined by a later [`Query::extend`]. The first
/// error hit while building is kept and returned by every terminal
/// operation.
///
/// ```ignore
/// let mut query = db
///     .query("order")
///     .await
///     .extend("customer")
///     .where_("name", "=", "Ann")
///     .order_by([("placed_at", Direction::Desc)]);
///
/// let orders = query.find_page(&mut db, 1, 20).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    table: String,

    /// `extend()` targets, in path order
    joins: Vec<String>,

    filter: FilterBuilder,
    projection: Vec<Projection>,
    includes: IndexSet<String>,
    order_by: Vec<(String, Direction)>,
    group_by: Vec<String>,

    /// 1-based index of the first row returned
    page_start: Option<u64>,
    page_size: Option<u64>,

    mode: Mode,
    distinct: bool,
    comment: Option<String>,

    /// First error hit while building the query
    error: Option<Error>,

    last_error: Option<Error>,
}

/// One `select()` entry.
#[derive(Debug, Clone, PartialEq)]
enum Projection {
    /// A table (all of its columns) or a column, resolved at compile time
    Name(String),

    /// Projection text emitted as-is
    Raw(String),
}

impl Query {
    pub(crate) fn new(table: String, error: Option<Error>) -> Query {
        Query {
            table,
            joins: vec![],
            filter: FilterBuilder::new(),
            projection: vec![],
            includes: IndexSet::new(),
            order_by: vec![],
            group_by: vec![],
            page_start: None,
            page_size: None,
            mode: Mode::default(),
            distinct: false,
            comment: None,
            last_error: error.clone(),
            error,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// The most recent error, whether from building or running the query.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Joins `table` to the previous `extend()` target (or the primary
    /// table) through their declared relation.
    pub fn extend(mut self, table: &str) -> Self {
        self.joins.push(table_name(table));
        self
    }

    /// Adds a filter leaf, ANDed onto the filter unless preceded by
    /// [`Query::or`], [`Query::xor`] or [`Query::not`].
    ///
    /// `op` is one of `=`, `<>`, `!=`, `>=`, `>`, `<=`, `<`, `IN`, `NOT IN`,
    /// `LIKE`, `NOT LIKE`, `REGEXP`, `NOT REGEXP`, `IS [NOT] NULL`,
    /// `IS [NOT] TRUE` and `IS [NOT] FALSE`. The `IS` tests ignore the
    /// operand; pass `()`.
    pub fn where_(self, column: &str, op: &str, operand: impl Into<Operand>) -> Self {
        match Operator::parse(op) {
            Ok(op) => self.filter(column, op, operand),
            Err(err) => self.fail(err),
        }
    }

    pub fn filter(mut self, column: &str, op: Operator, operand: impl Into<Operand>) -> Self {
        match operand.into().check(column, op) {
            Ok(operand) => {
                self.filter.push(Node::Leaf {
                    column: column.trim().to_string(),
                    op,
                    operand,
                });
                self
            }
            Err(err) => self.fail(err),
        }
    }

    pub fn is_null(self, column: &str) -> Self {
        self.filter(column, Operator::IsNull, ())
    }

    pub fn is_not_null(self, column: &str) -> Self {
        self.filter(column, Operator::IsNotNull, ())
    }

    pub fn is_true(self, column: &str) -> Self {
        self.filter(column, Operator::IsTrue, ())
    }

    pub fn is_false(self, column: &str) -> Self {
        self.filter(column, Operator::IsFalse, ())
    }

    pub fn is_in(self, column: &str, list: impl Into<Operand>) -> Self {
        self.filter(column, Operator::In, list)
    }

    pub fn is_not_in(self, column: &str, list: impl Into<Operand>) -> Self {
        self.filter(column, Operator::NotIn, list)
    }

    /// Adds a raw SQL filter fragment. Each `?` is replaced, in order, by
    /// the matching variable rendered as an escaped literal.
    pub fn raw_where<I, V>(mut self, sql: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.filter.push(Node::Raw {
            sql: sql.to_string(),
            vars: vars.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Combines the previous operand and the next one with AND.
    pub fn and(self) -> Self {
        self.combine(Combinator::And, "and")
    }

    pub fn or(self) -> Self {
        self.combine(Combinator::Or, "or")
    }

    /// Exclusive or. PostgreSQL has no `XOR`; there the operands are compared
    /// with `<>`.
    pub fn xor(self) -> Self {
        self.combine(Combinator::Xor, "xor")
    }

    /// Negates the next operand.
    pub fn not(mut self) -> Self {
        self.filter.not();
        self
    }

    pub fn start_group(mut self) -> Self {
        self.filter.start_group();
        self
    }

    /// Closes the innermost group. The group compiles parenthesized.
    pub fn end_group(mut self) -> Self {
        match self.filter.end_group() {
            Ok(()) => self,
            Err(err) => {
                tracing::warn!(table = %self.table, error = %err, "end_group() failed");
                self.fail(err)
            }
        }
    }

    /// Selects a table (all of its columns) or one column, qualified or
    /// bare. Selecting anything switches the query to row output.
    pub fn select(mut self, name: &str) -> Self {
        self.projection.push(Projection::Name(name.trim().to_string()));
        self
    }

    /// Selects raw projection text, such as `COUNT(*) AS n`.
    pub fn select_raw(mut self, sql: &str) -> Self {
        self.projection.push(Projection::Raw(sql.to_string()));
        self
    }

    /// Materializes a joined table's rows as linked objects.
    pub fn include_table(mut self, table: &str) -> Self {
        self.includes.insert(table_name(table));
        self
    }

    pub fn as_ids(mut self) -> Self {
        self.mode = Mode::Ids;
        self
    }

    pub fn as_rows(mut self) -> Self {
        self.mode = Mode::Rows;
        self
    }

    pub fn as_objects(mut self) -> Self {
        self.mode = Mode::Objects;
        self
    }

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Attaches a comment, emitted as `/* text */` after the command
    /// keyword.
    pub fn comment(mut self, text: &str) -> Self {
        self.comment = Some(text.to_string());
        self
    }

    /// 1-based index of the first row; 0 is treated as 1.
    pub fn offset(mut self, start: u64) -> Self {
        self.page_start = Some(start.max(1));
        self
    }

    pub fn limit(mut self, size: u64) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn order_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = (S, Direction)>,
        S: AsRef<str>,
    {
        self.order_by.extend(
            columns
                .into_iter()
                .map(|(column, direction)| (column.as_ref().trim().to_string(), direction)),
        );
        self
    }

    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.group_by.extend(
            columns
                .into_iter()
                .map(|column| column.as_ref().trim().to_string()),
        );
        self
    }

    /// Runs the query. With paging requested, a `COUNT(*)` pass runs first
    /// to report the total number of matches.
    pub async fn find(&mut self, db: &mut Db) -> Result<QueryResult> {
        let res = self.find_inner(db).await;
        self.track(res)
    }

    /// Runs the query for the page of `size` rows starting at row `start`
    /// (1-based).
    pub async fn find_page(&mut self, db: &mut Db, start: u64, size: u64) -> Result<QueryResult> {
        self.page_start = Some(start.max(1));
        self.page_size = Some(size);
        self.find(db).await
    }

    /// Assigns `fields` on every matching row of the primary table and
    /// returns the number of rows affected.
    pub async fn update<I, K, V>(&mut self, db: &mut Db, fields: I) -> Result<u64>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let fields = collect_fields(fields);
        let res = self.update_inner(db, &fields).await;
        self.track(res)
    }

    /// Deletes every matching row of the primary table and returns the
    /// number of rows deleted.
    pub async fn delete(&mut self, db: &mut Db) -> Result<u64> {
        let res = self.delete_inner(db).await;
        self.track(res)
    }

    /// The SELECT statement [`Query::find`] runs.
    pub async fn select_sql(&mut self, db: &mut Db) -> Result<String> {
        let res = self.select_sql_inner(db).await;
        self.track(res)
    }

    /// The COUNT statement a paged [`Query::find`] runs first.
    pub async fn count_sql(&mut self, db: &mut Db) -> Result<String> {
        let res = self.count_sql_inner(db).await;
        self.track(res)
    }

    pub async fn update_sql<I, K, V>(&mut self, db: &mut Db, fields: I) -> Result<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let fields = collect_fields(fields);
        let res = self.update_sql_inner(db, &fields).await;
        self.track(res)
    }

    pub async fn delete_sql(&mut self, db: &mut Db) -> Result<String> {
        let res = self.delete_sql_inner(db).await;
        self.track(res)
    }

    async fn find_inner(&self, db: &mut Db) -> Result<QueryResult> {
        let scope = self.scope(db).await?;
        let select = self.compile_select(&scope, db)?;

        let total = if self.is_paged() {
            let count = self.compile_count(&scope, db)?;
            let rows = db.query_rows(count).await?;

            let total = match rows.first().and_then(|row| row.first()) {
                Some(total) => total.to_i64()?.max(0) as u64,
                None => 0,
            };

            Some(total)
        } else {
            None
        };

        let rows = db.query_rows(select).await?;
        let total = total.unwrap_or(rows.len() as u64);
        let paging = Paging::new(total, self.page_start, self.page_size);

        QueryResult::materialize(&scope, self.output_mode(), paging, rows)
    }

    async fn update_inner(&self, db: &mut Db, fields: &[(String, Value)]) -> Result<u64> {
        let scope = self.scope(db).await?;
        let update = self.compile_update(&scope, db, fields)?;
        Ok(db.exec_stmt(update).await?.rows.count())
    }

    async fn delete_inner(&self, db: &mut Db) -> Result<u64> {
        let scope = self.scope(db).await?;
        let delete = self.compile_delete(&scope, db)?;
        Ok(db.exec_stmt(delete).await?.rows.count())
    }

    async fn select_sql_inner(&self, db: &mut Db) -> Result<String> {
        let scope = self.scope(db).await?;
        let select = self.compile_select(&scope, db)?;
        Ok(db.serializer().serialize(&select.into()))
    }

    async fn count_sql_inner(&self, db: &mut Db) -> Result<String> {
        let scope = self.scope(db).await?;
        let count = self.compile_count(&scope, db)?;
        Ok(db.serializer().serialize(&count.into()))
    }

    async fn update_sql_inner(&self, db: &mut Db, fields: &[(String, Value)]) -> Result<String> {
        let scope = self.scope(db).await?;
        let update = self.compile_update(&scope, db, fields)?;
        Ok(db.serializer().serialize(&update.into()))
    }

    async fn delete_sql_inner(&self, db: &mut Db) -> Result<String> {
        let scope = self.scope(db).await?;
        let delete = self.compile_delete(&scope, db)?;
        Ok(db.serializer().serialize(&delete.into()))
    }

    async fn scope(&self, db: &mut Db) -> Result<Scope> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        Scope::build(db, &self.table, &self.joins).await
    }

    fn combine(mut self, combinator: Combinator, name: &str) -> Self {
        if !self.filter.binary(combinator) {
            tracing::warn!(table = %self.table, "{name}() has no preceding operand; ignored");
        }
        self
    }

    /// Keeps the first build error.
    fn fail(mut self, err: Error) -> Self {
        self.last_error = Some(err.clone());
        if self.error.is_none() {
            self.error = Some(err);
        }
        self
    }

    fn track<T>(&mut self, res: Result<T>) -> Result<T> {
        if let Err(err) = &res {
            self.last_error = Some(err.clone());
        }
        res
    }
}

fn collect_fields<I, K, V>(fields: I) -> Vec<(String, Value)>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<Value>,
{
    fields
        .into_iter()
        .map(|(column, value)| (column.as_ref().trim().to_string(), value.into()))
        .collect()
}
