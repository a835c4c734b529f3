//! Turns result rows into ids, flat rows or a deduplicated object graph.

use crate::{query::Scope, Db, Model};

use indexmap::{IndexMap, IndexSet};
use tabula_core::{stmt::Row, Error, Result};

/// The shape rows are materialized in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// The primary table's id per row
    Ids,

    /// Flat rows keyed by `table:column`
    Rows,

    /// One [`Model`] per distinct `table:id`, linked to the models that
    /// appeared in the same rows
    #[default]
    Objects,
}

/// Page metadata of a query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    /// Number of rows matching the query, ignoring the page window
    pub total: u64,

    /// 1-based index of the page's first row
    pub page_start: u64,

    pub page_size: u64,

    /// 1-based page number
    pub page_num: u64,
}

impl Paging {
    pub(crate) fn new(total: u64, page_start: Option<u64>, page_size: Option<u64>) -> Paging {
        let page_start = page_start.unwrap_or(1).max(1);
        let page_size = page_size.unwrap_or(total);

        let page_num = if page_size == 0 {
            1
        } else {
            (page_start - 1) / page_size + 1
        };

        Paging {
            total,
            page_start,
            page_size,
            page_num,
        }
    }
}

/// Iteration key: the row index for ids and rows, `table:id` for objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Index(usize),
    Object(String),
}

#[derive(Debug, Clone)]
pub enum Item {
    Id(i64),
    Row(Row),
    Object(Model),
}

#[derive(Debug, Clone)]
struct Node {
    model: Model,

    /// Keys of the objects seen in the same rows as this one
    links: IndexSet<String>,
}

#[derive(Debug, Clone)]
enum Payload {
    Ids(Vec<i64>),
    Rows(Vec<Row>),
    Objects {
        nodes: IndexMap<String, Node>,

        /// Primary-table keys in first-seen order
        roots: Vec<String>,
    },
}

/// The materialized result of [`Query::find`](crate::Query::find).
///
/// Iterating walks the ids, the rows or the root objects (those of the
/// primary table) once, front to back; [`QueryResult::rewind`] starts over.
#[derive(Debug, Clone)]
pub struct QueryResult {
    primary: String,
    paging: Paging,
    payload: Payload,
    cursor: usize,
}

impl QueryResult {
    pub(crate) fn materialize(
        scope: &Scope,
        mode: Mode,
        paging: Paging,
        rows: Vec<Row>,
    ) -> Result<QueryResult> {
        let primary = scope.primary();

        let payload = match mode {
            Mode::Ids => {
                let alias = format!("{primary}:{}", scope.pk(primary));

                let ids = rows
                    .iter()
                    .filter_map(|row| row.get(&alias))
                    .map(|id| id.to_i64())
                    .collect::<Result<Vec<_>>>()?;

                Payload::Ids(ids)
            }
            Mode::Rows => Payload::Rows(rows),
            Mode::Objects => objects(scope, &rows)?,
        };

        Ok(QueryResult {
            primary: primary.to_string(),
            paging,
            payload,
            cursor: 0,
        })
    }

    pub fn mode(&self) -> Mode {
        match self.payload {
            Payload::Ids(_) => Mode::Ids,
            Payload::Rows(_) => Mode::Rows,
            Payload::Objects { .. } => Mode::Objects,
        }
    }

    pub fn paging(&self) -> Paging {
        self.paging
    }

    pub fn total(&self) -> u64 {
        self.paging.total
    }

    /// Number of items iteration yields.
    pub fn len(&self) -> usize {
        match &self.payload {
            Payload::Ids(ids) => ids.len(),
            Payload::Rows(rows) => rows.len(),
            Payload::Objects { roots, .. } => roots.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> &[i64] {
        match &self.payload {
            Payload::Ids(ids) => ids,
            _ => &[],
        }
    }

    pub fn rows(&self) -> &[Row] {
        match &self.payload {
            Payload::Rows(rows) => rows,
            _ => &[],
        }
    }

    /// Root objects, in the order their rows came back.
    pub fn objects(&self) -> impl Iterator<Item = &Model> {
        let (nodes, roots) = match &self.payload {
            Payload::Objects { nodes, roots } => (Some(nodes), roots.as_slice()),
            _ => (None, &[][..]),
        };

        roots
            .iter()
            .filter_map(move |key| nodes.and_then(|nodes| nodes.get(key)))
            .map(|node| &node.model)
    }

    /// Any materialized object, root or not, by its `table:id` key.
    pub fn object(&self, key: &str) -> Option<&Model> {
        match &self.payload {
            Payload::Objects { nodes, .. } => nodes.get(key).map(|node| &node.model),
            _ => None,
        }
    }

    /// Number of distinct objects materialized, across all tables.
    pub fn object_count(&self) -> usize {
        match &self.payload {
            Payload::Objects { nodes, .. } => nodes.len(),
            _ => 0,
        }
    }

    /// Objects of `table` that appeared in the same rows as `object`. No
    /// statement is run.
    pub fn related(&self, object: &Model, table: &str) -> Result<Vec<&Model>> {
        let Payload::Objects { nodes, .. } = &self.payload else {
            return Err(Error::invalid_statement(
                "related() needs a result materialized as objects",
            ));
        };

        let key = object.key();

        let Some(node) = nodes.get(&key) else {
            return Err(Error::record_not_found(format!("`{key}` is not part of this result")));
        };

        let prefix = format!("{table}:");

        Ok(node
            .links
            .iter()
            .filter(|link| link.starts_with(&prefix))
            .filter_map(|link| nodes.get(link))
            .map(|node| &node.model)
            .collect())
    }

    /// Restarts iteration.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    pub fn valid(&self) -> bool {
        self.cursor < self.len()
    }

    /// Key of the item the next call to `next()` returns.
    pub fn key(&self) -> Option<Key> {
        if !self.valid() {
            return None;
        }

        Some(match &self.payload {
            Payload::Objects { roots, .. } => Key::Object(roots[self.cursor].clone()),
            _ => Key::Index(self.cursor),
        })
    }

    /// The item the next call to `next()` returns.
    pub fn current(&self) -> Option<Item> {
        let cursor = self.cursor;

        match &self.payload {
            Payload::Ids(ids) => ids.get(cursor).copied().map(Item::Id),
            Payload::Rows(rows) => rows.get(cursor).cloned().map(Item::Row),
            Payload::Objects { nodes, roots } => roots
                .get(cursor)
                .and_then(|key| nodes.get(key))
                .map(|node| Item::Object(node.model.clone())),
        }
    }

    /// Loads the model for the current id of an id-mode result.
    pub async fn fetch(&self, db: &mut Db) -> Result<Option<Model>> {
        let Payload::Ids(ids) = &self.payload else {
            return Err(Error::invalid_statement(
                "fetch() needs a result materialized as ids",
            ));
        };

        match ids.get(self.cursor) {
            Some(id) => Ok(Some(db.create_with_id(&self.primary, *id).await?)),
            None => Ok(None),
        }
    }
}

impl Iterator for QueryResult {
    type Item = (Key, Item);

    fn next(&mut self) -> Option<(Key, Item)> {
        let item = (self.key()?, self.current()?);
        self.cursor += 1;
        Some(item)
    }
}

/// Splits each row into per-table groups, creates one model per
/// `table:id` and links every pair of groups that share a row.
fn objects(scope: &Scope, rows: &[Row]) -> Result<Payload> {
    let primary = scope.primary();
    let mut nodes: IndexMap<String, Node> = IndexMap::new();
    let mut roots = IndexSet::new();

    for row in rows {
        let mut groups: IndexMap<&str, Row> = IndexMap::new();

        for (alias, value) in row.iter() {
            if let Some((table, column)) = alias.split_once(':') {
                groups.entry(table).or_default().insert(column, value.clone());
            }
        }

        let mut keys = vec![];

        for (table, fields) in groups {
            let Some(def) = scope.def(table) else {
                tracing::warn!(table, "no model registered for selected table; group skipped");
                continue;
            };

            let id = match fields.get(def.pk()) {
                Some(id) if !id.is_null() => id.to_i64()?,
                _ => {
                    tracing::warn!(table, "row group has no primary key; skipped");
                    continue;
                }
            };

            let key = format!("{table}:{id}");

            if !nodes.contains_key(&key) {
                let mut model = Model::new(def.clone());
                model.bulk_set(&fields)?;
                nodes.insert(
                    key.clone(),
                    Node {
                        model,
                        links: IndexSet::new(),
                    },
                );
            }

            if table == primary {
                roots.insert(key.clone());
            }

            keys.push(key);
        }

        for key in &keys {
            if let Some(node) = nodes.get_mut(key) {
                node.links
                    .extend(keys.iter().filter(|other| *other != key).cloned());
            }
        }
    }

    Ok(Payload::Objects {
        nodes,
        roots: roots.into_iter().collect(),
    })
}
