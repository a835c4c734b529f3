pub mod db;
pub use db::Db;

mod model;
pub use model::Model;

pub mod query;
pub use query::{Operand, Operator, Query};

mod registry;
pub use registry::Registry;

pub mod relation;
pub use relation::{JoinHop, RelationKeys};

pub mod result;
pub use result::{Item, Key, Mode, Paging, QueryResult};

mod schema;
pub use schema::ModelDef;

pub use tabula_core::{
    bail,
    driver::Dialect,
    err,
    schema::{FieldType, RelationKind, RelationOptions},
    stmt::{Row, Value},
    Error, Result,
};
pub use tabula_sql::stmt::Direction;
