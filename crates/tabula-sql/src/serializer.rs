#[macro_use]
mod fmt;
use fmt::ToSql;

mod delim;
use delim::{Comma, Delimited, Period};

mod flavor;
use flavor::Flavor;

mod ident;
use ident::{Alias, Ident};

// Fragment serializers
mod expr;
mod statement;
mod value;

use crate::stmt::Statement;

use tabula_core::Dialect;

/// Serialize a statement to a SQL string
#[derive(Debug, Clone, Copy)]
pub struct Serializer {
    /// The database flavor handles the differences between SQL dialects and
    /// supported features.
    flavor: Flavor,
}

struct Formatter<'a> {
    /// Handle to the serializer
    serializer: &'a Serializer,

    /// Where to write the serialized SQL
    dst: &'a mut String,
}

impl Serializer {
    pub fn for_dialect(dialect: Dialect) -> Serializer {
        match dialect {
            Dialect::Mysql => Serializer::mysql(),
            Dialect::Postgresql => Serializer::postgresql(),
        }
    }

    pub fn serialize(&self, stmt: &Statement) -> String {
        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
        };

        stmt.to_sql(&mut fmt);

        ret.push(';');
        ret
    }

    /// Serializes a single expression, without a trailing `;`.
    pub fn serialize_expr(&self, expr: &crate::stmt::Expr) -> String {
        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
        };

        expr.to_sql(&mut fmt);
        ret
    }

    pub fn dialect(&self) -> Dialect {
        match self.flavor {
            Flavor::Mysql => Dialect::Mysql,
            Flavor::Postgresql => Dialect::Postgresql,
        }
    }
}
