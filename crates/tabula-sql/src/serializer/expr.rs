use super::{Comma, Delimited, Formatter, Ident, Period, ToSql};

use crate::stmt;

impl ToSql for &stmt::Expr {
    fn to_sql(self, f: &mut Formatter<'_>) {
        use stmt::Expr::*;

        match self {
            And(expr) => {
                fmt!(f, Delimited(&expr.operands, " AND "));
            }
            BinaryOp(expr) => {
                let lhs = &*expr.lhs;
                let rhs = &*expr.rhs;
                fmt!(f, lhs " " expr.op " " rhs);
            }
            Column(column) => column.to_sql(f),
            Grouped(expr) => {
                let inner: &stmt::Expr = expr;
                fmt!(f, "(" inner ")");
            }
            InList(expr) if expr.list.is_empty() => {
                // `IN ()` is not valid SQL
                if expr.negated {
                    fmt!(f, "1 = 1");
                } else {
                    fmt!(f, "1 = 0");
                }
            }
            InList(expr) => {
                let op = if expr.negated { " NOT IN (" } else { " IN (" };
                fmt!(f, &*expr.expr op Comma(&expr.list) ")");
            }
            Is(expr) => {
                let not = if expr.negated { "NOT " } else { "" };
                let test = match expr.test {
                    stmt::IsTest::Null => "NULL",
                    stmt::IsTest::True => "TRUE",
                    stmt::IsTest::False => "FALSE",
                };
                fmt!(f, &*expr.expr " IS " not test);
            }
            Not(expr) => {
                let inner: &stmt::Expr = expr;
                fmt!(f, "NOT " inner);
            }
            Or(expr) => {
                fmt!(f, Delimited(&expr.operands, " OR "));
            }
            Raw(sql) => fmt!(f, sql),
            Value(value) => value.to_sql(f),
            Xor(expr) if f.serializer.is_mysql() => {
                fmt!(f, Delimited(&expr.operands, " XOR "));
            }
            Xor(expr) => {
                // PostgreSQL has no XOR; compare the boolean operands instead
                fmt!(f, Delimited(expr.operands.iter().map(BoolOperand), " <> "));
            }
        }
    }
}

/// Parenthesizes an operand unless it already is.
struct BoolOperand<'a>(&'a stmt::Expr);

impl ToSql for BoolOperand<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        if self.0.is_grouped() {
            self.0.to_sql(f);
        } else {
            fmt!(f, "(" self.0 ")");
        }
    }
}

impl ToSql for &stmt::ColumnRef {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match &self.table {
            Some(table) => fmt!(f, Period([Ident(table), Ident(&self.column)])),
            None => fmt!(f, Ident(&self.column)),
        }
    }
}

impl ToSql for stmt::BinaryOp {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let mysql = f.serializer.is_mysql();

        f.dst.push_str(match self {
            stmt::BinaryOp::Eq => "=",
            stmt::BinaryOp::Ne => "<>",
            stmt::BinaryOp::Ge => ">=",
            stmt::BinaryOp::Gt => ">",
            stmt::BinaryOp::Le => "<=",
            stmt::BinaryOp::Lt => "<",
            stmt::BinaryOp::Like => "LIKE",
            stmt::BinaryOp::NotLike => "NOT LIKE",
            stmt::BinaryOp::Regexp if mysql => "REGEXP",
            stmt::BinaryOp::Regexp => "~",
            stmt::BinaryOp::NotRegexp if mysql => "NOT REGEXP",
            stmt::BinaryOp::NotRegexp => "!~",
        })
    }
}
