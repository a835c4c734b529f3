use tabula_core::{stmt::Value, Error, Result};
use tabula_sql::stmt::{BinaryOp, IsTest};

use std::{fmt, str::FromStr};

/// A filter operator accepted by [`Query::where_`](crate::Query::where_).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Ge,
    Gt,
    Le,
    Lt,
    In,
    NotIn,
    Like,
    NotLike,
    Regexp,
    NotRegexp,
    IsNull,
    IsNotNull,
    IsTrue,
    IsNotTrue,
    IsFalse,
    IsNotFalse,
}

/// How a leaf compiles, by operator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperatorKind {
    Binary(BinaryOp),
    List { negated: bool },
    Is { test: IsTest, negated: bool },
}

impl Operator {
    /// Parses an operator, ignoring case and surplus whitespace. `!=` is
    /// accepted as a synonym of `<>`.
    pub fn parse(op: &str) -> Result<Operator> {
        let normalized = op
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();

        Ok(match normalized.as_str() {
            "=" => Operator::Eq,
            "<>" | "!=" => Operator::Ne,
            ">=" => Operator::Ge,
            ">" => Operator::Gt,
            "<=" => Operator::Le,
            "<" => Operator::Lt,
            "IN" => Operator::In,
            "NOT IN" => Operator::NotIn,
            "LIKE" => Operator::Like,
            "NOT LIKE" => Operator::NotLike,
            "REGEXP" => Operator::Regexp,
            "NOT REGEXP" => Operator::NotRegexp,
            "IS NULL" => Operator::IsNull,
            "IS NOT NULL" => Operator::IsNotNull,
            "IS TRUE" => Operator::IsTrue,
            "IS NOT TRUE" => Operator::IsNotTrue,
            "IS FALSE" => Operator::IsFalse,
            "IS NOT FALSE" => Operator::IsNotFalse,
            _ => {
                return Err(Error::invalid_statement(format!(
                    "unsupported operator `{}`",
                    op.trim()
                )))
            }
        })
    }

    /// Operators that take no operand.
    pub fn is_unary(self) -> bool {
        matches!(self.kind(), OperatorKind::Is { .. })
    }

    /// Operators that take a list operand.
    pub fn is_list(self) -> bool {
        matches!(self.kind(), OperatorKind::List { .. })
    }

    pub(crate) fn kind(self) -> OperatorKind {
        use Operator::*;

        match self {
            Eq => OperatorKind::Binary(BinaryOp::Eq),
            Ne => OperatorKind::Binary(BinaryOp::Ne),
            Ge => OperatorKind::Binary(BinaryOp::Ge),
            Gt => OperatorKind::Binary(BinaryOp::Gt),
            Le => OperatorKind::Binary(BinaryOp::Le),
            Lt => OperatorKind::Binary(BinaryOp::Lt),
            Like => OperatorKind::Binary(BinaryOp::Like),
            NotLike => OperatorKind::Binary(BinaryOp::NotLike),
            Regexp => OperatorKind::Binary(BinaryOp::Regexp),
            NotRegexp => OperatorKind::Binary(BinaryOp::NotRegexp),
            In => OperatorKind::List { negated: false },
            NotIn => OperatorKind::List { negated: true },
            IsNull => OperatorKind::Is {
                test: IsTest::Null,
                negated: false,
            },
            IsNotNull => OperatorKind::Is {
                test: IsTest::Null,
                negated: true,
            },
            IsTrue => OperatorKind::Is {
                test: IsTest::True,
                negated: false,
            },
            IsNotTrue => OperatorKind::Is {
                test: IsTest::True,
                negated: true,
            },
            IsFalse => OperatorKind::Is {
                test: IsTest::False,
                negated: false,
            },
            IsNotFalse => OperatorKind::Is {
                test: IsTest::False,
                negated: true,
            },
        }
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Operator> {
        Operator::parse(s)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Operator::*;

        f.write_str(match self {
            Eq => "=",
            Ne => "<>",
            Ge => ">=",
            Gt => ">",
            Le => "<=",
            Lt => "<",
            In => "IN",
            NotIn => "NOT IN",
            Like => "LIKE",
            NotLike => "NOT LIKE",
            Regexp => "REGEXP",
            NotRegexp => "NOT REGEXP",
            IsNull => "IS NULL",
            IsNotNull => "IS NOT NULL",
            IsTrue => "IS TRUE",
            IsNotTrue => "IS NOT TRUE",
            IsFalse => "IS FALSE",
            IsNotFalse => "IS NOT FALSE",
        })
    }
}

/// The right-hand side of a filter leaf.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Operand {
    /// No operand, for the `IS` tests.
    #[default]
    None,
    Value(Value),
    List(Vec<Value>),
}

impl Operand {
    /// Checks the operand against the operator's arity. A single value is
    /// accepted as a one-element list.
    pub(crate) fn check(self, column: &str, op: Operator) -> Result<Operand> {
        match (op.kind(), self) {
            (OperatorKind::Is { .. }, _) => Ok(Operand::None),
            (OperatorKind::List { .. }, Operand::Value(value)) => Ok(Operand::List(vec![value])),
            (OperatorKind::List { .. }, list @ Operand::List(_)) => Ok(list),
            (OperatorKind::Binary(_), value @ Operand::Value(_)) => Ok(value),
            (_, operand) => Err(Error::invalid_statement(format!(
                "`{column} {op}` cannot take {}",
                match operand {
                    Operand::None => "an empty operand",
                    Operand::Value(_) => "a single value",
                    Operand::List(_) => "a list",
                }
            ))),
        }
    }
}

impl From<()> for Operand {
    fn from(_: ()) -> Operand {
        Operand::None
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Operand {
        Operand::Value(value)
    }
}

macro_rules! impl_operand {
    ( $( $ty:ty ),* ) => {
        $(
            impl From<$ty> for Operand {
                fn from(value: $ty) -> Operand {
                    Operand::Value(value.into())
                }
            }

            impl From<Vec<$ty>> for Operand {
                fn from(list: Vec<$ty>) -> Operand {
                    Operand::List(list.into_iter().map(Value::from).collect())
                }
            }

            impl<const N: usize> From<[$ty; N]> for Operand {
                fn from(list: [$ty; N]) -> Operand {
                    Operand::List(list.into_iter().map(Value::from).collect())
                }
            }
        )*
    };
}

impl_operand!(bool, i32, i64, u32, f64, &str, String);

impl From<Vec<Value>> for Operand {
    fn from(list: Vec<Value>) -> Operand {
        Operand::List(list)
    }
}
