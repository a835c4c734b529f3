use super::{ColumnRef, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// AND a set of expressions
    And(ExprAnd),

    /// Binary comparison or pattern match
    BinaryOp(ExprBinaryOp),

    /// Reference to a column
    Column(ColumnRef),

    /// A sub-expression the user grouped explicitly; always parenthesized
    Grouped(Box<Expr>),

    /// `expr [NOT] IN (list)`
    InList(ExprInList),

    /// `expr IS [NOT] NULL|TRUE|FALSE`
    Is(ExprIs),

    /// Negation
    Not(Box<Expr>),

    /// OR a set of expressions
    Or(ExprOr),

    /// SQL text emitted as-is
    Raw(String),

    /// A literal
    Value(Value),

    /// Exclusive OR of a set of expressions
    Xor(ExprXor),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprAnd {
    pub operands: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprOr {
    pub operands: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprXor {
    pub operands: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprBinaryOp {
    pub lhs: Box<Expr>,
    pub op: BinaryOp,
    pub rhs: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Ge,
    Gt,
    Le,
    Lt,
    Like,
    NotLike,
    Regexp,
    NotRegexp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprInList {
    pub expr: Box<Expr>,
    pub list: Vec<Value>,
    pub negated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprIs {
    pub expr: Box<Expr>,
    pub test: IsTest,
    pub negated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsTest {
    Null,
    True,
    False,
}

impl Expr {
    pub fn column(column: impl Into<ColumnRef>) -> Expr {
        Expr::Column(column.into())
    }

    pub fn value(value: impl Into<Value>) -> Expr {
        Expr::Value(value.into())
    }

    pub fn raw(sql: impl Into<String>) -> Expr {
        Expr::Raw(sql.into())
    }

    pub fn binary_op(lhs: impl Into<Expr>, op: BinaryOp, rhs: impl Into<Expr>) -> Expr {
        Expr::BinaryOp(ExprBinaryOp {
            lhs: Box::new(lhs.into()),
            op,
            rhs: Box::new(rhs.into()),
        })
    }

    pub fn eq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        Expr::binary_op(lhs, BinaryOp::Eq, rhs)
    }

    pub fn in_list(expr: impl Into<Expr>, list: Vec<Value>, negated: bool) -> Expr {
        Expr::InList(ExprInList {
            expr: Box::new(expr.into()),
            list,
            negated,
        })
    }

    pub fn is(expr: impl Into<Expr>, test: IsTest, negated: bool) -> Expr {
        Expr::Is(ExprIs {
            expr: Box::new(expr.into()),
            test,
            negated,
        })
    }

    /// ANDs two expressions, flattening ungrouped conjunctions.
    pub fn and(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        let mut operands = vec![];
        for expr in [lhs.into(), rhs.into()] {
            match expr {
                Expr::And(and) => operands.extend(and.operands),
                expr => operands.push(expr),
            }
        }
        Expr::And(ExprAnd { operands })
    }

    /// ANDs all expressions together. Returns `None` for an empty input.
    pub fn and_all(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
        exprs.into_iter().reduce(Expr::and)
    }

    pub fn or(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        let mut operands = vec![];
        for expr in [lhs.into(), rhs.into()] {
            match expr {
                Expr::Or(or) => operands.extend(or.operands),
                expr => operands.push(expr),
            }
        }
        Expr::Or(ExprOr { operands })
    }

    pub fn xor(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        let mut operands = vec![];
        for expr in [lhs.into(), rhs.into()] {
            match expr {
                Expr::Xor(xor) => operands.extend(xor.operands),
                expr => operands.push(expr),
            }
        }
        Expr::Xor(ExprXor { operands })
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: impl Into<Expr>) -> Expr {
        Expr::Not(Box::new(expr.into()))
    }

    /// Marks the expression as explicitly grouped. Grouping twice is a no-op.
    pub fn grouped(expr: impl Into<Expr>) -> Expr {
        match expr.into() {
            expr @ Expr::Grouped(_) => expr,
            expr => Expr::Grouped(Box::new(expr)),
        }
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self, Expr::Grouped(_))
    }

    /// Returns `true` for OR/XOR at the top level, which bind looser than a
    /// surrounding AND.
    pub fn is_disjunction(&self) -> bool {
        matches!(self, Expr::Or(_) | Expr::Xor(_))
    }
}

impl From<ColumnRef> for Expr {
    fn from(value: ColumnRef) -> Self {
        Expr::Column(value)
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Value(value)
    }
}
