use super::{ColumnRef, Expr, Limit, OrderByExpr, SelectItem};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Select {
    pub comment: Option<String>,
    pub distinct: bool,

    /// Projection
    pub returning: Vec<SelectItem>,

    /// Tables listed in the FROM clause
    pub from: Vec<String>,

    pub filter: Option<Expr>,
    pub group_by: Vec<ColumnRef>,
    pub order_by: Vec<OrderByExpr>,
    pub limit: Option<Limit>,
}
