mod column_ref;
pub use column_ref::ColumnRef;

mod delete;
pub use delete::Delete;

mod expr;
pub use expr::{
    BinaryOp, Expr, ExprAnd, ExprBinaryOp, ExprInList, ExprIs, ExprOr, ExprXor, IsTest,
};

mod insert;
pub use insert::Insert;

mod limit;
pub use limit::Limit;

mod order_by;
pub use order_by::{Direction, OrderByExpr};

mod select;
pub use select::Select;

mod select_item;
pub use select_item::SelectItem;

mod update;
pub use update::{Assignment, Update};

pub use tabula_core::stmt::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Delete(Delete),
    Insert(Insert),
    Select(Select),
    Update(Update),
}

impl Statement {
    pub fn is_select(&self) -> bool {
        matches!(self, Statement::Select(_))
    }

    /// Returns `true` for statements that change rows.
    pub fn is_write(&self) -> bool {
        !self.is_select()
    }
}

impl From<Delete> for Statement {
    fn from(value: Delete) -> Self {
        Statement::Delete(value)
    }
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Statement::Insert(value)
    }
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Statement::Select(value)
    }
}

impl From<Update> for Statement {
    fn from(value: Update) -> Self {
        Statement::Update(value)
    }
}
