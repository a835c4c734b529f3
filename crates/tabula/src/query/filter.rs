//! Builds the filter tree from the fluent `where_`/`or`/`not`/group calls.
//!
//! Each group is a frame holding the operand completed so far and a stack
//! of operators waiting for their right-hand operand. Pushing an operand
//! reduces every pending operator of the frame, then ANDs the result onto
//! the frame's operand.

use super::{Operand, Operator};

use tabula_core::{stmt::Value, Error, Result};

/// A filter tree node. Column references stay unresolved until the query
/// is compiled.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Leaf {
        column: String,
        op: Operator,
        operand: Operand,
    },
    Raw {
        sql: String,
        vars: Vec<Value>,
    },
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Xor(Box<Node>, Box<Node>),
    Not(Box<Node>),
    Grouped(Box<Node>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, PartialEq)]
enum Pending {
    Not,
    Binary(Combinator, Node),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Frame {
    operand: Option<Node>,
    pending: Vec<Pending>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FilterBuilder {
    /// The root frame is always present.
    frames: Vec<Frame>,
}

impl Combinator {
    fn combine(self, lhs: Node, rhs: Node) -> Node {
        let (lhs, rhs) = (Box::new(lhs), Box::new(rhs));

        match self {
            Combinator::And => Node::And(lhs, rhs),
            Combinator::Or => Node::Or(lhs, rhs),
            Combinator::Xor => Node::Xor(lhs, rhs),
        }
    }
}

impl FilterBuilder {
    pub(crate) fn new() -> FilterBuilder {
        FilterBuilder {
            frames: vec![Frame::default()],
        }
    }

    fn frame(&mut self) -> &mut Frame {
        let len = self.frames.len();
        &mut self.frames[len - 1]
    }

    /// Adds a completed operand to the current group.
    pub(crate) fn push(&mut self, mut node: Node) {
        let frame = self.frame();

        while let Some(pending) = frame.pending.pop() {
            node = match pending {
                Pending::Not => Node::Not(Box::new(node)),
                Pending::Binary(combinator, lhs) => combinator.combine(lhs, node),
            };
        }

        frame.operand = Some(match frame.operand.take() {
            Some(operand) => Node::And(Box::new(operand), Box::new(node)),
            None => node,
        });
    }

    /// Turns the last completed operand into the left side of `combinator`.
    /// Returns `false` when there is no operand to combine.
    pub(crate) fn binary(&mut self, combinator: Combinator) -> bool {
        let frame = self.frame();

        match frame.operand.take() {
            Some(lhs) => {
                frame.pending.push(Pending::Binary(combinator, lhs));
                true
            }
            None => false,
        }
    }

    pub(crate) fn not(&mut self) {
        self.frame().pending.push(Pending::Not);
    }

    pub(crate) fn start_group(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Closes the innermost group and pushes it onto the enclosing one as a
    /// single grouped operand. Empty groups vanish.
    pub(crate) fn end_group(&mut self) -> Result<()> {
        if self.frames.len() == 1 {
            return Err(Error::invalid_statement("end_group() without start_group()"));
        }

        if !self.frame().pending.is_empty() {
            return Err(Error::invalid_statement(
                "end_group() on an incomplete expression; an operator is missing its operand",
            ));
        }

        let Some(frame) = self.frames.pop() else {
            return Ok(());
        };

        if let Some(operand) = frame.operand {
            self.push(Node::Grouped(Box::new(operand)));
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.frames.len() == 1 && self.frames[0].operand.is_none() && self.frames[0].pending.is_empty()
    }

    /// The finished tree, or an error if a group or operator is left open.
    pub(crate) fn finish(&self) -> Result<Option<&Node>> {
        if self.frames.len() > 1 {
            return Err(Error::invalid_statement(format!(
                "{} group(s) left open",
                self.frames.len() - 1
            )));
        }

        let root = &self.frames[0];

        if !root.pending.is_empty() {
            return Err(Error::invalid_statement(
                "filter ends with an operator that is missing its operand",
            ));
        }

        Ok(root.operand.as_ref())
    }
}

impl Default for FilterBuilder {
    fn default() -> FilterBuilder {
        FilterBuilder::new()
    }
}
