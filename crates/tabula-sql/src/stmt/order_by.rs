use super::ColumnRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    pub column: ColumnRef,
    pub direction: Direction,
}

impl Direction {
    /// Parses `ASC`/`DESC` in any case; anything else is ascending.
    pub fn parse(s: &str) -> Direction {
        if s.trim().eq_ignore_ascii_case("desc") {
            Direction::Desc
        } else {
            Direction::Asc
        }
    }
}
