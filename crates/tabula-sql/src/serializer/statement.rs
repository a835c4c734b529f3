use super::{Alias, Comma, Formatter, Ident, ToSql};

use crate::stmt;

impl ToSql for &stmt::Statement {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            stmt::Statement::Delete(stmt) => stmt.to_sql(f),
            stmt::Statement::Insert(stmt) => stmt.to_sql(f),
            stmt::Statement::Select(stmt) => stmt.to_sql(f),
            stmt::Statement::Update(stmt) => stmt.to_sql(f),
        }
    }
}

/// `/* text */ ` following the command keyword.
struct Comment<'a>(&'a Option<String>);

impl ToSql for Comment<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        if let Some(comment) = self.0 {
            let comment = comment.replace("/*", "").replace("*/", "");
            fmt!(f, "/* " comment.trim() " */ ");
        }
    }
}

struct Filter<'a>(&'a Option<stmt::Expr>);

impl ToSql for Filter<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        if let Some(expr) = self.0 {
            fmt!(f, " WHERE " expr);
        }
    }
}

impl ToSql for &stmt::Delete {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let table = Ident(&self.table);
        let comment = Comment(&self.comment);
        let filter = Filter(&self.filter);

        if self.using.is_empty() {
            fmt!(f, "DELETE " comment "FROM " table filter);
        } else if f.serializer.is_mysql() {
            let tables = Comma(std::iter::once(&self.table).chain(&self.using).map(Ident));
            fmt!(f, "DELETE " comment table ".* FROM " tables filter);
        } else {
            let using = Comma(self.using.iter().map(Ident));
            fmt!(f, "DELETE " comment "FROM " table " USING " using filter);
        }
    }
}

impl ToSql for &stmt::Insert {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let table = Ident(&self.table);
        let comment = Comment(&self.comment);

        if self.columns.is_empty() {
            if f.serializer.is_mysql() {
                fmt!(f, "INSERT " comment "INTO " table " () VALUES ()");
            } else {
                fmt!(f, "INSERT " comment "INTO " table " DEFAULT VALUES");
            }
            return;
        }

        let columns = Comma(self.columns.iter().map(Ident));
        let values = Comma(&self.values);

        fmt!(f, "INSERT " comment "INTO " table " (" columns ") VALUES (" values ")");
    }
}

impl ToSql for &stmt::Update {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let table = Ident(&self.table);
        let comment = Comment(&self.comment);
        let filter = Filter(&self.filter);

        if f.serializer.is_mysql() {
            // MySQL names every table up front and qualifies the assignments
            let tables = Comma(std::iter::once(&self.table).chain(&self.from).map(Ident));
            let assignments = Comma(self.assignments.iter().map(|assignment| {
                let column = stmt::ColumnRef::new(&self.table, &assignment.column);
                (QualifiedAssignment(column), &assignment.value)
            }));

            fmt!(f, "UPDATE " comment tables " SET " assignments filter);
        } else {
            let assignments = Comma(&self.assignments);
            let from = if self.from.is_empty() {
                None
            } else {
                Some((" FROM ", Comma(self.from.iter().map(Ident))))
            };

            fmt!(f, "UPDATE " comment table " SET " assignments from filter);
        }
    }
}

struct QualifiedAssignment(stmt::ColumnRef);

impl ToSql for QualifiedAssignment {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, &self.0 " = ");
    }
}

impl ToSql for &stmt::Assignment {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let value = &self.value;
        fmt!(f, Ident(&self.column) " = " value);
    }
}

impl ToSql for &stmt::Select {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let comment = Comment(&self.comment);
        let distinct = if self.distinct { "DISTINCT " } else { "" };
        let returning = Comma(&self.returning);

        fmt!(f, "SELECT " comment distinct returning);

        if !self.from.is_empty() {
            fmt!(f, " FROM " Comma(self.from.iter().map(Ident)));
        }

        fmt!(f, Filter(&self.filter));

        if !self.group_by.is_empty() {
            fmt!(f, " GROUP BY " Comma(&self.group_by));
        }

        if !self.order_by.is_empty() {
            fmt!(f, " ORDER BY " Comma(&self.order_by));
        }

        if let Some(limit) = &self.limit {
            limit.to_sql(f);
        }
    }
}

impl ToSql for &stmt::SelectItem {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            stmt::SelectItem::Wildcard(None) => fmt!(f, "*"),
            stmt::SelectItem::Wildcard(Some(table)) => fmt!(f, Ident(table) ".*"),
            stmt::SelectItem::Column { column, alias } => {
                fmt!(f, column alias.as_ref().map(|alias| (" AS ", Alias(alias))));
            }
            stmt::SelectItem::Count { alias } => {
                fmt!(f, "COUNT(*) AS " Ident(alias));
            }
            stmt::SelectItem::Raw(sql) => fmt!(f, sql),
        }
    }
}

impl ToSql for &stmt::OrderByExpr {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let direction = match self.direction {
            stmt::Direction::Asc => " ASC",
            stmt::Direction::Desc => " DESC",
        };
        fmt!(f, &self.column direction);
    }
}

impl ToSql for &stmt::Limit {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match (self.offset, self.limit) {
            (None, None) => {}
            (None, Some(limit)) => fmt!(f, " LIMIT " limit),
            (Some(offset), Some(limit)) if f.serializer.is_mysql() => {
                fmt!(f, " LIMIT " offset "," limit);
            }
            // MySQL has no OFFSET without LIMIT; use the largest row count
            (Some(offset), None) if f.serializer.is_mysql() => {
                fmt!(f, " LIMIT " offset "," u64::MAX);
            }
            (Some(offset), Some(limit)) => fmt!(f, " LIMIT " limit " OFFSET " offset),
            (Some(offset), None) => fmt!(f, " OFFSET " offset),
        }
    }
}
