use super::{Formatter, ToSql};

/// A table or column name. Plain names are emitted as-is; reserved words and
/// names with other characters are quoted for the target flavor.
pub(super) struct Ident<S>(pub(super) S);

/// A column alias, emitted double-quoted.
pub(super) struct Alias<S>(pub(super) S);

/// Words reserved by MySQL or PostgreSQL that can collide with table or
/// column names. Sorted for binary search.
const RESERVED: &[&str] = &[
    "all", "alter", "analyze", "and", "any", "as", "asc", "between", "both", "by", "case",
    "cast", "check", "collate", "column", "constraint", "create", "cross", "current_date",
    "current_time", "current_timestamp", "current_user", "default", "delete", "desc",
    "distinct", "div", "drop", "else", "end", "except", "exists", "false", "fetch", "for",
    "foreign", "from", "full", "grant", "group", "groups", "having", "in", "index", "inner",
    "insert", "intersect", "interval", "into", "is", "join", "key", "keys", "leading", "left",
    "like", "limit", "lock", "match", "mod", "natural", "not", "null", "offset", "on", "only",
    "option", "or", "order", "outer", "over", "primary", "range", "rank", "references",
    "regexp", "rename", "replace", "right", "row", "rows", "select", "set", "some", "table",
    "then", "to", "trailing", "true", "union", "unique", "update", "usage", "user", "using",
    "values", "when", "where", "window", "with", "xor",
];

fn needs_quotes(name: &str) -> bool {
    let mut chars = name.chars();

    let plain = match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {
            chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        }
        _ => false,
    };

    !plain || RESERVED.binary_search(&name).is_ok()
}

impl<S: AsRef<str>> ToSql for Ident<S> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let name = self.0.as_ref();

        if !needs_quotes(name) {
            f.dst.push_str(name);
            return;
        }

        let quote = if f.serializer.is_mysql() { '`' } else { '"' };

        f.dst.push(quote);
        for c in name.chars() {
            if c == quote {
                f.dst.push(quote);
            }
            f.dst.push(c);
        }
        f.dst.push(quote);
    }
}

impl<S: AsRef<str>> ToSql for Alias<S> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        f.dst.push('"');
        for c in self.0.as_ref().chars() {
            if c == '"' {
                f.dst.push('"');
            }
            f.dst.push(c);
        }
        f.dst.push('"');
    }
}
