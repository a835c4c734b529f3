use std::fmt;

/// The SQL dialects Tabula compiles for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Mysql,
    Postgresql,
}

impl Dialect {
    /// Maps a connection URL scheme onto a dialect.
    pub fn from_scheme(scheme: &str) -> Option<Dialect> {
        match scheme {
            "mysql" => Some(Dialect::Mysql),
            "postgresql" | "postgres" | "pgsql" => Some(Dialect::Postgresql),
            _ => None,
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Dialect::Mysql => 3306,
            Dialect::Postgresql => 5432,
        }
    }

    /// Quotes `text` as a string literal.
    ///
    /// MySQL escapes with backslashes the way `mysql_real_escape_string`
    /// does. PostgreSQL (with `standard_conforming_strings` on) only doubles
    /// single quotes.
    pub fn escape_literal(self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 2);
        out.push('\'');

        match self {
            Dialect::Mysql => {
                for c in text.chars() {
                    match c {
                        '\0' => out.push_str("\\0"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\\' => out.push_str("\\\\"),
                        '\'' => out.push_str("\\'"),
                        '"' => out.push_str("\\\""),
                        '\x1a' => out.push_str("\\Z"),
                        c => out.push(c),
                    }
                }
            }
            Dialect::Postgresql => {
                for c in text.chars() {
                    if c == '\'' {
                        out.push('\'');
                    }
                    out.push(c);
                }
            }
        }

        out.push('\'');
        out
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dialect::Mysql => "mysql",
            Dialect::Postgresql => "postgresql",
        })
    }
}
