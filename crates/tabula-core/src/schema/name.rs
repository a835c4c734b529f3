/// Normalizes a table name as written by callers: surrounding whitespace is
/// trimmed and the name is lowercased.
pub fn table_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Canonical form used to match a table name against the model registry:
/// lowercased, with spaces and underscores removed.
pub fn canonical_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Registry key for the model factory of `name`, e.g. `race_event` →
/// `model_raceevent`.
pub fn factory_key(name: &str) -> String {
    format!("model_{}", canonical_name(name))
}

/// Table names must start with a lowercase letter followed by lowercase
/// letters, digits or underscores.
pub fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
