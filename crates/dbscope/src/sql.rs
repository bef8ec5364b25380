//! SQL text helpers shared by all readers and DDL builders.
//!
//! Catalog identifiers cannot be bound as statement parameters, so the
//! readers assemble their predicates as text. Everything that touches
//! quoting, escaping or pattern compilation goes through this module.

/// Check whether a name pattern contains a SQL wildcard.
///
/// Both `%` and `_` count; a pattern without either compiles to an
/// exact `=` predicate.
pub fn has_wildcard(pattern: &str) -> bool {
    pattern.contains('%') || pattern.contains('_')
}

/// Escape a SQL string literal value.
/// Doubles single quotes: `O'Brien` -> `O''Brien`
pub fn escape_literal(s: &str) -> String {
    s.replace('\'', "''")
}

/// Compile a name pattern into a predicate on `column`.
///
/// A pattern containing a wildcard becomes a `LIKE` predicate with the
/// dialect's escape clause (`escape` comes from the driver metadata);
/// anything else becomes an exact `=` comparison.
pub fn name_predicate(column: &str, pattern: &str, escape: &str) -> String {
    if has_wildcard(pattern) {
        if escape.is_empty() {
            format!("{} LIKE '{}'", column, escape_literal(pattern))
        } else {
            format!(
                "{} LIKE '{}' ESCAPE '{}'",
                column,
                escape_literal(pattern),
                escape_literal(escape)
            )
        }
    } else {
        format!("{} = '{}'", column, escape_literal(pattern))
    }
}

/// Strip one level of identifier quoting, if present.
///
/// Returns the inner name and whether the input was quoted. Quoted
/// identifiers keep their case; unquoted ones are folded by the
/// connection wrapper.
pub fn clean_quotes(name: &str) -> (&str, bool) {
    let trimmed = name.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        (&trimmed[1..trimmed.len() - 1], true)
    } else {
        (trimmed, false)
    }
}

/// Quote an identifier the DB2/standard way when it needs quoting.
///
/// Names that are already plain uppercase identifiers are left alone;
/// anything with lowercase letters or special characters is wrapped in
/// double quotes with internal quotes doubled.
pub fn quote_ident(name: &str) -> String {
    let needs_quoting = name.is_empty()
        || name
            .chars()
            .any(|c| !(c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'))
        || name.chars().next().is_some_and(|c| c.is_ascii_digit());
    if needs_quoting {
        format!("\"{}\"", name.replace('"', "\"\""))
    } else {
        name.to_string()
    }
}

/// Fully qualified `schema.name` with quoting applied per part.
pub fn qualify(schema: &str, name: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(name))
}
