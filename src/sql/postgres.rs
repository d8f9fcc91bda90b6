//! PostgreSQL literal formatting.
//!
//! The one dialect this crate targets. Identifiers are emitted bare; only
//! literals need dialect-specific treatment.

/// Quote a string literal: `\` and `'` are doubled, then the whole value is
/// wrapped in single quotes.
pub fn quote_string(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('\'', "''");
    format!("'{}'", escaped)
}

/// Format a boolean literal.
pub fn format_bool(b: bool) -> &'static str {
    if b {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// Format an integer literal.
pub fn format_int(n: i64) -> String {
    n.to_string()
}

/// Format a float literal.
///
/// # Panics
///
/// NaN and infinities have no SQL literal form.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        panic!("cannot serialize NaN to SQL")
    }
    if f.is_infinite() {
        panic!("cannot serialize Infinity to SQL")
    }
    let mut buffer = ryu::Buffer::new();
    buffer.format(f).to_string()
}
