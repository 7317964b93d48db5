//! Custom MiniJinja filters for registration templates

use minijinja::Environment;

/// Register all custom filters with the environment
pub fn register_filters(env: &mut Environment<'_>) {
    env.add_filter("pointer", pointer);
    env.add_filter("quote", quote);
}

/// `*` for pointer receivers, nothing otherwise
fn pointer(is_pointer: bool) -> &'static str {
    if is_pointer {
        "*"
    } else {
        ""
    }
}

/// Double-quoted string literal with JSON-style escapes
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
