//! RFC 6901 pointer formatting, used to name the location of a sentinel in
//! error messages.

/// Escapes one path component (`~` to `~0`, `/` to `~1`).
pub fn escape_component(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for ch in component.chars() {
        match ch {
            '~' => out.push_str("~0"),
            '/' => out.push_str("~1"),
            other => out.push(other),
        }
    }
    out
}

/// Formats a key path as a JSON pointer. The empty path is the root pointer.
pub fn format_pointer(path: &[String]) -> String {
    let mut out = String::new();
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component));
    }
    out
}
