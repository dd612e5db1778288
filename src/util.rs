use std::path::Path;

/// Show `path` relative to `base` when it lies inside it.
pub fn display_path(path: &Path, base: Option<&Path>) -> String {
    base.and_then(|base| path.strip_prefix(base).ok())
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Cut `text` to at most `max_bytes`, backing off to a char boundary.
pub fn truncate_string(text: &str, max_bytes: usize) -> String {
    let mut end = text.len().min(max_bytes);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}
