pub mod budget;
pub mod compose;
pub mod extract;

pub const GLYPH_FIRING: &str = "🔥";
pub const GLYPH_RESOLVED: &str = "✅";
pub const GLYPH_WARNING: &str = "⚠️";
pub const GLYPH_LOCATION: &str = "📍";

/// Length in characters, not bytes. All SMS budgeting is char-based.
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// First `count` characters of `text`, cut on a char boundary.
pub(crate) fn take_chars(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
