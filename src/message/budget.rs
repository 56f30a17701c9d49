use crate::message::{
    char_len, take_chars, GLYPH_FIRING, GLYPH_LOCATION, GLYPH_RESOLVED, GLYPH_WARNING,
};

/// Maximum adjusted length of one outbound SMS body.
pub const MAX_ADJUSTED_CHARS: usize = 140;

/// Glyphs that cost one extra unit each in the SMS transport. This is a
/// deliberate approximation of UCS-2 segment cost, kept as-is for
/// compatibility with existing consumers.
const WEIGHTED_GLYPHS: &[&str] = &[GLYPH_FIRING, GLYPH_RESOLVED, GLYPH_WARNING, GLYPH_LOCATION];

/// Character count plus one extra unit per weighted glyph occurrence.
pub fn adjusted_len(message: &str) -> usize {
    let glyphs: usize = WEIGHTED_GLYPHS
        .iter()
        .map(|glyph| message.matches(glyph).count())
        .sum();

    char_len(message) + glyphs
}

/// Enforce the SMS character budget, truncating while preserving the
/// leading firing/resolved status prefix. Idempotent.
pub fn budget(message: &str) -> String {
    if adjusted_len(message) <= MAX_ADJUSTED_CHARS {
        return message.to_string();
    }

    if message.starts_with(GLYPH_FIRING) || message.starts_with(GLYPH_RESOLVED) {
        // Keep the glyph prefix, cut only the trailing content
        if let Some(space) = message.find(' ') {
            let (prefix, rest) = message.split_at(space + 1);
            let prefix_chars = char_len(prefix);

            if char_len(rest) > 135usize.saturating_sub(prefix_chars) {
                let keep = 132usize.saturating_sub(prefix_chars);
                return format!("{prefix}{}...", take_chars(rest, keep));
            }

            return message.to_string();
        }
    }

    let cut = take_chars(message, 137);

    // Glyph weight alone can push a short message over budget; with
    // nothing to cut, appending a marker would grow it on every pass
    if char_len(cut) < char_len(message) {
        return format!("{cut}...");
    }

    message.to_string()
}
