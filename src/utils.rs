//! Shared text-surgery helpers.
//!
//! All offsets in this crate are byte offsets into the original file text.
//! The passes that rewrite markup rely on splices being exact insertions or
//! same-length replacements, so every other offset in the file stays valid.

/// Remove `count` bytes at `index` and insert `add` in their place.
///
/// `splice_string(text, i, 0, add)` is the pure insertion used by the markup
/// injector: `text[..i] + add + text[i..]`.
pub fn splice_string(text: &str, index: usize, count: usize, add: &str) -> String {
    let mut out = String::with_capacity(text.len() - count + add.len());
    out.push_str(&text[..index]);
    out.push_str(add);
    out.push_str(&text[index + count..]);
    out
}

/// Convert a byte offset into a 1-based (line, column) pair.
pub fn offset_to_line_col(text: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(text.len());
    let before = &text[..offset];
    let line = before.bytes().filter(|b| *b == b'\n').count() + 1;
    let col = match before.rfind('\n') {
        Some(i) => before[i + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, col)
}

/// The full source line containing the given byte offset, without its
/// trailing newline.
pub fn line_at_offset(text: &str, offset: usize) -> &str {
    let offset = offset.min(text.len());
    let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = text[start..].find('\n').map_or(text.len(), |i| start + i);
    &text[start..end]
}
