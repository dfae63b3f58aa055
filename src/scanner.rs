//! Boundary detection for template blocks inside otherwise-JSON text.
//!
//! The primary strategy lexes the candidate region and pairs open and
//! close tokens by depth; when the lexer rejects the region (partial
//! input during editing), a raw character scan takes over so callers
//! always get an answer.

use crate::lexer::tokenize;
use crate::token::TokenKind;

/// Does a template block (`{{`, `{?` or `{.`) open at byte `index`?
#[must_use]
pub fn is_template_start(text: &str, index: usize) -> bool {
    let bytes = text.as_bytes();
    if bytes.get(index) != Some(&b'{') {
        return false;
    }
    matches!(bytes.get(index + 1), Some(b'{' | b'?' | b'.'))
}

/// Find the exclusive end offset of the template block opening at
/// `start`, scanning no further than `limit`. Returns `None` when the
/// block never closes within the window. A `limit` inside a multibyte
/// character is clamped back to the nearest char boundary.
#[must_use]
pub fn find_template_close(text: &str, start: usize, limit: usize) -> Option<usize> {
    if !is_template_start(text, start) {
        return None;
    }
    let mut limit = limit.min(text.len());
    while !text.is_char_boundary(limit) {
        limit -= 1;
    }
    if start >= limit {
        return None;
    }
    let candidate = &text[start..limit];
    match tokenize(candidate) {
        Ok(tokens) => {
            let mut depth = 0usize;
            for token in &tokens {
                if token.kind.is_open() {
                    depth += 1;
                } else if token.kind == TokenKind::Close {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(start + token.end);
                    }
                }
            }
            None
        }
        Err(_) => find_template_close_fallback(text, start, limit),
    }
}

/// Raw scan pairing `{{`/`{?`/`{.` against `}}` by naive depth
/// counting. Used when the lexer rejects the region.
fn find_template_close_fallback(text: &str, start: usize, limit: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = start;
    while i + 1 < limit {
        if is_template_start(text, i) {
            depth += 1;
            i += 2;
            continue;
        }
        if bytes[i] == b'}' && bytes[i + 1] == b'}' {
            depth = depth.saturating_sub(1);
            i += 2;
            if depth == 0 {
                return Some(i);
            }
            continue;
        }
        i += 1;
    }
    None
}
