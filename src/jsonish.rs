//! Tolerant scanning primitives for JSON-like text.
//!
//! Documents containing template blocks are not valid JSON, so the
//! scope and reference machinery navigates them with balanced-bracket,
//! quote-aware scans instead of a strict parser. All offsets are byte
//! offsets; every delimiter of interest is ASCII.

/// Offset of the closing quote of the string starting at
/// `quote_start`, honouring backslash escapes.
pub(crate) fn find_string_end(text: &str, quote_start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(quote_start + 1) {
        if escaped {
            escaped = false;
            continue;
        }
        if b == b'\\' {
            escaped = true;
            continue;
        }
        if b == b'"' {
            return Some(i);
        }
    }
    None
}

/// Offset of the bracket matching the `open` at `start_index`,
/// skipping over quoted strings.
pub(crate) fn find_matching_bracket(
    text: &str,
    start_index: usize,
    open: u8,
    close: u8,
) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 1usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start_index + 1) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        if b == b'"' {
            in_string = true;
        } else if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// First occurrence of `expected` at or after `from`.
pub(crate) fn find_next_byte(text: &str, from: usize, expected: u8) -> Option<usize> {
    text.as_bytes()
        .iter()
        .enumerate()
        .skip(from)
        .find(|&(_, &b)| b == expected)
        .map(|(i, _)| i)
}

/// First non-whitespace offset in `[from, to)`.
pub(crate) fn next_non_ws(text: &str, from: usize, to: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    (from..to.min(bytes.len())).find(|&i| !bytes[i].is_ascii_whitespace())
}

/// Skip whitespace and commas, returning the first offset in
/// `[from, to)` that is neither.
pub(crate) fn skip_ws_and_commas(text: &str, from: usize, to: usize) -> usize {
    let bytes = text.as_bytes();
    let to = to.min(bytes.len());
    let mut i = from;
    while i < to && (bytes[i].is_ascii_whitespace() || bytes[i] == b',') {
        i += 1;
    }
    i
}

/// Exclusive end of the JSON value starting at `value_start`: a
/// balanced object/array span, a string span, or a scalar run ending
/// at `,`, `}`, or `]`.
pub(crate) fn json_value_end(text: &str, value_start: usize, limit: usize) -> usize {
    let bytes = text.as_bytes();
    let limit = limit.min(bytes.len());
    if value_start >= limit {
        return value_start;
    }
    match bytes[value_start] {
        b'{' => find_matching_bracket(text, value_start, b'{', b'}')
            .map_or(value_start, |end| (end + 1).min(limit)),
        b'[' => find_matching_bracket(text, value_start, b'[', b']')
            .map_or(value_start, |end| (end + 1).min(limit)),
        b'"' => {
            find_string_end(text, value_start).map_or(value_start, |end| (end + 1).min(limit))
        }
        _ => {
            let mut i = value_start;
            while i < limit && !matches!(bytes[i], b',' | b'}' | b']') {
                i += 1;
            }
            i
        }
    }
}
