//! Structural reindenter for JSON-like documents with embedded
//! template blocks.
//!
//! Works on bracket depth alone: existing whitespace is dropped and
//! re-synthesized, while quoted strings and template blocks are copied
//! verbatim so their contents never perturb the layout. The result is
//! deterministic and idempotent.

use crate::jsonish;
use crate::scanner;

/// Reformat `text` with `indent_width` spaces per nesting level
/// (values below 1 are clamped to 1).
///
/// Opening an object or array starts a new indented line unless the
/// container is empty; commas break lines; colons become `": "`.
#[must_use]
pub fn reformat(text: &str, indent_width: usize) -> String {
    if text.is_empty() {
        return String::new();
    }
    let step = indent_width.max(1);
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len() + 32);
    let mut level = 0usize;
    // per open bracket: did it add an indent level?
    let mut indent_applied: Vec<bool> = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if !b.is_ascii() {
            let next = next_char_boundary(text, i);
            out.push_str(&text[i..next]);
            i = next;
            continue;
        }
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if b == b'"' {
            i = copy_string(text, i, &mut out);
            continue;
        }
        if scanner::is_template_start(text, i) {
            i = copy_template_block(text, i, &mut out);
            continue;
        }
        match b {
            b'{' | b'[' => {
                out.push(char::from(b));
                let close = if b == b'{' { b'}' } else { b']' };
                let next = jsonish::next_non_ws(text, i + 1, text.len());
                if next.is_none_or(|n| bytes[n] == close) {
                    indent_applied.push(false);
                } else {
                    indent_applied.push(true);
                    level += 1;
                    push_newline_with_indent(&mut out, level, step);
                }
            }
            b'}' | b']' => {
                if indent_applied.pop().unwrap_or(false) {
                    level = level.saturating_sub(1);
                    push_newline_if_needed(&mut out);
                    push_indent(&mut out, level, step);
                }
                out.push(char::from(b));
            }
            b',' => {
                out.push(',');
                push_newline_with_indent(&mut out, level, step);
            }
            b':' => out.push_str(": "),
            _ => out.push(char::from(b)),
        }
        i += 1;
    }
    out
}

fn next_char_boundary(text: &str, from: usize) -> usize {
    let mut next = from + 1;
    while next < text.len() && !text.is_char_boundary(next) {
        next += 1;
    }
    next
}

/// Copy a quoted string verbatim; an unterminated string runs to the
/// end of the text.
fn copy_string(text: &str, from: usize, out: &mut String) -> usize {
    match jsonish::find_string_end(text, from) {
        Some(end) => {
            out.push_str(&text[from..=end]);
            end + 1
        }
        None => {
            out.push_str(&text[from..]);
            text.len()
        }
    }
}

/// Copy a template block verbatim; an unterminated block runs to the
/// end of the text.
fn copy_template_block(text: &str, from: usize, out: &mut String) -> usize {
    match scanner::find_template_close(text, from, text.len()) {
        Some(end) => {
            out.push_str(&text[from..end]);
            end
        }
        None => {
            out.push_str(&text[from..]);
            text.len()
        }
    }
}

fn push_newline_if_needed(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn push_newline_with_indent(out: &mut String, level: usize, step: usize) {
    push_newline_if_needed(out);
    push_indent(out, level, step);
}

fn push_indent(out: &mut String, level: usize, step: usize) {
    for _ in 0..level * step {
        out.push(' ');
    }
}
