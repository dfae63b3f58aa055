//! Reference resolution: from an identifier occurrence and a usage
//! offset to the span where the name was declared.
//!
//! Resolution priority, first match wins:
//!
//! 1. range binding whose value scope contains the usage
//! 2. named `switch`/`range` definition (inline in a template block,
//!    or bound by a `"definitions"` expression key)
//! 3. nested definition path (dotted reference into definition
//!    objects)
//! 4. flat `"definitions"` key string
//!
//! When nothing matches the identifier is context-bound: the host
//! supplies it at render time, so callers treat that as an answer,
//! not an error.

use crate::jsonish;
use crate::lexer::{tokenize, tokenize_expression};
use crate::scanner;
use crate::scope::{
    find_definitions_array, next_non_text_until, prev_non_text,
};
use crate::token::{Keyword, Token, TokenKind};

/// One matched `Open…Close` pair. `start`/`end` are absolute byte
/// offsets; the token indices point into the stream the range was
/// built from. Ranges may nest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRange {
    pub open_token_index: usize,
    pub close_token_index: usize,
    pub start: usize,
    pub end: usize,
}

/// Byte span of the token that declares a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Definition {
    pub start: usize,
    pub end: usize,
}

/// Outcome of [`find_declaration`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The name is declared in the document at this span.
    Declaration(Definition),
    /// The name is bound by the caller's render context, not the
    /// document.
    ContextBound { name: String },
}

/// Pair up open and close tokens into template ranges.
#[must_use]
pub fn build_template_ranges(tokens: &[Token]) -> Vec<TemplateRange> {
    let mut ranges = Vec::new();
    let mut stack = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        if token.kind.is_open() {
            stack.push(i);
        } else if token.kind == TokenKind::Close {
            if let Some(open_index) = stack.pop() {
                ranges.push(TemplateRange {
                    open_token_index: open_index,
                    close_token_index: i,
                    start: tokens[open_index].start,
                    end: token.end,
                });
            }
        }
    }
    ranges
}

/// The innermost template range containing `offset`.
#[must_use]
pub fn enclosing_template(ranges: &[TemplateRange], offset: usize) -> Option<&TemplateRange> {
    ranges
        .iter()
        .filter(|r| offset >= r.start && offset < r.end)
        .max_by_key(|r| r.start)
}

/// Index of the identifier token under `offset` within `range`.
#[must_use]
pub fn identifier_at(tokens: &[Token], range: &TemplateRange, offset: usize) -> Option<usize> {
    (range.open_token_index + 1..range.close_token_index).find(|&i| {
        tokens[i].kind == TokenKind::Ident && offset >= tokens[i].start && offset < tokens[i].end
    })
}

/// Walk back through `ident . ident . …` to the start of the dotted
/// chain the clicked segment belongs to.
fn path_root(tokens: &[Token], range: &TemplateRange, ident_index: usize) -> usize {
    let mut idx = ident_index;
    loop {
        let Some(dot) = prev_non_text(tokens, idx.wrapping_sub(1)) else {
            return idx;
        };
        if dot <= range.open_token_index || tokens[dot].kind != TokenKind::Dot {
            return idx;
        }
        let Some(prev_ident) = prev_non_text(tokens, dot.wrapping_sub(1)) else {
            return idx;
        };
        if prev_ident <= range.open_token_index || tokens[prev_ident].kind != TokenKind::Ident {
            return idx;
        }
        idx = prev_ident;
    }
}

/// The name a clicked identifier refers to: the root of its lookup
/// path. A bare identifier or a direct click on a declaration site is
/// its own root.
#[must_use]
pub fn reference_at(tokens: &[Token], range: &TemplateRange, ident_index: usize) -> Option<String> {
    let root = path_root(tokens, range, ident_index);
    Some(tokens[root].lexeme.clone())
}

/// The dotted chain from the path root through the clicked segment,
/// for nested definition lookup. `None` when the identifier is a bare
/// name with no dot anywhere around it.
#[must_use]
pub fn reference_path(
    tokens: &[Token],
    range: &TemplateRange,
    ident_index: usize,
) -> Option<Vec<String>> {
    let root = path_root(tokens, range, ident_index);
    let leading_dot = prev_non_text(tokens, root.wrapping_sub(1))
        .is_some_and(|dot| dot > range.open_token_index && tokens[dot].kind == TokenKind::Dot);
    if !leading_dot && root == ident_index {
        return None;
    }
    let mut path = vec![tokens[root].lexeme.clone()];
    let mut idx = root;
    while idx < ident_index {
        let dot = next_non_text_until(tokens, idx + 1, range.close_token_index)?;
        if tokens[dot].kind != TokenKind::Dot {
            return None;
        }
        let next = next_non_text_until(tokens, dot + 1, range.close_token_index)?;
        if tokens[next].kind != TokenKind::Ident {
            return None;
        }
        path.push(tokens[next].lexeme.clone());
        idx = next;
    }
    Some(path)
}

/// Resolve `reference` (used at `usage_offset`) to its declaration
/// span, applying the priority order in the module docs.
#[must_use]
pub fn resolve(
    text: &str,
    tokens: &[Token],
    ranges: &[TemplateRange],
    reference: &str,
    reference_path: Option<&[String]>,
    usage_offset: usize,
) -> Option<Definition> {
    if let Some(binding) = best_range_binding(text, tokens, ranges, reference, usage_offset) {
        return Some(binding);
    }
    if let Some(named) = best_named_definition(text, tokens, ranges, reference, usage_offset) {
        return Some(named);
    }
    if let Some(path) = reference_path {
        if !path.is_empty() {
            if let Some(nested) = definitions_path_definition(text, path, usage_offset) {
                return Some(nested);
            }
        }
    }
    definitions_key_definition(text, reference, usage_offset)
}

/// Tokenize, locate the identifier under `offset`, and resolve it in
/// one step. `None` when the text does not lex or no identifier sits
/// at the offset.
#[must_use]
pub fn find_declaration(text: &str, offset: usize) -> Option<Resolution> {
    let tokens = tokenize(text).ok()?;
    let ranges = build_template_ranges(&tokens);
    let enclosing = enclosing_template(&ranges, offset)?;
    let ident = identifier_at(&tokens, enclosing, offset)?;
    let path = reference_path(&tokens, enclosing, ident);
    let reference = reference_at(&tokens, enclosing, ident)?;
    resolve(text, &tokens, &ranges, &reference, path.as_deref(), offset).map_or_else(
        || Some(Resolution::ContextBound { name: reference }),
        |definition| Some(Resolution::Declaration(definition)),
    )
}

/// Step 1: range bindings whose value scope contains the usage; the
/// closest declaration before the usage wins.
fn best_range_binding(
    text: &str,
    tokens: &[Token],
    ranges: &[TemplateRange],
    reference: &str,
    usage_offset: usize,
) -> Option<Definition> {
    let mut best: Option<Definition> = None;
    for range in ranges {
        for i in range.open_token_index + 1..range.close_token_index {
            if !tokens[i].is_keyword(Keyword::Range) {
                continue;
            }
            let Some((item, index)) = range_binding_window(tokens, range, i) else {
                continue;
            };
            let bound = if tokens[item].lexeme == reference {
                Some(item)
            } else {
                index.filter(|&j| tokens[j].lexeme == reference)
            };
            let Some(binding) = bound.map(|j| &tokens[j]) else {
                continue;
            };
            if binding.start > usage_offset {
                continue;
            }
            let Some((scope_start, scope_end)) = definition_value_scope(text, range.end) else {
                continue;
            };
            if usage_offset < scope_start || usage_offset >= scope_end {
                continue;
            }
            if best.is_none_or(|b| binding.start >= b.start) {
                best = Some(Definition {
                    start: binding.start,
                    end: binding.end,
                });
            }
        }
    }
    best
}

/// Token indices of the item (and optional index) bindings of the
/// `range` keyword at `kw_index`, validated by the trailing `of`.
fn range_binding_window(
    tokens: &[Token],
    range: &TemplateRange,
    kw_index: usize,
) -> Option<(usize, Option<usize>)> {
    let close = range.close_token_index;
    let item = next_non_text_until(tokens, kw_index + 1, close)?;
    if tokens[item].kind != TokenKind::Ident {
        return None;
    }
    let after = next_non_text_until(tokens, item + 1, close)?;
    if tokens[after].kind == TokenKind::Comma {
        let index = next_non_text_until(tokens, after + 1, close)?;
        if tokens[index].kind != TokenKind::Ident {
            return None;
        }
        let of = next_non_text_until(tokens, index + 1, close)?;
        if !tokens[of].is_keyword(Keyword::Of) {
            return None;
        }
        Some((item, Some(index)))
    } else if tokens[after].is_keyword(Keyword::Of) {
        Some((item, None))
    } else {
        None
    }
}

/// Step 2: named `switch`/`range` definitions, meaning `IDENT KEYWORD`
/// pairs inside template blocks and names bound by `"definitions"`
/// expression keys. Most recent declaration before the usage wins.
fn best_named_definition(
    text: &str,
    tokens: &[Token],
    ranges: &[TemplateRange],
    reference: &str,
    usage_offset: usize,
) -> Option<Definition> {
    let mut best: Option<Definition> = None;
    let mut consider = |start: usize, end: usize| {
        if start <= usage_offset && best.is_none_or(|b| start >= b.start) {
            best = Some(Definition { start, end });
        }
    };

    for range in ranges {
        for i in range.open_token_index + 1..range.close_token_index {
            if tokens[i].kind != TokenKind::Ident || tokens[i].lexeme != reference {
                continue;
            }
            let Some(next) = next_non_text_until(tokens, i + 1, range.close_token_index) else {
                continue;
            };
            if tokens[next].is_keyword(Keyword::Switch) || tokens[next].is_keyword(Keyword::Range) {
                consider(tokens[i].start, tokens[i].end);
            }
        }
    }

    for (key_start, key_end) in definitions_expression_keys(text) {
        let key = &text[key_start..key_end];
        let Ok(key_tokens) = tokenize_expression(key) else {
            continue;
        };
        for (i, token) in key_tokens.iter().enumerate() {
            if token.kind != TokenKind::Ident || token.lexeme != reference {
                continue;
            }
            let Some(next) = next_non_text_until(&key_tokens, i + 1, key_tokens.len()) else {
                continue;
            };
            if key_tokens[next].is_keyword(Keyword::Switch)
                || key_tokens[next].is_keyword(Keyword::Range)
            {
                consider(key_start + token.start, key_start + token.end);
            }
        }
    }

    best
}

/// Content spans of every string key in the `"definitions"` array's
/// objects.
fn definitions_expression_keys(text: &str) -> Vec<(usize, usize)> {
    let mut keys = Vec::new();
    let Some((array_start, array_end)) = find_definitions_array(text) else {
        return keys;
    };
    let bytes = text.as_bytes();
    let mut i = array_start + 1;
    while i < array_end {
        if bytes[i] != b'"' {
            i += 1;
            continue;
        }
        let Some(string_end) = jsonish::find_string_end(text, i) else {
            break;
        };
        let colon = jsonish::next_non_ws(text, string_end + 1, array_end);
        if colon.is_some_and(|c| bytes[c] == b':') {
            keys.push((i + 1, string_end));
        }
        i = string_end + 1;
    }
    keys
}

/// The JSON value a definition's template block maps to: skip forward
/// from the block's end to the `:` on the same line, then capture a
/// balanced object/array span or a comma/line-delimited scalar span.
/// Braces inside strings or nested template blocks do not count.
fn definition_value_scope(text: &str, template_end: usize) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let length = bytes.len();
    let mut i = template_end;
    while i < length && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    while i < length && !matches!(bytes[i], b':' | b'\n' | b'\r') {
        i += 1;
    }
    if i >= length || bytes[i] != b':' {
        return None;
    }
    i += 1;
    while i < length && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if i >= length {
        return None;
    }

    let start = i;
    let open = bytes[i];
    if open != b'{' && open != b'[' {
        let mut end = i;
        while end < length && !matches!(bytes[end], b',' | b'\n' | b'\r') {
            end += 1;
        }
        return Some((start, end));
    }

    let close = if open == b'{' { b'}' } else { b']' };
    let mut depth = 1usize;
    let mut in_string = false;
    let mut escaped = false;
    i += 1;
    while i < length {
        let b = bytes[i];
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        if scanner::is_template_start(text, i) {
            match scanner::find_template_close(text, i, length) {
                Some(after) => {
                    i = after;
                    continue;
                }
                None => return None,
            }
        }
        if b == b'"' {
            in_string = true;
        } else if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some((start, i + 1));
            }
        }
        i += 1;
    }
    None
}

/// Step 3: walk the `"definitions"` array's objects depth-first,
/// matching each path segment against nested object keys.
fn definitions_path_definition(
    text: &str,
    path: &[String],
    usage_offset: usize,
) -> Option<Definition> {
    let (array_start, array_end) = find_definitions_array(text)?;
    let bytes = text.as_bytes();

    let mut best_prior: Option<Definition> = None;
    let mut first: Option<Definition> = None;
    let mut i = array_start + 1;
    while i < array_end {
        i = jsonish::skip_ws_and_commas(text, i, array_end);
        if i >= array_end {
            break;
        }
        let value_end = jsonish::json_value_end(text, i, array_end);
        if value_end <= i {
            break;
        }
        if bytes[i] == b'{' {
            if let Some(found) = key_path_in_object(text, i, value_end, path) {
                if first.is_none() {
                    first = Some(found);
                }
                if found.start <= usage_offset
                    && best_prior.is_none_or(|b| found.start > b.start)
                {
                    best_prior = Some(found);
                }
            }
        }
        i = value_end;
    }
    best_prior.or(first)
}

fn key_path_in_object(
    text: &str,
    object_start: usize,
    object_end: usize,
    path: &[String],
) -> Option<Definition> {
    let (segment, rest) = path.split_first()?;
    let bytes = text.as_bytes();
    let mut i = object_start + 1;
    while i < object_end {
        i = jsonish::skip_ws_and_commas(text, i, object_end);
        if i >= object_end || bytes[i] == b'}' {
            break;
        }
        if bytes[i] != b'"' {
            i += 1;
            continue;
        }

        let key_end = jsonish::find_string_end(text, i)?;
        if key_end >= object_end {
            break;
        }
        let key = &text[i + 1..key_end];
        let Some(colon) = jsonish::next_non_ws(text, key_end + 1, object_end) else {
            break;
        };
        if bytes[colon] != b':' {
            i = key_end + 1;
            continue;
        }

        let value_start = jsonish::next_non_ws(text, colon + 1, object_end)?;
        let value_end = jsonish::json_value_end(text, value_start, object_end);
        if value_end <= value_start {
            break;
        }

        if key == segment {
            if rest.is_empty() {
                return Some(Definition {
                    start: i + 1,
                    end: key_end,
                });
            }
            if bytes[value_start] == b'{' {
                if let Some(nested) = key_path_in_object(text, value_start, value_end, rest) {
                    return Some(nested);
                }
            }
        }

        i = value_end;
    }
    None
}

/// Step 4: exact string match against `"definitions"` keys; closest
/// preceding entry wins.
fn definitions_key_definition(
    text: &str,
    reference: &str,
    usage_offset: usize,
) -> Option<Definition> {
    let (array_start, array_end) = find_definitions_array(text)?;
    let bytes = text.as_bytes();

    let mut best: Option<Definition> = None;
    let mut i = array_start + 1;
    while i < array_end {
        if bytes[i] != b'"' {
            i += 1;
            continue;
        }
        let Some(string_end) = jsonish::find_string_end(text, i) else {
            break;
        };
        let key = &text[i + 1..string_end];
        let colon = jsonish::next_non_ws(text, string_end + 1, array_end);
        if colon.is_some_and(|c| bytes[c] == b':') && key == reference && i + 1 <= usage_offset {
            best = Some(Definition {
                start: i + 1,
                end: string_end,
            });
        }
        i = string_end + 1;
    }
    best
}

/// Human-readable preview of a definition for navigation popups: the
/// value after the key's colon when it sits on the same line, else the
/// key span itself. Abbreviated.
#[must_use]
pub fn definition_preview(text: &str, definition: &Definition) -> String {
    let fallback = abbreviate(text[definition.start..definition.end].trim(), 200);
    let bytes = text.as_bytes();
    let scan_limit = (definition.end..text.len())
        .find(|&i| matches!(bytes[i], b'\n' | b'\r'))
        .unwrap_or(text.len());
    let Some(colon) = jsonish::find_next_byte(text, definition.end, b':') else {
        return fallback;
    };
    if colon >= scan_limit {
        return fallback;
    }
    let Some(value_start) = jsonish::next_non_ws(text, colon + 1, text.len()) else {
        return fallback;
    };
    let value_end = jsonish::json_value_end(text, value_start, text.len());
    if value_end <= value_start {
        return fallback;
    }
    abbreviate(text[value_start..value_end].trim(), 220)
}

fn abbreviate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let kept: String = value.chars().take(max_chars.saturating_sub(3)).collect();
    kept + "..."
}
