//! Static scope analysis over a token sequence: which names are
//! declared locally, which are range bindings, and what role each
//! identifier occurrence plays.
//!
//! Every query here is best-effort. Malformed input yields empty sets
//! or `None`, never an error, because these calls back live-editing
//! features.

use std::collections::BTreeSet;

use crate::jsonish;
use crate::lexer::tokenize_expression;
use crate::token::{Keyword, Token, TokenKind};

/// Role of an identifier occurrence inside a template expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Member of the keyword vocabulary.
    Keyword,
    /// Built-in or piped function reference.
    FunctionCall,
    /// Name bound by `<name> switch …` or `<name> range …`.
    DefinitionName,
    /// Item or index name bound by a `range … of …` form.
    RangeBindingName,
    /// Root variable not bound locally; supplied by the render
    /// context.
    ContextVariable,
}

/// Names in scope at a point in the token stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeContext {
    /// Keys of the top-level `"definitions"` array.
    pub local_definitions: BTreeSet<String>,
    /// Range bindings still active at the query point.
    pub range_bindings: BTreeSet<String>,
}

impl ScopeContext {
    /// Scope state valid at `upto_index` (exclusive of later
    /// declarations).
    #[must_use]
    pub fn at(text: &str, tokens: &[Token], upto_index: usize) -> Self {
        Self {
            local_definitions: local_definitions(text),
            range_bindings: range_bindings(tokens, upto_index),
        }
    }
}

/// Collect the locally-declared names from the document's top-level
/// `"definitions"` array.
///
/// Keys that are plain identifiers declare themselves; expression keys
/// (`"row range items"`, `"kind switch .type"`) declare the identifier
/// in front of the `range`/`switch` keyword. Unparseable documents
/// yield an empty set.
#[must_use]
pub fn local_definitions(text: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let Some((array_start, array_end)) = find_definitions_array(text) else {
        return names;
    };

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
        if text.as_bytes()[i] == b'{' {
            collect_object_keys(text, i, value_end, &mut names);
        }
        i = value_end;
    }
    names
}

/// Locate the `[` … `]` span of the `"definitions"` array.
pub(crate) fn find_definitions_array(text: &str) -> Option<(usize, usize)> {
    let key_index = text.find("\"definitions\"")?;
    let array_start = jsonish::find_next_byte(text, key_index + 13, b'[')?;
    let array_end = jsonish::find_matching_bracket(text, array_start, b'[', b']')?;
    Some((array_start, array_end))
}

fn collect_object_keys(
    text: &str,
    object_start: usize,
    object_end: usize,
    names: &mut BTreeSet<String>,
) {
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
        let Some(key_end) = jsonish::find_string_end(text, i) else {
            break;
        };
        if key_end >= object_end {
            break;
        }
        let key = &text[i + 1..key_end];
        let colon = jsonish::next_non_ws(text, key_end + 1, object_end);
        if colon.is_some_and(|c| bytes[c] == b':') {
            if is_identifier(key) {
                names.insert(key.to_string());
            } else {
                for name in definition_names_in_key(key) {
                    names.insert(name);
                }
            }
        }
        let Some(value_start) =
            colon.and_then(|c| jsonish::next_non_ws(text, c + 1, object_end))
        else {
            break;
        };
        let value_end = jsonish::json_value_end(text, value_start, object_end);
        if value_end <= value_start {
            break;
        }
        i = value_end;
    }
}

/// Lex an expression key and pull out every identifier standing in
/// front of a `range` or `switch` keyword.
#[must_use]
pub fn definition_names_in_key(key: &str) -> Vec<String> {
    let Ok(tokens) = tokenize_expression(key) else {
        return Vec::new();
    };
    let mut names = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::Ident {
            continue;
        }
        let Some(next) = next_non_text(&tokens, i + 1) else {
            continue;
        };
        if tokens[next].is_keyword(Keyword::Range) || tokens[next].is_keyword(Keyword::Switch) {
            names.push(token.lexeme.clone());
        }
    }
    names
}

/// Range bindings (`range item[, index] of …`) active at
/// `upto_index`. A binding lives from its declaration to the `Close`
/// of its template block.
#[must_use]
pub fn range_bindings(tokens: &[Token], upto_index: usize) -> BTreeSet<String> {
    let upto = upto_index.min(tokens.len());
    let mut depth = 0usize;
    let mut active: Vec<(String, usize)> = Vec::new();

    let mut i = 0;
    while i < upto {
        let token = &tokens[i];
        if token.kind.is_open() {
            depth += 1;
        } else if token.kind == TokenKind::Close {
            depth = depth.saturating_sub(1);
            active.retain(|&(_, d)| d <= depth);
        } else if token.is_keyword(Keyword::Range) {
            if let Some(item) = next_non_text_until(tokens, i + 1, upto) {
                if tokens[item].kind == TokenKind::Ident {
                    active.push((tokens[item].lexeme.clone(), depth));
                    if let Some(comma) = next_non_text_until(tokens, item + 1, upto) {
                        if tokens[comma].kind == TokenKind::Comma {
                            if let Some(index) = next_non_text_until(tokens, comma + 1, upto) {
                                if tokens[index].kind == TokenKind::Ident {
                                    active.push((tokens[index].lexeme.clone(), depth));
                                }
                            }
                        }
                    }
                }
            }
        }
        i += 1;
    }

    active.into_iter().map(|(name, _)| name).collect()
}

/// Classify the identifier at `ident_index`. `None` means the
/// occurrence is a non-root path segment or otherwise unremarkable.
#[must_use]
pub fn classify(tokens: &[Token], ident_index: usize, scope: &ScopeContext) -> Option<Role> {
    let token = tokens.get(ident_index)?;
    if token.kind == TokenKind::Keyword || Keyword::from_lexeme(&token.lexeme).is_some() {
        return Some(Role::Keyword);
    }
    if token.kind != TokenKind::Ident {
        return None;
    }
    if is_definition_name(tokens, ident_index) {
        return Some(Role::DefinitionName);
    }
    if is_range_binding_name(tokens, ident_index) {
        return Some(Role::RangeBindingName);
    }
    if is_function_call(tokens, ident_index) {
        return Some(Role::FunctionCall);
    }
    if is_root_variable(tokens, ident_index)
        && !scope.local_definitions.contains(&token.lexeme)
        && !scope.range_bindings.contains(&token.lexeme)
    {
        return Some(Role::ContextVariable);
    }
    None
}

/// Is the identifier the declaration site of a named `switch`/`range`
/// definition?
#[must_use]
pub fn is_definition_name(tokens: &[Token], ident_index: usize) -> bool {
    let Some(next) = next_non_text(tokens, ident_index + 1) else {
        return false;
    };
    tokens[next].is_keyword(Keyword::Switch) || tokens[next].is_keyword(Keyword::Range)
}

/// Is the identifier an item/index binding site of a `range` form?
#[must_use]
pub fn is_range_binding_name(tokens: &[Token], ident_index: usize) -> bool {
    let Some(prev) = prev_non_text(tokens, ident_index.wrapping_sub(1)) else {
        return false;
    };
    if tokens[prev].is_keyword(Keyword::Range) {
        return true;
    }
    if tokens[prev].kind != TokenKind::Comma {
        return false;
    }
    let Some(before_comma) = prev_non_text(tokens, prev.wrapping_sub(1)) else {
        return false;
    };
    if tokens[before_comma].kind != TokenKind::Ident {
        return false;
    }
    prev_non_text(tokens, before_comma.wrapping_sub(1))
        .is_some_and(|i| tokens[i].is_keyword(Keyword::Range))
}

/// Function-call detection: piped (`| fn`), called (`fn(`), or part
/// of a `namespace::name` / piped `namespace:name` pair.
#[must_use]
pub fn is_function_call(tokens: &[Token], ident_index: usize) -> bool {
    if prev_non_text(tokens, ident_index.wrapping_sub(1))
        .is_some_and(|i| tokens[i].kind == TokenKind::Pipe)
    {
        return true;
    }
    if let Some(next) = next_non_text(tokens, ident_index + 1) {
        if tokens[next].kind == TokenKind::LParen {
            return true;
        }
        if tokens[next].kind == TokenKind::Colon {
            return match next_non_text(tokens, next + 1) {
                // namespace side of `ns::name`
                Some(after) if tokens[after].kind == TokenKind::Colon => true,
                // namespace side of a piped `ns:name`
                Some(after) if tokens[after].kind == TokenKind::Ident => {
                    is_piped_identifier(tokens, ident_index)
                }
                _ => false,
            };
        }
    }
    if let Some(prev) = prev_non_text(tokens, ident_index.wrapping_sub(1)) {
        if tokens[prev].kind == TokenKind::Colon {
            let Some(before) = prev_non_text(tokens, prev.wrapping_sub(1)) else {
                return false;
            };
            if tokens[before].kind == TokenKind::Colon {
                // name side of `ns::name`
                return prev_non_text(tokens, before.wrapping_sub(1))
                    .is_some_and(|i| tokens[i].kind == TokenKind::Ident);
            }
            if tokens[before].kind == TokenKind::Ident {
                // name side of a piped `ns:name`
                return is_piped_identifier(tokens, before);
            }
        }
    }
    false
}

fn is_piped_identifier(tokens: &[Token], ident_index: usize) -> bool {
    if tokens.get(ident_index).is_none_or(|t| t.kind != TokenKind::Ident) {
        return false;
    }
    prev_non_text(tokens, ident_index.wrapping_sub(1))
        .is_some_and(|i| tokens[i].kind == TokenKind::Pipe)
}

/// Root-variable test: the identifier starts a lookup path rather
/// than continuing one. In both `.a.b.c` and `a.b.c` only `a` is a
/// root; a preceding `.` disqualifies the identifier only when that
/// dot itself follows an identifier.
#[must_use]
pub fn is_root_variable(tokens: &[Token], ident_index: usize) -> bool {
    let Some(prev) = prev_non_text(tokens, ident_index.wrapping_sub(1)) else {
        return true;
    };
    if tokens[prev].kind != TokenKind::Dot {
        return true;
    }
    prev_non_text(tokens, prev.wrapping_sub(1))
        .is_none_or(|before| tokens[before].kind != TokenKind::Ident)
}

/// Root variables referenced before `upto_index` that are bound
/// neither locally nor by a range; most recent first, deduplicated.
/// Feeds dotted-path completion.
#[must_use]
pub fn recent_context_variables(
    tokens: &[Token],
    upto_index: usize,
    scope: &ScopeContext,
) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut result = Vec::new();
    let upto = upto_index.min(tokens.len());
    for i in (0..upto).rev() {
        let token = &tokens[i];
        if token.kind != TokenKind::Ident {
            continue;
        }
        if classify(tokens, i, scope) != Some(Role::ContextVariable) {
            continue;
        }
        if seen.insert(token.lexeme.clone()) {
            result.push(token.lexeme.clone());
        }
    }
    result
}

/// Split the function token under the caret into
/// `(namespace, partial_name)`. The token is the run of letters,
/// digits, `_` and `:` ending at `caret`; the split is on the last
/// `::`. `None` when there is no namespace context.
#[must_use]
pub fn namespace_prefix(text: &str, caret: usize) -> Option<(String, String)> {
    let bytes = text.as_bytes();
    let caret = caret.min(bytes.len());
    let mut start = caret;
    while start > 0 && is_function_token_byte(bytes[start - 1]) {
        start -= 1;
    }
    let token = &text[start..caret];
    let separator = token.rfind("::")?;
    if separator == 0 {
        return None;
    }
    Some((
        token[..separator].to_string(),
        token[separator + 2..].to_string(),
    ))
}

const fn is_function_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b':'
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Index of the first non-`Text` token at or after `from`.
pub(crate) fn next_non_text(tokens: &[Token], from: usize) -> Option<usize> {
    (from..tokens.len()).find(|&i| tokens[i].kind != TokenKind::Text)
}

/// Like [`next_non_text`] but bounded by `to_exclusive`.
pub(crate) fn next_non_text_until(
    tokens: &[Token],
    from: usize,
    to_exclusive: usize,
) -> Option<usize> {
    (from..to_exclusive.min(tokens.len())).find(|&i| tokens[i].kind != TokenKind::Text)
}

/// Index of the first non-`Text` token at or before `from`.
pub(crate) fn prev_non_text(tokens: &[Token], from: usize) -> Option<usize> {
    if tokens.is_empty() || from == usize::MAX {
        return None;
    }
    (0..=from.min(tokens.len() - 1))
        .rev()
        .find(|&i| tokens[i].kind != TokenKind::Text)
}
