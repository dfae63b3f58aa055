use std::fmt;

use crate::token::{Keyword, Token, TokenKind};

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Template block opened but never closed.
    UnterminatedTemplate,
    /// Unterminated or newline-broken quoted string inside an
    /// expression.
    UnterminatedString,
    /// Partial numeric literal (digits missing after `-`, `.`, or an
    /// exponent marker).
    MalformedNumber,
    /// Byte that cannot start any expression token.
    UnexpectedCharacter(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedTemplate => {
                write!(f, "unterminated template block")
            }
            Self::UnterminatedString => {
                write!(f, "unterminated string literal")
            }
            Self::MalformedNumber => {
                write!(f, "malformed number literal")
            }
            Self::UnexpectedCharacter(ch) => {
                write!(f, "unexpected character: {ch}")
            }
        }
    }
}

/// Error produced during lexing. `position` is an absolute byte
/// offset into the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at offset {position}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: usize,
}

/// Tokenize a JJTemplate document (JSON scaffolding plus embedded
/// template blocks) into a contiguous token sequence.
///
/// The result covers `[0, text.len())` exactly once: plain document
/// text and whitespace between expression tokens come back as `Text`
/// tokens, so concatenating all lexemes reproduces the input.
///
/// # Errors
///
/// Returns `LexError` when a template block is opened but never
/// closed, or contains a malformed string, number, or unexpected
/// character.
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    let tokens = Lexer::new(text, false).tokenize()?;
    Ok(fill_text_gaps(tokens, text))
}

/// Tokenize a bare template expression with no enclosing delimiters,
/// such as a `"definitions"` object key (`row range .items`).
///
/// # Errors
///
/// Same failure modes as [`tokenize`].
pub fn tokenize_expression(text: &str) -> Result<Vec<Token>, LexError> {
    let tokens = Lexer::new(text, true).tokenize()?;
    Ok(fill_text_gaps(tokens, text))
}

/// Insert synthetic `Text` tokens so the stream is gapless over the
/// whole input.
fn fill_text_gaps(tokens: Vec<Token>, text: &str) -> Vec<Token> {
    let mut filled = Vec::with_capacity(tokens.len());
    let mut cursor = 0;
    for token in tokens {
        if token.start > cursor {
            filled.push(text_token(text, cursor, token.start));
        }
        cursor = token.end;
        filled.push(token);
    }
    if cursor < text.len() {
        filled.push(text_token(text, cursor, text.len()));
    }
    filled
}

fn text_token(text: &str, start: usize, end: usize) -> Token {
    Token {
        kind: TokenKind::Text,
        lexeme: text[start..end].to_string(),
        start,
        end,
    }
}

struct Lexer<'a> {
    text: &'a str,
    input: &'a [u8],
    pos: usize,
    // bare expression input: expression mode from the first byte
    bare: bool,
    // offsets and kinds of currently open template blocks,
    // innermost last
    open_blocks: Vec<(usize, TokenKind)>,
}

impl<'a> Lexer<'a> {
    const fn new(text: &'a str, bare: bool) -> Self {
        Self {
            text,
            input: text.as_bytes(),
            pos: 0,
            bare,
            open_blocks: Vec::new(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while self.pos < self.input.len() {
            if !self.bare && self.open_blocks.is_empty() {
                self.read_text(&mut tokens);
            } else {
                self.read_expression_token(&mut tokens)?;
            }
        }

        if let Some(&(open_at, _)) = self.open_blocks.first() {
            return Err(LexError {
                kind: LexErrorKind::UnterminatedTemplate,
                position: open_at,
            });
        }

        Ok(tokens)
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    /// Does a template block open at `pos`? Strict two-byte test:
    /// `{` followed by `{`, `?`, or `.`.
    fn open_kind_at(&self, pos: usize) -> Option<TokenKind> {
        if self.input.get(pos) != Some(&b'{') {
            return None;
        }
        match self.input.get(pos + 1) {
            Some(b'{') => Some(TokenKind::OpenExpr),
            Some(b'?') => Some(TokenKind::OpenCond),
            Some(b'.') => Some(TokenKind::OpenSpread),
            _ => None,
        }
    }

    fn read_text(&mut self, tokens: &mut Vec<Token>) {
        let start = self.pos;
        while self.pos < self.input.len() && self.open_kind_at(self.pos).is_none() {
            self.pos += 1;
        }
        if self.pos > start {
            tokens.push(self.make_token(TokenKind::Text, start, self.pos));
        }
        if let Some(kind) = self.open_kind_at(self.pos) {
            self.push_open(kind, tokens);
        }
    }

    fn push_open(&mut self, kind: TokenKind, tokens: &mut Vec<Token>) {
        let start = self.pos;
        self.open_blocks.push((start, kind));
        self.pos += 2;
        tokens.push(self.make_token(kind, start, self.pos));
    }

    /// Is the two-byte sequence at `pos` a block terminator for the
    /// innermost open block? `}}` always closes; `?}` and `.}` close
    /// conditional and spread blocks respectively.
    fn is_close_at(&self, pos: usize) -> bool {
        if self.input.get(pos + 1) != Some(&b'}') {
            return false;
        }
        let Some(&first) = self.input.get(pos) else {
            return false;
        };
        if first == b'}' {
            return true;
        }
        match self.open_blocks.last() {
            Some((_, TokenKind::OpenCond)) => first == b'?',
            Some((_, TokenKind::OpenSpread)) => first == b'.',
            _ => false,
        }
    }

    fn read_expression_token(&mut self, tokens: &mut Vec<Token>) -> Result<(), LexError> {
        let b = self.input[self.pos];

        if matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
            self.pos += 1;
            return Ok(());
        }

        if self.is_close_at(self.pos) {
            let start = self.pos;
            self.open_blocks.pop();
            self.pos += 2;
            tokens.push(self.make_token(TokenKind::Close, start, self.pos));
            return Ok(());
        }

        if let Some(kind) = self.open_kind_at(self.pos) {
            self.push_open(kind, tokens);
            return Ok(());
        }

        let punct = match b {
            b'.' => Some(TokenKind::Dot),
            b',' => Some(TokenKind::Comma),
            b':' => Some(TokenKind::Colon),
            b'?' => Some(TokenKind::Question),
            b'|' => Some(TokenKind::Pipe),
            b'(' => Some(TokenKind::LParen),
            b')' => Some(TokenKind::RParen),
            _ => None,
        };
        if let Some(kind) = punct {
            let start = self.pos;
            self.pos += 1;
            tokens.push(self.make_token(kind, start, self.pos));
            return Ok(());
        }

        if b == b'"' {
            return self.read_string(tokens);
        }
        if b == b'-' || b.is_ascii_digit() {
            return self.read_number(tokens);
        }
        if b == b'_' || b.is_ascii_alphabetic() {
            self.read_word(tokens);
            return Ok(());
        }

        let ch = self.text[self.pos..]
            .chars()
            .next()
            .unwrap_or(char::from(b));
        Err(LexError {
            kind: LexErrorKind::UnexpectedCharacter(ch),
            position: self.pos,
        })
    }

    fn read_string(&mut self, tokens: &mut Vec<Token>) -> Result<(), LexError> {
        let start = self.pos;
        self.pos += 1; // opening quote
        let mut escaped = false;
        while self.pos < self.input.len() {
            let b = self.input[self.pos];
            if b == b'\n' || b == b'\r' {
                break;
            }
            self.pos += 1;
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                tokens.push(self.make_token(TokenKind::String, start, self.pos));
                return Ok(());
            }
        }
        Err(LexError {
            kind: LexErrorKind::UnterminatedString,
            position: start,
        })
    }

    fn read_number(&mut self, tokens: &mut Vec<Token>) -> Result<(), LexError> {
        let start = self.pos;
        if self.input[self.pos] == b'-' {
            self.pos += 1;
        }
        self.require_digits()?;
        if self.peek_at(0) == Some(b'.') {
            self.pos += 1;
            self.require_digits()?;
        }
        if matches!(self.peek_at(0), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek_at(0), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            self.require_digits()?;
        }
        tokens.push(self.make_token(TokenKind::Number, start, self.pos));
        Ok(())
    }

    fn require_digits(&mut self) -> Result<(), LexError> {
        let digits_start = self.pos;
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        if self.pos == digits_start {
            return Err(LexError {
                kind: LexErrorKind::MalformedNumber,
                position: digits_start,
            });
        }
        Ok(())
    }

    fn read_word(&mut self, tokens: &mut Vec<Token>) {
        let start = self.pos;
        while self.pos < self.input.len()
            && (self.input[self.pos] == b'_' || self.input[self.pos].is_ascii_alphanumeric())
        {
            self.pos += 1;
        }
        let lexeme = &self.text[start..self.pos];
        let kind = match lexeme {
            "true" | "false" => TokenKind::Boolean,
            "null" => TokenKind::Null,
            _ if Keyword::from_lexeme(lexeme).is_some() => TokenKind::Keyword,
            _ => TokenKind::Ident,
        };
        tokens.push(self.make_token(kind, start, self.pos));
    }

    fn make_token(&self, kind: TokenKind, start: usize, end: usize) -> Token {
        Token {
            kind,
            lexeme: self.text[start..end].to_string(),
            start,
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn plain_json_is_one_text_token() {
        let tokens = tokenize(r#"{"a": 1}"#).expect("should tokenize");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Text);
        assert_eq!(tokens[0].lexeme, r#"{"a": 1}"#);
    }

    #[test]
    fn simple_expression() {
        let tokens = tokenize("{{ user }}").expect("should tokenize");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::OpenExpr,
                TokenKind::Text,
                TokenKind::Ident,
                TokenKind::Text,
                TokenKind::Close,
            ]
        );
        assert_eq!(tokens[2].lexeme, "user");
        assert_eq!(tokens[2].start, 3);
        assert_eq!(tokens[2].end, 7);
    }

    #[test]
    fn coverage_is_gapless() {
        let input = r#"{"x": "{{ a.b | fn }}", "y": [1, 2]}"#;
        let tokens = tokenize(input).expect("should tokenize");
        let mut cursor = 0;
        for token in &tokens {
            assert_eq!(token.start, cursor);
            assert_eq!(&input[token.start..token.end], token.lexeme);
            cursor = token.end;
        }
        assert_eq!(cursor, input.len());
    }

    #[test]
    fn dotted_path() {
        let tokens = tokenize("{{ .user.name }}").expect("should tokenize");
        let significant: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Text)
            .collect();
        assert_eq!(significant[1].kind, TokenKind::Dot);
        assert_eq!(significant[2].lexeme, "user");
        assert_eq!(significant[3].kind, TokenKind::Dot);
        assert_eq!(significant[4].lexeme, "name");
    }

    #[test]
    fn keywords_and_literals() {
        let tokens = tokenize("{{ range item of xs true null 1.5 }}").expect("should tokenize");
        let significant: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Text)
            .collect();
        assert_eq!(significant[1].kind, TokenKind::Keyword);
        assert_eq!(significant[1].lexeme, "range");
        assert_eq!(significant[2].kind, TokenKind::Ident);
        assert_eq!(significant[3].kind, TokenKind::Keyword);
        assert_eq!(significant[3].lexeme, "of");
        assert_eq!(significant[5].kind, TokenKind::Boolean);
        assert_eq!(significant[6].kind, TokenKind::Null);
        assert_eq!(significant[7].kind, TokenKind::Number);
        assert_eq!(significant[7].lexeme, "1.5");
    }

    #[test]
    fn string_keeps_delimiters() {
        let tokens = tokenize(r#"{{ "a \"b\"" }}"#).expect("should tokenize");
        let string = tokens
            .iter()
            .find(|t| t.kind == TokenKind::String)
            .expect("string token");
        assert_eq!(string.lexeme, r#""a \"b\"""#);
    }

    #[test]
    fn nested_template_blocks() {
        let tokens = tokenize("{{ a {{ b }} c }}").expect("should tokenize");
        let opens = tokens.iter().filter(|t| t.kind.is_open()).count();
        let closes = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Close)
            .count();
        assert_eq!(opens, 2);
        assert_eq!(closes, 2);
    }

    #[test]
    fn conditional_and_spread_delimiters() {
        let tokens = tokenize("{? .flag ?}").expect("should tokenize");
        assert_eq!(tokens[0].kind, TokenKind::OpenCond);
        assert_eq!(tokens.last().expect("non-empty").kind, TokenKind::Close);
        assert_eq!(tokens.last().expect("non-empty").lexeme, "?}");

        let tokens = tokenize("{. .items .}").expect("should tokenize");
        assert_eq!(tokens[0].kind, TokenKind::OpenSpread);
        assert_eq!(tokens.last().expect("non-empty").lexeme, ".}");
    }

    #[test]
    fn double_close_always_terminates() {
        let tokens = tokenize("{? .flag }}").expect("should tokenize");
        assert_eq!(tokens.last().expect("non-empty").kind, TokenKind::Close);
    }

    #[test]
    fn lone_open_brace_is_text() {
        let tokens = tokenize("{ \"a\": 1 }").expect("should tokenize");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Text);
    }

    #[test]
    fn unterminated_template() {
        let err = tokenize("text {{ user.name").expect_err("should fail");
        assert_eq!(err.kind, LexErrorKind::UnterminatedTemplate);
        assert_eq!(err.position, 5);
    }

    #[test]
    fn unterminated_string() {
        let err = tokenize("{{ \"abc }}").expect_err("should fail");
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!(err.position, 3);
    }

    #[test]
    fn string_with_raw_newline_fails() {
        let err = tokenize("{{ \"ab\ncd\" }}").expect_err("should fail");
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
    }

    #[test]
    fn malformed_exponent() {
        let err = tokenize("{{ 1e }}").expect_err("should fail");
        assert_eq!(err.kind, LexErrorKind::MalformedNumber);
        assert_eq!(err.position, 5);
    }

    #[test]
    fn lone_minus_is_malformed() {
        let err = tokenize("{{ - }}").expect_err("should fail");
        assert_eq!(err.kind, LexErrorKind::MalformedNumber);
    }

    #[test]
    fn fraction_requires_digits() {
        let err = tokenize("{{ 1. }}").expect_err("should fail");
        assert_eq!(err.kind, LexErrorKind::MalformedNumber);
        assert_eq!(err.position, 5);
    }

    #[test]
    fn unexpected_character_position() {
        let err = tokenize("{{ a # b }}").expect_err("should fail");
        assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter('#'));
        assert_eq!(err.position, 5);
    }

    #[test]
    fn bare_expression_mode() {
        let tokens = tokenize_expression("row range .items").expect("should tokenize");
        let significant: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Text)
            .collect();
        assert_eq!(significant[0].kind, TokenKind::Ident);
        assert_eq!(significant[0].lexeme, "row");
        assert_eq!(significant[1].kind, TokenKind::Keyword);
        assert_eq!(significant[2].kind, TokenKind::Dot);
        assert_eq!(significant[3].lexeme, "items");
    }

    #[test]
    fn empty_input() {
        let tokens = tokenize("").expect("should tokenize");
        assert!(tokens.is_empty());
    }

    #[test]
    fn multibyte_text_offsets() {
        let input = "π: {{ x }}";
        let tokens = tokenize(input).expect("should tokenize");
        let mut cursor = 0;
        for token in &tokens {
            assert_eq!(token.start, cursor);
            cursor = token.end;
        }
        assert_eq!(cursor, input.len());
    }
}
