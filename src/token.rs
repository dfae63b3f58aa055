/// Keywords of the template expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// Iteration form; introduces item/index bindings.
    Range,
    /// Named branch form.
    Switch,
    /// Separates range bindings from the iterated expression.
    Of,
}

impl Keyword {
    pub const ALL: [Self; 3] = [Self::Range, Self::Switch, Self::Of];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Range => "range",
            Self::Switch => "switch",
            Self::Of => "of",
        }
    }

    /// Look up a lexeme in the keyword vocabulary.
    #[must_use]
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        match lexeme {
            "range" => Some(Self::Range),
            "switch" => Some(Self::Switch),
            "of" => Some(Self::Of),
            _ => None,
        }
    }

    /// Whether `lexeme` is this keyword.
    #[must_use]
    pub fn is(self, lexeme: &str) -> bool {
        self.as_str() == lexeme
    }
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Plain document text outside template blocks, and whitespace
    /// fill inside them.
    Text,
    /// Template expression opener `{{`.
    OpenExpr,
    /// Template conditional opener `{?`.
    OpenCond,
    /// Template spread opener `{.`.
    OpenSpread,
    /// Template block terminator (`}}`, `?}` or `.}`).
    Close,
    /// `|`
    Pipe,
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `?`
    Question,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// Double-quoted string literal, delimiters included.
    String,
    /// Numeric literal.
    Number,
    /// `true` or `false`.
    Boolean,
    /// `null`
    Null,
    /// Identifier.
    Ident,
    /// A member of the [`Keyword`] vocabulary.
    Keyword,
}

impl TokenKind {
    /// Whether this kind opens a template block.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::OpenExpr | Self::OpenCond | Self::OpenSpread)
    }
}

/// A single token with absolute, half-open byte offsets into the
/// original input. `lexeme` is always the exact substring
/// `&text[start..end]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    /// Whether this token is the `kw` keyword.
    #[must_use]
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.kind == TokenKind::Keyword && kw.is(&self.lexeme)
    }
}
