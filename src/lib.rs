//! Tokenizer and static analysis engine for JJTemplate documents.
//!
//! JJTemplate embeds a small expression language in JSON-like text via
//! `{{ … }}`, `{? … ?}`, and `{. … .}` placeholder blocks. This crate
//! lexes such documents into a position-exact token stream and answers
//! the static questions editors ask about them: which names are in
//! scope, what role an identifier plays, and where a reference was
//! declared. A bracket-depth formatter reindents the hybrid text
//! without touching string or template contents.
//!
//! # Quick start
//!
//! ## Tokenize a document
//!
//! ```
//! use jjtemplate_rs::{tokenize, TokenKind};
//!
//! let tokens = tokenize(r#"{"greeting": "{{ .name | str:upper }}"}"#).unwrap();
//! assert!(tokens.iter().any(|t| t.kind == TokenKind::Pipe));
//! // lexemes concatenate back to the exact input
//! let rebuilt: String = tokens.iter().map(|t| t.lexeme.as_str()).collect();
//! assert_eq!(rebuilt, r#"{"greeting": "{{ .name | str:upper }}"}"#);
//! ```
//!
//! ## Find where a reference is declared
//!
//! ```
//! use jjtemplate_rs::{find_declaration, Resolution};
//!
//! let text = r#"{"definitions":[{"x switch y":{"a":1}}],"template":"{{x}}"}"#;
//! let usage = text.rfind("{{x}}").unwrap() + 2;
//! match find_declaration(text, usage) {
//!     Some(Resolution::Declaration(def)) => assert_eq!(&text[def.start..def.end], "x"),
//!     other => panic!("expected a declaration, got {other:?}"),
//! }
//! ```
//!
//! ## Reformat a document
//!
//! ```
//! use jjtemplate_rs::reformat;
//!
//! let out = reformat(r#"{"a":1,"b":{}}"#, 2);
//! assert_eq!(out, "{\n  \"a\": 1,\n  \"b\": {}\n}");
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod formatter;
pub mod functions;
mod jsonish;
pub mod lexer;
pub mod resolver;
pub mod scanner;
pub mod scope;
pub mod token;

pub use formatter::reformat;
pub use functions::FunctionDescriptor;
pub use lexer::{LexError, LexErrorKind, tokenize, tokenize_expression};
pub use resolver::{
    Definition, Resolution, TemplateRange, build_template_ranges, enclosing_template,
    find_declaration, resolve,
};
pub use scanner::{find_template_close, is_template_start};
pub use scope::{Role, ScopeContext, classify, local_definitions, range_bindings};
pub use token::{Keyword, Token, TokenKind};
