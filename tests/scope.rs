//! Scope and classification tests over full documents.

use jjtemplate_rs::scope::{namespace_prefix, recent_context_variables};
use jjtemplate_rs::{Role, ScopeContext, TokenKind, classify, local_definitions, tokenize};

fn ident_at(tokens: &[jjtemplate_rs::Token], lexeme: &str) -> usize {
    tokens
        .iter()
        .position(|t| t.kind == TokenKind::Ident && t.lexeme == lexeme)
        .expect("identifier present")
}

#[test]
fn pipe_call_and_undotted_root() {
    let text = "{{ user.name | upper }}";
    let tokens = tokenize(text).expect("should tokenize");
    let scope = ScopeContext::default();
    assert_eq!(
        classify(&tokens, ident_at(&tokens, "upper"), &scope),
        Some(Role::FunctionCall)
    );
    assert_eq!(
        classify(&tokens, ident_at(&tokens, "user"), &scope),
        Some(Role::ContextVariable)
    );
    // non-root path segment stays unclassified
    assert_eq!(classify(&tokens, ident_at(&tokens, "name"), &scope), None);
}

#[test]
fn definitions_from_document() {
    let text = r#"{
  "definitions": [
    {"greeting": "hello", "row range .items": {}},
    {"kind switch .type": {"a": 1}}
  ],
  "template": {}
}"#;
    let names = local_definitions(text);
    assert!(names.contains("greeting"));
    assert!(names.contains("row"));
    assert!(names.contains("kind"));
    assert!(!names.contains("items"));
    assert!(!names.contains("type"));
}

#[test]
fn range_binding_scope_in_and_out() {
    let text = r#"{"a": "{{ range item, index of .xs | fmt(.item) }}", "b": "{{ .item }}"}"#;
    let tokens = tokenize(text).expect("should tokenize");

    let inside = tokens
        .iter()
        .position(|t| {
            t.kind == TokenKind::Ident
                && t.lexeme == "item"
                && t.start > text.find("fmt").expect("fmt")
        })
        .expect("usage inside block");
    let scope = ScopeContext::at(text, &tokens, inside);
    assert!(scope.range_bindings.contains("item"));
    assert!(scope.range_bindings.contains("index"));
    assert_eq!(classify(&tokens, inside, &scope), None);

    let outside = tokens
        .iter()
        .rposition(|t| t.kind == TokenKind::Ident && t.lexeme == "item")
        .expect("usage outside block");
    let scope = ScopeContext::at(text, &tokens, outside);
    assert!(!scope.range_bindings.contains("item"));
    assert_eq!(
        classify(&tokens, outside, &scope),
        Some(Role::ContextVariable)
    );
}

#[test]
fn locally_defined_root_is_not_context() {
    let text = r#"{"definitions":[{"user": {}}],"template":"{{ .user.name }}"}"#;
    let tokens = tokenize(text).expect("should tokenize");
    let usage = tokens
        .iter()
        .position(|t| t.kind == TokenKind::Ident && t.lexeme == "user" && t.start > 30)
        .expect("usage");
    let scope = ScopeContext::at(text, &tokens, usage);
    assert_eq!(classify(&tokens, usage, &scope), None);
}

#[test]
fn recent_variables_skip_bound_names() {
    let text = r#"{"definitions":[{"known": 1}],"template":"{{ .known }} {{ .alpha }} {{ .beta }}"}"#;
    let tokens = tokenize(text).expect("should tokenize");
    let scope = ScopeContext::at(text, &tokens, tokens.len());
    let recent = recent_context_variables(&tokens, tokens.len(), &scope);
    assert_eq!(recent, vec!["beta".to_string(), "alpha".to_string()]);
}

#[test]
fn namespace_prefix_for_completion() {
    let text = r#"{"t": "{{ .x | str::tr"#;
    assert_eq!(
        namespace_prefix(text, text.len()),
        Some(("str".to_string(), "tr".to_string()))
    );
    // bare colon is not a namespace separator
    let text = r#"{"t": "{{ .x | str:tr"#;
    assert_eq!(namespace_prefix(text, text.len()), None);
}
