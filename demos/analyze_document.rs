//! Tokenize a JJTemplate document and resolve a reference.

use jjtemplate_rs::{Resolution, ScopeContext, classify, find_declaration, tokenize};

fn main() {
    let input = r#"{
  "definitions": [
    {"greeting": "hello"},
    {"row range .items": {"cell": "{{ .row }}"}}
  ],
  "template": {
    "title": "{{ .greeting | str:upper }}",
    "rows": "{. .items .}"
  }
}"#;

    let tokens = tokenize(input).expect("tokenize failed");
    println!("Tokens: {}", tokens.len());

    let scope = ScopeContext::at(input, &tokens, tokens.len());
    println!("Local definitions: {:?}", scope.local_definitions);

    for (i, token) in tokens.iter().enumerate() {
        if let Some(role) = classify(&tokens, i, &scope) {
            println!("  {:>4}..{:<4} {:<18} {:?}", token.start, token.end, token.lexeme, role);
        }
    }

    let usage = input.find(".row").expect("usage") + 1;
    match find_declaration(input, usage) {
        Some(Resolution::Declaration(def)) => {
            println!("\n'row' declared at {}..{}: {}", def.start, def.end, &input[def.start..def.end]);
        }
        Some(Resolution::ContextBound { name }) => {
            println!("\n'{name}' is context-bound");
        }
        None => println!("\nno identifier at offset {usage}"),
    }
}
