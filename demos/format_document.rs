//! Reformat a compact JJTemplate document and show lex errors.

fn main() {
    let compact = r#"{"definitions":[{"greeting":"hello"}],"template":{"title":"{{ .greeting }}","rows":[1,2,{}]}}"#;
    println!("Formatted:\n{}", jjtemplate_rs::reformat(compact, 2));

    println!();

    // Unterminated template block
    match jjtemplate_rs::tokenize(r#"{"t": "{{ user.name"#) {
        Ok(_) => println!("Lexed OK (unexpected)"),
        Err(e) => {
            println!("Lex error: {e}");
            println!("  Kind: {:?}", e.kind);
            println!("  Offset: {}", e.position);
        }
    }
}
