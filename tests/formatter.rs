//! Formatter integration tests.

use jjtemplate_rs::reformat;

#[test]
fn reformats_full_document() {
    let input = r#"{"definitions":[{"greeting":"hello"}],"template":{"title":"{{ .greeting }}","rows":[1,2]}}"#;
    let expected = concat!(
        "{\n",
        "  \"definitions\": [\n",
        "    {\n",
        "      \"greeting\": \"hello\"\n",
        "    }\n",
        "  ],\n",
        "  \"template\": {\n",
        "    \"title\": \"{{ .greeting }}\",\n",
        "    \"rows\": [\n",
        "      1,\n",
        "      2\n",
        "    ]\n",
        "  }\n",
        "}",
    );
    assert_eq!(reformat(input, 2), expected);
}

#[test]
fn collapses_existing_whitespace() {
    let sprawling = "{\n\n\n  \"a\"   :   1\n\n}";
    assert_eq!(reformat(sprawling, 2), "{\n  \"a\": 1\n}");
}

#[test]
fn bare_template_block_keeps_internal_layout() {
    let input = "{\"v\":{{ range row of .items }},\"w\":0}";
    let expected = "{\n  \"v\": {{ range row of .items }},\n  \"w\": 0\n}";
    assert_eq!(reformat(input, 2), expected);
}

#[test]
fn idempotent_on_document() {
    let input = r#"{"definitions":[{"row range .items":{"cell":"{{ .row }}"}},{}],"template":{"empty":{},"list":[]}}"#;
    let once = reformat(input, 2);
    let twice = reformat(&once, 2);
    assert_eq!(twice, once);
}

#[test]
fn wider_indent() {
    assert_eq!(reformat(r#"{"a":[1]}"#, 4), "{\n    \"a\": [\n        1\n    ]\n}");
}
