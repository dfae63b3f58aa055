//! Declaration navigation tests over full documents.

use jjtemplate_rs::resolver::definition_preview;
use jjtemplate_rs::{Definition, Resolution, find_declaration};

const DOCUMENT: &str = r#"{
  "definitions": [
    {"greeting": "hello world"},
    {"cfg": {"host": "localhost", "port": 8080}},
    {"row range .items": {"cell": "{{ .row }}"}},
    {"kind switch .type": {"a": "{{kind}}"}}
  ],
  "template": {
    "title": "{{ greeting }}",
    "address": "{{ .cfg.host }}",
    "p": "{{ cfg.port }}",
    "label": "{{kind}}",
    "external": "{{ .session.id }}"
  }
}"#;

fn declaration_at(marker: &str, pick: &str) -> Definition {
    let usage = DOCUMENT.find(marker).expect("marker") + marker.find(pick).expect("pick");
    match find_declaration(DOCUMENT, usage) {
        Some(Resolution::Declaration(def)) => def,
        other => panic!("expected declaration for {pick}, got {other:?}"),
    }
}

#[test]
fn flat_key_navigation() {
    let def = declaration_at("{{ greeting }}", "greeting");
    assert_eq!(&DOCUMENT[def.start..def.end], "greeting");
    assert!(def.start < DOCUMENT.find("template").expect("template section"));
}

#[test]
fn nested_path_navigation() {
    let def = declaration_at("{{ .cfg.host }}", "host");
    assert_eq!(&DOCUMENT[def.start..def.end], "host");
    assert_eq!(def.start, DOCUMENT.find("host").expect("host key"));
}

#[test]
fn undotted_path_navigation() {
    let def = declaration_at("{{ cfg.port }}", "port");
    assert_eq!(&DOCUMENT[def.start..def.end], "port");
    assert_eq!(def.start, DOCUMENT.find("port").expect("port key"));
}

#[test]
fn switch_key_navigation() {
    let usage = DOCUMENT.find(r#""label": "{{kind}}""#).expect("label") + 12;
    let resolution = find_declaration(DOCUMENT, usage).expect("resolution");
    let declaration = DOCUMENT.find("kind switch").expect("key");
    assert_eq!(
        resolution,
        Resolution::Declaration(Definition {
            start: declaration,
            end: declaration + 4,
        })
    );
}

#[test]
fn range_binding_navigation() {
    let usage = DOCUMENT.find("{{ .row }}").expect("usage") + 4;
    let resolution = find_declaration(DOCUMENT, usage).expect("resolution");
    let declaration = DOCUMENT.find("row range").expect("binding");
    assert_eq!(
        resolution,
        Resolution::Declaration(Definition {
            start: declaration,
            end: declaration + 3,
        })
    );
}

#[test]
fn unknown_root_is_context_bound() {
    let usage = DOCUMENT.find("session").expect("usage");
    assert_eq!(
        find_declaration(DOCUMENT, usage),
        Some(Resolution::ContextBound {
            name: "session".to_string(),
        })
    );
}

#[test]
fn offset_outside_any_block_resolves_nothing() {
    let offset = DOCUMENT.find("address").expect("plain key");
    assert_eq!(find_declaration(DOCUMENT, offset), None);
}

#[test]
fn preview_of_flat_definition() {
    let key = DOCUMENT.find("greeting").expect("key");
    let def = Definition {
        start: key,
        end: key + "greeting".len(),
    };
    assert_eq!(definition_preview(DOCUMENT, &def), "\"hello world\"");
}

#[test]
fn preview_of_object_definition() {
    let key = DOCUMENT.find("cfg").expect("key");
    let def = Definition {
        start: key,
        end: key + 3,
    };
    assert_eq!(
        definition_preview(DOCUMENT, &def),
        r#"{"host": "localhost", "port": 8080}"#
    );
}
