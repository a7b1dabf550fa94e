//! The embedded grammar is an ordinary rule document; these tests validate
//! rule documents against it, including the grammar itself.

use jsonrule::{NativeRegistry, RuleCatalog, Validator, grammar_document};
use serde_json::{Value, json};

fn grammar_accepts(document: &Value) -> bool {
    let natives = NativeRegistry::with_builtins();
    let catalog = RuleCatalog::from_value(&grammar_document(), &natives).unwrap();
    let mut validator = Validator::new(&catalog, &natives);
    validator.validate(document).unwrap()
}

#[test]
fn test_grammar_validates_itself() {
    assert!(grammar_accepts(&grammar_document()));
}

#[test]
fn test_grammar_accepts_ordinary_documents() {
    let documents = [
        json!({"": "string"}),
        json!({"": ["string", "number"], "side": ["array", "number"]}),
        json!({"": ["object", {"aaa": "number"}, "string"]}),
        json!({"": {"aaa": ["'on", "'off"], "bbb": ["max-size", 3]}}),
        json!({"": ["all", "hex", ">=", "0", "#comment"]}),
        json!({"": 42}),
        json!({}),
    ];
    for document in &documents {
        assert!(grammar_accepts(document), "grammar rejected {document}");
    }
}

#[test]
fn test_grammar_rejects_non_documents() {
    let documents = [
        json!("just a string"),
        json!(["an", "array"]),
        json!(42),
        json!(null),
    ];
    for document in &documents {
        assert!(!grammar_accepts(document), "grammar accepted {document}");
    }
}

#[test]
fn test_grammar_document_builds_a_catalog() {
    let natives = NativeRegistry::with_builtins();
    let catalog = RuleCatalog::from_value(&grammar_document(), &natives).unwrap();
    assert!(catalog.has_entry_rule());
    assert!(catalog.get("ruleline").is_some());
}
