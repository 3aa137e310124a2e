use super::{is_link_key, reconstruct, restore_links, split_for_translation};
use crate::catalog::{Value, FULL_TEXT_KEY};
use serde_json::json;

fn value(raw: serde_json::Value) -> Value {
    serde_json::from_value(raw).expect("parse value")
}

fn full_text(value: &Value) -> &str {
    match value {
        Value::Structured(structured) => structured
            .get_str(FULL_TEXT_KEY)
            .expect("full_text attached"),
        Value::Plain(text) => panic!("expected structured value, got {text:?}"),
    }
}

#[test]
fn link_key_pattern_excludes_link_text() {
    assert!(is_link_key("link_1"));
    assert!(is_link_key("link_42"));
    assert!(!is_link_key("link_text_1"));
    assert!(!is_link_key("link_"));
    assert!(!is_link_key("xlink_1"));
}

#[test]
fn split_flags_only_structured_values() {
    let plain = value(json!("Hello"));
    let structured = value(json!({"text_1": "Go"}));
    assert!(!split_for_translation(&plain).nested);
    let split = split_for_translation(&structured);
    assert!(split.nested);
    assert_eq!(split.value, &structured);
}

#[test]
fn reconstruct_restores_altered_link_and_renders_full_text() {
    let original = value(json!({
        "text_1": "Go to ",
        "link_text_1": "site",
        "link_1": "http://x"
    }));
    let translated = value(json!({
        "text_1": "Go to ",
        "link_text_1": "site",
        "link_1": "http://evil.example"
    }));

    let rebuilt = reconstruct(translated, &original);

    match &rebuilt {
        Value::Structured(structured) => assert_eq!(structured.get_str("link_1"), Some("http://x")),
        Value::Plain(_) => panic!("expected structured value"),
    }
    assert_eq!(full_text(&rebuilt), "Go to [site](http://x)");
}

#[test]
fn reconstruct_uses_translated_text_and_replaces_backend_full_text() {
    let original = value(json!({
        "text_1": "Click ",
        "link_text_1": "here",
        "link_1": "/go"
    }));
    let translated = value(json!({
        "text_1": "Haz clic ",
        "link_text_1": "aquí",
        "link_1": "/ir",
        "full_text": "Haz clic [aquí](/ir)"
    }));

    let rebuilt = reconstruct(translated, &original);
    assert_eq!(full_text(&rebuilt), "Haz clic [aquí](/go)");
}

#[test]
fn reconstruct_carries_forward_dropped_links() {
    let original = value(json!({"text_1": "See ", "link_text_1": "docs", "link_1": "/docs"}));
    let translated = value(json!({"text_1": "Voir ", "link_text_1": "la doc"}));

    let rebuilt = reconstruct(translated, &original);
    assert_eq!(full_text(&rebuilt), "Voir [la doc](/docs)");
}

#[test]
fn reconstruct_full_text_stops_at_first_gap() {
    let original = value(json!({"text_1": "one", "text_3": "three"}));
    let translated = value(json!({"text_1": "uno", "text_3": "tres"}));
    assert_eq!(full_text(&reconstruct(translated, &original)), "uno");
}

#[test]
fn reconstruct_leaves_plain_values_untouched() {
    let original = value(json!("Hello"));
    let translated = value(json!("Bonjour"));
    assert_eq!(reconstruct(translated, &original), value(json!("Bonjour")));
}

#[test]
fn restore_links_skips_keys_missing_from_original() {
    let mut translated = json!({"link_9": "/added", "text_1": "x"});
    restore_links(&mut translated, &json!({"text_1": "x"}));
    assert_eq!(translated, json!({"link_9": "/added", "text_1": "x"}));
}

#[test]
fn restore_links_walks_nested_objects_and_arrays() {
    let original = json!({
        "items": [{"link_1": "/a"}, {"link_1": "/b"}],
        "inner": {"link_2": "/c", "text_2": "t"}
    });
    let mut translated = json!({
        "items": [{"link_1": "/x"}, {"link_1": "/y"}, {"link_1": "/z"}],
        "inner": {"link_2": "/w", "text_2": "translated"}
    });

    restore_links(&mut translated, &original);

    assert_eq!(
        translated,
        json!({
            "items": [{"link_1": "/a"}, {"link_1": "/b"}, {"link_1": "/z"}],
            "inner": {"link_2": "/c", "text_2": "translated"}
        })
    );
}

#[test]
fn restore_links_ignores_shape_mismatch() {
    let mut translated = json!({"items": {"link_1": "/x"}});
    restore_links(&mut translated, &json!({"items": ["/a"]}));
    assert_eq!(translated, json!({"items": {"link_1": "/x"}}));

    let mut scalar = json!("text");
    restore_links(&mut scalar, &json!({"link_1": "/a"}));
    assert_eq!(scalar, json!("text"));
}
