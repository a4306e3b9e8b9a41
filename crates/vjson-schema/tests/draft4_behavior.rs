//! Behavioral contract of the Draft 04 engine, exercised through the public
//! API only.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;
use vjson_core::{Map, Value};
use vjson_schema::{check_schema, Loader, ValidationError, Validator};

fn value(json: serde_json::Value) -> Value {
    Value::from(json)
}

fn validator(schema: serde_json::Value) -> Validator {
    Validator::new(value(schema), None).unwrap()
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1.0e6f64..1.0e6).prop_map(Value::Number),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,3}", inner), 0..4)
                .prop_map(|pairs| Value::Object(pairs.into_iter().collect::<Map>())),
        ]
    })
}

proptest! {
    #[test]
    fn empty_schema_accepts_everything(instance in arb_value()) {
        let v = validator(json!({}));
        prop_assert!(v.validate(&instance).is_ok());
    }

    #[test]
    fn negated_empty_schema_rejects_everything(instance in arb_value()) {
        let err = validator(json!({"not": {}})).validate(&instance).unwrap_err();
        prop_assert_eq!(err.schema_path(), Some("#/not"));
    }

    #[test]
    fn ref_behaves_like_inlined_definition(instance in arb_value()) {
        let definition = json!({
            "type": ["object", "number"],
            "minimum": 0,
            "maxProperties": 2,
            "additionalProperties": {"type": "string"}
        });
        let by_ref = validator(json!({
            "definitions": {"x": definition.clone()},
            "$ref": "#/definitions/x"
        }));
        let inline = validator(definition);
        prop_assert_eq!(by_ref.is_valid(&instance), inline.is_valid(&instance));
    }
}

#[test]
fn malformed_schema_is_never_a_root() {
    for schema in [
        json!([]),
        json!({"type": "float"}),
        json!({"exclusiveMaximum": true}),
        json!({"exclusiveMinimum": false}),
        json!({"required": []}),
        json!({"properties": {"a": 1}}),
        json!({"pattern": "("}),
    ] {
        assert!(check_schema(&value(schema.clone())).is_err(), "{schema}");
        let err = Validator::new(value(schema.clone()), None).unwrap_err();
        assert!(matches!(err, ValidationError::Schema { .. }), "{schema}");
    }
}

#[test]
fn one_of_ambiguity_names_both_branches() {
    let err = validator(json!({"oneOf": [{"type": "number"}, {"minimum": 0}]}))
        .validate(&value(json!(5)))
        .unwrap_err();
    match &err {
        ValidationError::Ambiguous { matched, .. } => {
            assert_eq!(matched, &["#/oneOf/0", "#/oneOf/1"]);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
    assert!(err.to_string().contains("#/oneOf/0 and #/oneOf/1"));
}

#[test]
fn unique_items() {
    let v = validator(json!({"type": "array", "uniqueItems": true}));
    assert!(!v.is_valid(&value(json!([1, 1]))));
    assert!(v.is_valid(&value(json!([1, 2]))));
    assert!(!v.is_valid(&value(json!([{"a": [1]}, {"a": [1.0]}]))));
}

#[test]
fn additional_properties_false() {
    let v = validator(json!({"properties": {"a": {}}, "additionalProperties": false}));
    assert!(v.is_valid(&value(json!({"a": 1}))));
    assert!(!v.is_valid(&value(json!({"a": 1, "b": 2}))));
}

#[test]
fn property_and_pattern_both_apply_properties_first() {
    let v = validator(json!({
        "properties": {"ab": {"type": "number"}},
        "patternProperties": {"^a": {"type": "string"}}
    }));
    let err = v.validate(&value(json!({"ab": "x"}))).unwrap_err();
    assert_eq!(err.schema_path(), Some("#/properties/ab/type"));
    let err = v.validate(&value(json!({"ab": 1}))).unwrap_err();
    assert_eq!(err.schema_path(), Some("#/patternProperties/^a/type"));
}

#[test]
fn exclusive_maximum_requires_maximum() {
    let err = check_schema(&value(json!({"exclusiveMaximum": true}))).unwrap_err();
    assert!(matches!(err, ValidationError::Schema { .. }));
    check_schema(&value(json!({"exclusiveMaximum": true, "maximum": 3}))).unwrap();
}

#[test]
fn remote_ref_fails_without_network_or_preload() {
    for uri in [
        "http://example.com/schema.json",
        "http://example.com/schema.json#/definitions/a",
        "https://example.org/nested/path/s.json#",
    ] {
        let loader = Arc::new(Loader::new());
        let v = Validator::new(value(json!({"$ref": uri})), Some(loader)).unwrap();
        let err = v.validate(&value(json!(null))).unwrap_err();
        assert!(matches!(err, ValidationError::Resolution { .. }), "{uri}: {err}");
    }
}

#[test]
fn preloaded_document_resolves_without_network() {
    let loader = Arc::new(Loader::new());
    loader
        .add(value(json!({
            "id": "http://example.com/schema.json",
            "definitions": {"a": {"enum": ["x", "y"]}}
        })))
        .unwrap();
    let v = Validator::new(
        value(json!({"$ref": "http://example.com/schema.json#/definitions/a"})),
        Some(loader),
    )
    .unwrap();
    assert!(v.is_valid(&value(json!("x"))));
    assert!(!v.is_valid(&value(json!("z"))));
}

#[test]
fn any_of_lists_causes_in_branch_order() {
    let err = validator(json!({"anyOf": [{"type": "string"}, {"type": "array", "minItems": 2}]}))
        .validate(&value(json!([1])))
        .unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("at least one of the schemas in #/anyOf"), "{rendered}");
    let first = rendered.find("#/anyOf/0/type").unwrap();
    let second = rendered.find("#/anyOf/1/minItems").unwrap();
    assert!(first < second);
}

#[test]
fn one_validator_serves_many_threads() {
    let v = validator(json!({
        "type": "object",
        "patternProperties": {"^n[0-9]+$": {"type": "number", "multipleOf": 2}},
        "additionalProperties": false
    }));
    std::thread::scope(|scope| {
        for t in 0..4 {
            let v = &v;
            scope.spawn(move || {
                for i in 0..50 {
                    let key = format!("n{}", t * 100 + i);
                    let mut good = Map::new();
                    good.insert(key.clone(), Value::Number(f64::from(i * 2)));
                    assert!(v.is_valid(&Value::Object(good)));

                    let mut bad = Map::new();
                    bad.insert(key, Value::Number(f64::from(i * 2 + 1)));
                    assert!(!v.is_valid(&Value::Object(bad)));
                }
            });
        }
    });
}
