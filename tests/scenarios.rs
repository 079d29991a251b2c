use jsonschema_eval::{
    BasicOutput, Draft, OutputFormat, Schema, SchemaRegistry, SchemaResolver, SchemaResolverError,
};
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use test_case::test_case;
use url::Url;

#[test_case(&json!({"type": "integer", "minimum": 0, "exclusiveMaximum": 10}), &json!(5), true)]
#[test_case(&json!({"type": "integer", "minimum": 0, "exclusiveMaximum": 10}), &json!(10), false)]
#[test_case(&json!({"type": "object", "required": ["a"], "properties": {"a": {"type": "string"}}}), &json!({"a": "x"}), true)]
#[test_case(&json!({"type": "object", "required": ["a"], "properties": {"a": {"type": "string"}}}), &json!({"a": 1}), false)]
#[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 0}]}), &json!(-1), true)]
#[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 0}]}), &json!(3), false)]
#[test_case(
    &json!({
        "$id": "http://x/s",
        "$defs": {"n": {"type": "object", "properties": {"c": {"$ref": "#/$defs/n"}}}},
        "$ref": "#/$defs/n"
    }),
    &json!({"c": {"c": {}}}),
    true
)]
#[test_case(&json!({"if": {"type": "integer"}, "then": {"minimum": 0}, "else": {"type": "string"}}), &json!(-1), false)]
#[test_case(&json!({"type": "array", "contains": {"const": 7}, "minContains": 2}), &json!([1, 7, 7, 3]), true)]
#[test_case(&json!({"properties": {"a": {}}, "unevaluatedProperties": false}), &json!({"a": 1, "b": 2}), false)]
fn end_to_end(schema: &Value, instance: &Value, expected: bool) {
    let compiled = Schema::parse(schema).unwrap();
    assert_eq!(compiled.is_valid(instance), expected);
}

#[test_case(&json!({"type": "integer", "minimum": 0, "exclusiveMaximum": 10}), &json!(10))]
#[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 0}]}), &json!(3))]
#[test_case(&json!({"if": {"type": "integer"}, "then": {"minimum": 0}}), &json!(-1))]
#[test_case(&json!({"properties": {"a": {}}, "unevaluatedProperties": false}), &json!({"a": 1, "b": 2}))]
#[test_case(&json!({"allOf": [{"type": "string"}, {"minLength": 2}]}), &json!("a"))]
#[test_case(&json!({"not": {"type": "integer"}}), &json!(1))]
fn flag_matches_detailed_validity(schema: &Value, instance: &Value) {
    let flag = Schema::options()
        .with_output_format(OutputFormat::Flag)
        .parse(schema)
        .unwrap();
    let detailed = Schema::options()
        .with_output_format(OutputFormat::Detailed)
        .parse(schema)
        .unwrap();
    assert_eq!(
        flag.validate(instance).is_valid(),
        detailed.validate(instance).is_valid()
    );
}

#[test]
fn validation_is_deterministic() {
    let schema = Schema::parse(&json!({
        "type": "object",
        "properties": {"a": {"type": "integer"}, "b": {"items": {"minimum": 0}}},
        "required": ["a"],
        "unevaluatedProperties": false
    }))
    .unwrap();
    let instance = json!({"a": "wrong", "b": [-1, 2], "c": 3});
    let first = serde_json::to_value(schema.validate(&instance)).unwrap();
    let second = serde_json::to_value(schema.validate(&instance)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn parsed_schemas_round_trip() {
    let source = json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "$id": "http://example.com/round-trip",
        "title": "round trip",
        "type": "object",
        "properties": {"a": {"type": "string", "minLength": 1}},
        "patternProperties": {"^x": {"maximum": 3}},
        "dependencies": {"a": ["b"], "c": {"minProperties": 1}},
        "items": [{"type": "integer"}, true],
        "additionalItems": false,
        "enum": [1, "two", [3]],
        "customKeyword": {"anything": "goes"},
        "definitions": {"n": {"type": "null"}}
    });
    let compiled = Schema::parse(&source).unwrap();
    assert_eq!(compiled.to_json(), source);
}

#[test]
fn cycle_safety() {
    // A schema made of nothing but a self reference terminates on anything.
    let schema = Schema::parse(&json!({"$ref": "#"})).unwrap();
    assert!(schema.is_valid(&json!({"deeply": {"nested": [1, 2, 3]}})));

    // Mutual recursion through `$defs` terminates as well.
    let schema = Schema::parse(&json!({
        "$defs": {
            "a": {"properties": {"next": {"$ref": "#/$defs/b"}}},
            "b": {"properties": {"next": {"$ref": "#/$defs/a"}}}
        },
        "$ref": "#/$defs/a"
    }))
    .unwrap();
    assert!(schema.is_valid(&json!({"next": {"next": {"next": {}}}})));
}

#[test]
fn unknown_keywords_become_annotations() {
    let compiled = Schema::parse(&json!({"fancyKeyword": [1, 2], "type": "integer"})).unwrap();
    assert!(compiled.is_valid(&json!(3)));
    let result = compiled.validate(&json!(3));
    let annotation = result
        .nested()
        .iter()
        .find(|nested| nested.keyword() == Some("fancyKeyword"))
        .and_then(|nested| nested.annotation_value());
    assert_eq!(annotation, Some(&json!([1, 2])));
}

#[test]
fn basic_output_locates_failures() {
    let compiled = Schema::parse(&json!({
        "type": "object",
        "properties": {"a": {"type": "string"}}
    }))
    .unwrap();
    let output = compiled.apply(&json!({"a": 1})).basic();
    match output {
        BasicOutput::Invalid(errors) => {
            assert_eq!(errors.len(), 1);
            let unit = &errors[0];
            assert_eq!(unit.keyword_location().to_string(), "/properties/a/type");
            assert_eq!(unit.instance_location().to_string(), "/a");
        }
        BasicOutput::Valid(_) => panic!("expected errors"),
    }
}

#[test]
fn disabled_vocabularies_do_not_assert() {
    // A meta-schema that only enables the core vocabulary: `minimum` must
    // not affect the verdict, but it survives the round trip.
    let metaschema = json!({
        "$vocabulary": {
            "https://json-schema.org/draft/2019-09/vocab/core": true,
            "https://json-schema.org/draft/2019-09/vocab/validation": false
        }
    });
    let registry = Arc::new(SchemaRegistry::new());
    registry.register("http://example.com/core-only", metaschema);
    let schema = json!({
        "$schema": "http://example.com/core-only",
        "minimum": 5
    });
    let compiled = Schema::options()
        .with_registry(registry)
        .parse(&schema)
        .unwrap();
    assert!(compiled.is_valid(&json!(1)));
    assert_eq!(compiled.to_json(), schema);
}

struct StaticResolver {
    calls: Arc<AtomicUsize>,
    document: Value,
}

impl SchemaResolver for StaticResolver {
    fn resolve(&self, _url: &Url, _reference: &str) -> Result<Arc<Value>, SchemaResolverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(self.document.clone()))
    }
}

#[test]
fn remote_references_go_through_the_resolver() {
    let calls = Arc::new(AtomicUsize::new(0));
    let compiled = Schema::options()
        .with_registry(Arc::new(SchemaRegistry::new()))
        .with_resolver(StaticResolver {
            calls: Arc::clone(&calls),
            document: json!({"type": "integer"}),
        })
        .parse(&json!({"$ref": "http://example.com/int.json"}))
        .unwrap();
    assert!(compiled.is_valid(&json!(3)));
    assert!(!compiled.is_valid(&json!("x")));
    // The second validation hits the registry cache.
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn refresh_user_resolver_bypasses_the_cache() {
    let calls = Arc::new(AtomicUsize::new(0));
    let compiled = Schema::options()
        .with_registry(Arc::new(SchemaRegistry::new()))
        .refresh_user_resolver(true)
        .with_resolver(StaticResolver {
            calls: Arc::clone(&calls),
            document: json!({"type": "integer"}),
        })
        .parse(&json!({"$ref": "http://example.com/int.json"}))
        .unwrap();
    assert!(compiled.is_valid(&json!(3)));
    assert!(compiled.is_valid(&json!(4)));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn downloaded_documents_are_checked_against_their_metaschema() {
    // The remote document declares draft 7 but is not a valid draft 7 schema.
    let compiled = Schema::options()
        .with_registry(Arc::new(SchemaRegistry::new()))
        .with_resolver(StaticResolver {
            calls: Arc::new(AtomicUsize::new(0)),
            document: json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "type": 123
            }),
        })
        .parse(&json!({"$ref": "http://example.com/broken.json"}))
        .unwrap();
    // Resolution failures are validation failures, not panics or `Err`s.
    let result = compiled.validate(&json!(1));
    assert!(!result.is_valid());
}

#[test]
fn unresolvable_references_fail_the_referring_location() {
    let compiled = Schema::options()
        .with_registry(Arc::new(SchemaRegistry::new()))
        .parse(&json!({"properties": {"a": {"$ref": "urn:missing"}}}))
        .unwrap();
    let result = compiled.validate(&json!({"a": 1}));
    assert!(!result.is_valid());
    assert!(compiled.is_valid(&json!({})));
}

#[test]
fn child_error_policy_strips_branch_errors() {
    let schema = json!({"anyOf": [{"type": "integer"}, {"type": "string"}]});
    let verbose = Schema::options()
        .with_output_format(OutputFormat::Detailed)
        .parse(&schema)
        .unwrap();
    let result = verbose.validate(&json!([1]));
    let any_of = result
        .nested()
        .iter()
        .find(|nested| nested.keyword() == Some("anyOf"))
        .unwrap();
    assert!(any_of.nested().iter().any(|branch| !branch.nested().is_empty()));

    let terse = Schema::options()
        .with_output_format(OutputFormat::Detailed)
        .should_report_child_errors(|keyword, _| keyword != "anyOf")
        .parse(&schema)
        .unwrap();
    let result = terse.validate(&json!([1]));
    let any_of = result
        .nested()
        .iter()
        .find(|nested| nested.keyword() == Some("anyOf"))
        .unwrap();
    assert!(any_of.nested().iter().all(|branch| branch.nested().is_empty()));
}

#[test]
fn anchors_resolve_location_independently() {
    let compiled = Schema::parse(&json!({
        "$defs": {
            "named": {"$anchor": "target", "type": "integer"}
        },
        "$ref": "#target"
    }))
    .unwrap();
    assert!(compiled.is_valid(&json!(3)));
    assert!(!compiled.is_valid(&json!("x")));
}

#[test]
fn draft7_fragment_ids_resolve() {
    let compiled = Schema::options()
        .with_draft(Draft::Draft7)
        .parse(&json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "definitions": {
                "named": {"$id": "#target", "type": "integer"}
            },
            "allOf": [{"$ref": "#target"}]
        }))
        .unwrap();
    assert!(compiled.is_valid(&json!(3)));
    assert!(!compiled.is_valid(&json!("x")));
}

#[test]
fn nested_ids_change_the_resolution_base() {
    let compiled = Schema::parse(&json!({
        "$id": "http://example.com/root.json",
        "$defs": {
            "child": {
                "$id": "child.json",
                "$defs": {
                    "grandchild": {"type": "integer"}
                }
            }
        },
        "$ref": "http://example.com/child.json#/$defs/grandchild"
    }))
    .unwrap();
    assert!(compiled.is_valid(&json!(3)));
    assert!(!compiled.is_valid(&json!("x")));
}

#[test]
fn evaluated_annotations_merge_through_references() {
    let compiled = Schema::parse(&json!({
        "$defs": {
            "base": {"properties": {"a": {"type": "integer"}}}
        },
        "$ref": "#/$defs/base",
        "unevaluatedProperties": false
    }))
    .unwrap();
    assert!(compiled.is_valid(&json!({"a": 1})));
    assert!(!compiled.is_valid(&json!({"a": 1, "b": 2})));
}

#[test]
fn schema_registry_is_injectable_for_isolation() {
    let registry = Arc::new(SchemaRegistry::new());
    registry.register("http://example.com/pos", json!({"minimum": 0}));
    let compiled = Schema::options()
        .with_registry(Arc::clone(&registry))
        .parse(&json!({"$ref": "http://example.com/pos"}))
        .unwrap();
    assert!(compiled.is_valid(&json!(1)));
    assert!(!compiled.is_valid(&json!(-1)));

    // A fresh registry does not see the registration; resolution fails and
    // the instance is rejected at the referring location.
    let isolated = Schema::options()
        .with_registry(Arc::new(SchemaRegistry::new()))
        .parse(&json!({"$ref": "http://example.com/pos"}))
        .unwrap();
    assert!(!isolated.is_valid(&json!(1)));
}

#[test]
fn json_patch_schema_is_seeded() {
    let compiled = Schema::options()
        .parse(&json!({"$ref": "http://json.schemastore.org/json-patch#"}))
        .unwrap();
    assert!(compiled.is_valid(&json!([{"op": "add", "path": "/a", "value": 1}])));
    assert!(!compiled.is_valid(&json!([{"op": "add"}])));
    assert!(!compiled.is_valid(&json!([{"op": "explode", "path": "/a"}])));
}

#[test]
fn boolean_schemas() {
    assert!(Schema::parse(&json!(true)).unwrap().is_valid(&json!(1)));
    assert!(!Schema::parse(&json!(false)).unwrap().is_valid(&json!(1)));
}
