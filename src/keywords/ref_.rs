use crate::{
    context::ValidationContext,
    document::{ParseContext, SchemaDocument},
    keyword::{sequence, Keyword, KeywordResult},
    paths::JSONPointer,
    result::ValidationResult,
    schemas::Vocabulary,
};
use ahash::AHashMap;
use serde_json::{json, Map, Value};
use std::{fmt, sync::Arc};
use url::Url;

/// `$ref`, resolved lazily at evaluation time so that forward references and
/// cycles work. Cycles terminate through the per-validation in-flight set:
/// re-entering the same reference at the same instance location reports valid.
pub(crate) struct Ref {
    reference: String,
}

impl Keyword for Ref {
    fn name(&self) -> &'static str {
        "$ref"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Core
    }

    fn sequence(&self) -> u8 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        let url = match Url::options()
            .base_url(Some(&ctx.base_uri))
            .parse(&self.reference)
        {
            Ok(url) => url,
            Err(error) => return resolution_failure(ctx, "$ref", &self.reference, &error.to_string()),
        };
        validate_reference(ctx, "$ref", &self.reference, &url)
    }

    fn to_json(&self) -> Value {
        Value::String(self.reference.clone())
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$ref: {}", self.reference)
    }
}

pub(crate) fn new_boxed(reference: String) -> Box<dyn Keyword> {
    Box::new(Ref { reference })
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &ParseContext,
) -> Option<KeywordResult> {
    if let Value::String(reference) = schema {
        Some(Ok(new_boxed(reference.clone())))
    } else {
        Some(Err(crate::error::SchemaError::parse(
            "$ref",
            "expected a string",
        )))
    }
}

/// `$recursiveRef`: behaves as `$ref: "#"`, re-targeted to the outermost
/// dynamic scope that declared `$recursiveAnchor: true`.
pub(crate) struct RecursiveRef {
    reference: String,
}

impl Keyword for RecursiveRef {
    fn name(&self) -> &'static str {
        "$recursiveRef"
    }

    fn drafts(&self) -> crate::schemas::DraftSet {
        crate::schemas::DraftSet::DRAFT201909_ONLY
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Core
    }

    fn sequence(&self) -> u8 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        let target = match &ctx.recursive_anchor {
            Some(anchor) => anchor.clone(),
            None => {
                match Url::options()
                    .base_url(Some(&ctx.base_uri))
                    .parse(&self.reference)
                {
                    Ok(url) => url,
                    Err(error) => {
                        return resolution_failure(
                            ctx,
                            "$recursiveRef",
                            &self.reference,
                            &error.to_string(),
                        )
                    }
                }
            }
        };
        validate_reference(ctx, "$recursiveRef", &self.reference, &target)
    }

    fn to_json(&self) -> Value {
        Value::String(self.reference.clone())
    }
}

impl fmt::Display for RecursiveRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$recursiveRef: {}", self.reference)
    }
}

#[inline]
pub(crate) fn compile_recursive(
    _: &Map<String, Value>,
    schema: &Value,
    _: &ParseContext,
) -> Option<KeywordResult> {
    if let Value::String(reference) = schema {
        Some(Ok(Box::new(RecursiveRef {
            reference: reference.clone(),
        })))
    } else {
        Some(Err(crate::error::SchemaError::parse(
            "$recursiveRef",
            "expected a string",
        )))
    }
}

fn resolution_failure(
    ctx: &ValidationContext<'_, '_>,
    keyword: &'static str,
    reference: &str,
    detail: &str,
) -> ValidationResult {
    let mut info = Map::new();
    info.insert("reference".to_string(), json!(reference));
    info.insert("detail".to_string(), json!(detail));
    ValidationResult::failure(
        ctx,
        keyword,
        "reference {{reference}} could not be resolved: {{detail}}",
        info,
    )
}

fn validate_reference(
    ctx: &mut ValidationContext<'_, '_>,
    keyword: &'static str,
    reference: &str,
    url: &Url,
) -> ValidationResult {
    let flight_key = (url.as_str().to_string(), ctx.instance_location.to_string());
    if !ctx.state.in_flight.borrow_mut().insert(flight_key.clone()) {
        // A cycle: this exact reference is already being evaluated against
        // this exact instance location.
        return ValidationResult::success(ctx, keyword);
    }
    let result = match resolve_reference(ctx, url) {
        Ok((document, pointer, base)) => match document.resolve_pointer(pointer.chunks()) {
            Some(target) => {
                let mut child = ctx.ref_child(keyword, base, Some(pointer));
                let nested = target.validate(&mut child);
                if nested.is_valid() {
                    ctx.merge_evaluated(&child);
                }
                let mut result = ValidationResult::success(ctx, keyword);
                result.push(nested);
                result
            }
            None => resolution_failure(ctx, keyword, reference, "no schema at this location"),
        },
        Err(detail) => resolution_failure(ctx, keyword, reference, &detail),
    };
    ctx.state.in_flight.borrow_mut().remove(&flight_key);
    result
}

/// Resolve `url` to (document, pointer within it, new base URI).
///
/// Lookup order: the current validation's root document and its registered
/// identifiers, documents already parsed during this validation, then the
/// registry (which may invoke the download hook).
fn resolve_reference(
    ctx: &ValidationContext<'_, '_>,
    url: &Url,
) -> Result<(Arc<SchemaDocument>, JSONPointer, Url), String> {
    let mut resource = url.clone();
    resource.set_fragment(None);
    let fragment = percent_encoding::percent_decode_str(url.fragment().unwrap_or(""))
        .decode_utf8()
        .map_err(|error| error.to_string())?;

    if fragment.starts_with('/') {
        let (document, base_pointer) = find_document(ctx, &resource)?;
        let pointer = base_pointer.extend_with(JSONPointer::from_fragment(&fragment).chunks());
        Ok((document, pointer, resource))
    } else if fragment.is_empty() {
        let (document, pointer) = find_document(ctx, &resource)?;
        Ok((document, pointer, resource))
    } else {
        // A plain-name `$anchor` (or a fragment-only draft ≤ 7 `$id`): these
        // are registered under their full URI during the identifier walk.
        let full = url.as_str();
        if let Some(pointer) = ctx.state.root.local_ids().get(full) {
            return Ok((Arc::clone(&ctx.state.root), pointer.clone(), resource));
        }
        let (document, _) = find_document(ctx, &resource)?;
        match document.local_ids().get(full) {
            Some(pointer) => {
                let pointer = pointer.clone();
                Ok((document, pointer, resource))
            }
            None => Err(format!("anchor {} is not defined", fragment)),
        }
    }
}

fn find_document(
    ctx: &ValidationContext<'_, '_>,
    resource: &Url,
) -> Result<(Arc<SchemaDocument>, JSONPointer), String> {
    let key = resource.as_str().trim_end_matches('#');
    if key == ctx.state.root_uri.as_str().trim_end_matches('#') {
        return Ok((Arc::clone(&ctx.state.root), JSONPointer::default()));
    }
    if let Some(pointer) = ctx.state.root.local_ids().get(key) {
        return Ok((Arc::clone(&ctx.state.root), pointer.clone()));
    }
    if let Some(document) = ctx.state.documents.borrow().get(key) {
        return Ok((Arc::clone(document), JSONPointer::default()));
    }
    // Unseen document: pull it through the registry and parse it as a root of
    // its own.
    let raw = ctx
        .state
        .registry
        .get_or_fetch(resource, ctx.state.config)
        .map_err(|error| error.to_string())?;
    let (draft, vocabularies) = ctx.state.config.detect(&raw);
    let parse_context = ParseContext {
        draft,
        config: ctx.state.config,
        vocabularies,
    };
    let mut document =
        SchemaDocument::from_value(&raw, &parse_context).map_err(|error| error.to_string())?;
    let mut ids = AHashMap::new();
    document.collect_ids(resource, &JSONPointer::default(), &mut ids);
    document.set_local_ids(ids);
    let document = Arc::new(document);
    ctx.state
        .documents
        .borrow_mut()
        .insert(key.to_string(), Arc::clone(&document));
    Ok((document, JSONPointer::default()))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(
        &json!({"properties": {"foo": {"$ref": "#/$defs/foo"}}, "$defs": {"foo": {"type": "string"}}}),
        &json!({"foo": "x"})
    )]
    #[test_case(
        &json!({"definitions": {"a": {"type": "integer"}}, "$ref": "#/definitions/a"}),
        &json!(3)
    )]
    #[test_case(
        &json!({
            "$id": "http://x/s",
            "$defs": {"n": {"type": "object", "properties": {"c": {"$ref": "#/$defs/n"}}}},
            "$ref": "#/$defs/n"
        }),
        &json!({"c": {"c": {}}});
        "recursive definition terminates"
    )]
    fn ref_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(
        &json!({"properties": {"foo": {"$ref": "#/$defs/foo"}}, "$defs": {"foo": {"type": "string"}}}),
        &json!({"foo": 42})
    )]
    #[test_case(&json!({"$ref": "#/$defs/missing"}), &json!(1); "unresolvable reference fails")]
    fn ref_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }

    #[test]
    fn self_referential_schema_terminates() {
        let schema = json!({"$ref": "#"});
        for instance in &[json!(1), json!("x"), json!({"a": [1]})] {
            tests_util::is_valid(&schema, instance);
        }
    }

    #[test]
    fn sibling_keywords_are_ignored_before_2019_09() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "definitions": {"a": {"type": "integer"}},
            "$ref": "#/definitions/a",
            "maximum": 0
        });
        // `maximum` sits next to `$ref` and must not assert.
        tests_util::is_valid(&schema, &json!(5));
    }

    #[test]
    fn sibling_keywords_assert_in_2019_09() {
        let schema = json!({
            "$defs": {"a": {"type": "integer"}},
            "$ref": "#/$defs/a",
            "maximum": 0
        });
        tests_util::is_valid(&schema, &json!(-1));
        tests_util::is_not_valid(&schema, &json!(5));
    }

    #[test]
    fn recursive_ref_retargets_to_the_outermost_anchor() {
        // The inner document alone accepts integers and objects; the outer
        // one adds strings. With both documents declaring
        // `$recursiveAnchor: true`, the inner `$recursiveRef` lands on the
        // outer scope, so strings stay valid at any nesting depth.
        let inner = json!({
            "$id": "http://example.com/inner",
            "$recursiveAnchor": true,
            "anyOf": [
                {"type": "integer"},
                {"type": "object", "additionalProperties": {"$recursiveRef": "#"}}
            ]
        });
        let schema = json!({
            "$id": "http://example.com/outer",
            "$recursiveAnchor": true,
            "anyOf": [
                {"type": "string"},
                {"$ref": "http://example.com/inner"}
            ]
        });
        let registry = std::sync::Arc::new(crate::SchemaRegistry::new());
        registry.register("http://example.com/inner", inner);
        let compiled = crate::Schema::options()
            .with_registry(registry)
            .parse(&schema)
            .unwrap();
        assert!(compiled.is_valid(&json!({"a": 1})));
        assert!(compiled.is_valid(&json!({"a": "a string"})));
        assert!(!compiled.is_valid(&json!({"a": 1.5})));
    }
}
