use crate::{
    context::ValidationContext,
    document::{ParseContext, SchemaDocument},
    keyword::{sequence, Keyword, KeywordResult, LocalIds},
    paths::{JSONPointer, PathChunk},
    result::ValidationResult,
    schemas::{DraftSet, Vocabulary},
};
use serde_json::{json, Map, Value};
use std::fmt;
use url::Url;

/// Runs last: applies to keys no earlier applicator in this frame (including
/// merged `$ref`/combinator branches) claimed.
pub(crate) struct UnevaluatedProperties {
    schema: SchemaDocument,
}

impl Keyword for UnevaluatedProperties {
    fn name(&self) -> &'static str {
        "unevaluatedProperties"
    }

    fn drafts(&self) -> DraftSet {
        DraftSet::DRAFT201909_ONLY
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn sequence(&self) -> u8 {
        sequence::UNEVALUATED
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        let object = match ctx.instance {
            Value::Object(object) => object,
            _ => return ValidationResult::success(ctx, "unevaluatedProperties"),
        };
        let unevaluated: Vec<&String> = object
            .keys()
            .filter(|name| !ctx.evaluated_properties.contains(name.as_str()))
            .collect();
        if unevaluated.is_empty() {
            return ValidationResult::success(ctx, "unevaluatedProperties");
        }
        if self.schema.bool_form() == Some(false) {
            let mut info = Map::new();
            info.insert("unexpected".to_string(), json!(unevaluated));
            return ValidationResult::failure(
                ctx,
                "unevaluatedProperties",
                "Unevaluated properties are not allowed ({{unexpected}} were unexpected)",
                info,
            );
        }
        let mut result = ValidationResult::success(ctx, "unevaluatedProperties");
        let mut matched = Vec::new();
        for name in unevaluated {
            let item = &object[name];
            let mut child = ctx.item_child(
                item,
                name.as_str(),
                &[PathChunk::from("unevaluatedProperties")],
            );
            matched.push(name.clone());
            result.push(self.schema.validate(&mut child));
            if !result.is_valid() && ctx.flag() {
                return result;
            }
        }
        if result.is_valid() {
            result.annotation = Some(json!(matched));
            for name in matched {
                ctx.evaluated_properties.insert(name);
            }
        }
        result
    }

    fn register_subschemas(&self, scope: &Url, location: &JSONPointer, ids: &mut LocalIds) {
        self.schema
            .collect_ids(scope, &location.join("unevaluatedProperties"), ids);
    }

    fn resolve_subschema(&self, chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        self.schema.resolve_pointer(chunks)
    }

    fn to_json(&self) -> Value {
        self.schema.to_json()
    }
}

impl fmt::Display for UnevaluatedProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unevaluatedProperties: {}", self.schema)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    match SchemaDocument::from_value(schema, context) {
        Ok(document) => Some(Ok(Box::new(UnevaluatedProperties { schema: document }))),
        Err(error) => Some(Err(error)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"properties": {"a": {}}, "unevaluatedProperties": false}), &json!({"a": 1}))]
    #[test_case(
        &json!({"allOf": [{"properties": {"a": {}}}], "unevaluatedProperties": false}),
        &json!({"a": 1});
        "annotations flow out of allOf"
    )]
    #[test_case(
        &json!({"if": {"properties": {"a": {"const": 1}}}, "then": {"properties": {"b": {}}}, "unevaluatedProperties": false}),
        &json!({"a": 1, "b": 2});
        "annotations flow out of then"
    )]
    #[test_case(&json!({"unevaluatedProperties": {"type": "integer"}}), &json!({"a": 1}))]
    fn unevaluated_properties_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"properties": {"a": {}}, "unevaluatedProperties": false}), &json!({"a": 1, "b": 2}))]
    #[test_case(
        &json!({"anyOf": [{"properties": {"a": {"const": 1}}, "required": ["a"]}], "unevaluatedProperties": false}),
        &json!({"b": 2});
        "failing branch annotations are discarded"
    )]
    #[test_case(&json!({"unevaluatedProperties": {"type": "integer"}}), &json!({"a": "x"}))]
    fn unevaluated_properties_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
