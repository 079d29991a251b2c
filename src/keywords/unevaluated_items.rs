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

/// Runs last: applies to indexes past the evaluated-items watermark left by
/// `items`/`additionalItems`/`contains` in this frame, including merged
/// `$ref`/combinator branches.
pub(crate) struct UnevaluatedItems {
    schema: SchemaDocument,
}

impl Keyword for UnevaluatedItems {
    fn name(&self) -> &'static str {
        "unevaluatedItems"
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
        let items = match ctx.instance {
            Value::Array(items) => items,
            _ => return ValidationResult::success(ctx, "unevaluatedItems"),
        };
        let watermark = ctx.evaluated_items;
        if watermark >= items.len() {
            return ValidationResult::success(ctx, "unevaluatedItems");
        }
        if self.schema.bool_form() == Some(false) {
            let mut info = Map::new();
            info.insert(
                "unexpected".to_string(),
                Value::Array(items[watermark..].to_vec()),
            );
            return ValidationResult::failure(
                ctx,
                "unevaluatedItems",
                "Unevaluated items are not allowed ({{unexpected}} were unexpected)",
                info,
            );
        }
        let mut result = ValidationResult::success(ctx, "unevaluatedItems");
        for (index, item) in items.iter().enumerate().skip(watermark) {
            let mut child = ctx.item_child(item, index, &[PathChunk::from("unevaluatedItems")]);
            result.push(self.schema.validate(&mut child));
            if !result.is_valid() && ctx.flag() {
                return result;
            }
        }
        if result.is_valid() {
            ctx.evaluated_items = items.len();
            result.annotation = Some(json!(true));
        }
        result
    }

    fn register_subschemas(&self, scope: &Url, location: &JSONPointer, ids: &mut LocalIds) {
        self.schema
            .collect_ids(scope, &location.join("unevaluatedItems"), ids);
    }

    fn resolve_subschema(&self, chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        self.schema.resolve_pointer(chunks)
    }

    fn to_json(&self) -> Value {
        self.schema.to_json()
    }
}

impl fmt::Display for UnevaluatedItems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unevaluatedItems: {}", self.schema)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    match SchemaDocument::from_value(schema, context) {
        Ok(document) => Some(Ok(Box::new(UnevaluatedItems { schema: document }))),
        Err(error) => Some(Err(error)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"items": {"type": "integer"}, "unevaluatedItems": false}), &json!([1, 2]))]
    #[test_case(&json!({"items": [{}], "unevaluatedItems": {"type": "integer"}}), &json!(["a", 2]))]
    #[test_case(
        &json!({"allOf": [{"items": [{}, {}]}], "unevaluatedItems": false}),
        &json!([1, 2]);
        "watermark flows out of allOf"
    )]
    #[test_case(&json!({"unevaluatedItems": false}), &json!([]))]
    fn unevaluated_items_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"items": [{}], "unevaluatedItems": false}), &json!([1, 2]))]
    #[test_case(&json!({"unevaluatedItems": false}), &json!([1]))]
    #[test_case(&json!({"items": [{}], "unevaluatedItems": {"type": "integer"}}), &json!(["a", "b"]))]
    fn unevaluated_items_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
