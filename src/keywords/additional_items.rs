use crate::{
    context::ValidationContext,
    document::{ParseContext, SchemaDocument},
    keyword::{sequence, Keyword, KeywordResult, LocalIds},
    paths::{JSONPointer, PathChunk},
    result::ValidationResult,
    schemas::Vocabulary,
};
use serde_json::{json, Map, Value};
use std::fmt;
use url::Url;

pub(crate) struct AdditionalItems {
    schema: SchemaDocument,
    /// Length of the sibling `items` tuple; `None` when `items` is not in
    /// tuple form, which makes this keyword inert.
    tuple_len: Option<usize>,
}

impl Keyword for AdditionalItems {
    fn name(&self) -> &'static str {
        "additionalItems"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn sequence(&self) -> u8 {
        sequence::DEPENDENTS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        let items = match ctx.instance {
            Value::Array(items) => items,
            _ => return ValidationResult::success(ctx, "additionalItems"),
        };
        let tuple_len = match self.tuple_len {
            Some(tuple_len) => tuple_len,
            None => return ValidationResult::success(ctx, "additionalItems"),
        };
        if items.len() <= tuple_len {
            return ValidationResult::success(ctx, "additionalItems");
        }
        if self.schema.bool_form() == Some(false) {
            let mut info = Map::new();
            info.insert(
                "unexpected".to_string(),
                Value::Array(items[tuple_len..].to_vec()),
            );
            return ValidationResult::failure(
                ctx,
                "additionalItems",
                "Additional items are not allowed ({{unexpected}} were unexpected)",
                info,
            );
        }
        let mut result = ValidationResult::success(ctx, "additionalItems");
        for (index, item) in items.iter().enumerate().skip(tuple_len) {
            let mut child = ctx.item_child(item, index, &[PathChunk::from("additionalItems")]);
            result.push(self.schema.validate(&mut child));
            if !result.is_valid() && ctx.flag() {
                return result;
            }
        }
        if result.is_valid() {
            ctx.evaluated_items = ctx.evaluated_items.max(items.len());
            result.annotation = Some(json!(true));
        }
        result
    }

    fn register_subschemas(&self, scope: &Url, location: &JSONPointer, ids: &mut LocalIds) {
        self.schema
            .collect_ids(scope, &location.join("additionalItems"), ids);
    }

    fn resolve_subschema(&self, chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        self.schema.resolve_pointer(chunks)
    }

    fn to_json(&self) -> Value {
        self.schema.to_json()
    }
}

impl fmt::Display for AdditionalItems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "additionalItems: {}", self.schema)
    }
}

#[inline]
pub(crate) fn compile(
    parent: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    let tuple_len = parent
        .get("items")
        .and_then(Value::as_array)
        .map(Vec::len);
    match SchemaDocument::from_value(schema, context) {
        Ok(document) => Some(Ok(Box::new(AdditionalItems {
            schema: document,
            tuple_len,
        }))),
        Err(error) => Some(Err(error)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"items": [{}], "additionalItems": {"type": "integer"}}), &json!([null, 2, 3]))]
    #[test_case(&json!({"items": [{}, {}, {}], "additionalItems": false}), &json!([1, 2, 3]))]
    #[test_case(&json!({"additionalItems": false, "items": true}), &json!([1, 2]); "inert without tuple items")]
    #[test_case(&json!({"additionalItems": false}), &json!([1, 2]))]
    fn additional_items_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"items": [{}], "additionalItems": {"type": "integer"}}), &json!([null, 2, 3, "foo"]))]
    #[test_case(&json!({"items": [{}, {}, {}], "additionalItems": false}), &json!([1, 2, 3, 4]))]
    fn additional_items_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
