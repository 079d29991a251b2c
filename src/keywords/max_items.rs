use crate::{
    context::ValidationContext,
    document::ParseContext,
    error::SchemaError,
    keyword::{Keyword, KeywordResult},
    result::ValidationResult,
    schemas::Vocabulary,
};
use serde_json::{json, Map, Value};
use std::fmt;

pub(crate) struct MaxItems {
    limit: u64,
}

impl Keyword for MaxItems {
    fn name(&self) -> &'static str {
        "maxItems"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Validation
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        if let Value::Array(items) = ctx.instance {
            if (items.len() as u64) > self.limit {
                let mut info = Map::new();
                info.insert("actual".to_string(), ctx.instance.clone());
                info.insert("maxItems".to_string(), json!(self.limit));
                return ValidationResult::failure(
                    ctx,
                    "maxItems",
                    "{{actual}} has more than {{maxItems}} items",
                    info,
                );
            }
        }
        ValidationResult::success(ctx, "maxItems")
    }

    fn to_json(&self) -> Value {
        json!(self.limit)
    }
}

impl fmt::Display for MaxItems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "maxItems: {}", self.limit)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &ParseContext,
) -> Option<KeywordResult> {
    match schema.as_u64() {
        Some(limit) => Some(Ok(Box::new(MaxItems { limit }))),
        None => Some(Err(SchemaError::parse(
            "maxItems",
            "expected a non-negative integer",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"maxItems": 2}), &json!([1, 2]))]
    #[test_case(&json!({"maxItems": 2}), &json!("no array"))]
    fn max_items_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"maxItems": 2}), &json!([1, 2, 3]))]
    fn max_items_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
