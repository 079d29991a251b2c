use crate::{
    context::ValidationContext,
    document::ParseContext,
    error::SchemaError,
    keyword::{Keyword, KeywordResult},
    keywords::helpers,
    result::ValidationResult,
    schemas::Vocabulary,
};
use serde_json::{Map, Value};
use std::fmt;

pub(crate) struct UniqueItems {
    unique: bool,
}

pub(crate) fn is_unique(items: &[Value]) -> bool {
    // Structural equality with cross-representation numbers rules out a
    // simple hash set; arrays stay small enough for the quadratic scan.
    for (index, item) in items.iter().enumerate() {
        for other in items.iter().skip(index + 1) {
            if helpers::equal(item, other) {
                return false;
            }
        }
    }
    true
}

impl Keyword for UniqueItems {
    fn name(&self) -> &'static str {
        "uniqueItems"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Validation
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        if let Value::Array(items) = ctx.instance {
            if self.unique && !is_unique(items) {
                let mut info = Map::new();
                info.insert("actual".to_string(), ctx.instance.clone());
                return ValidationResult::failure(
                    ctx,
                    "uniqueItems",
                    "{{actual}} has non-unique elements",
                    info,
                );
            }
        }
        ValidationResult::success(ctx, "uniqueItems")
    }

    fn to_json(&self) -> Value {
        Value::Bool(self.unique)
    }
}

impl fmt::Display for UniqueItems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "uniqueItems: {}", self.unique)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &ParseContext,
) -> Option<KeywordResult> {
    if let Value::Bool(unique) = schema {
        Some(Ok(Box::new(UniqueItems { unique: *unique })))
    } else {
        Some(Err(SchemaError::parse("uniqueItems", "expected a boolean")))
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"uniqueItems": true}), &json!([1, 2, 3]))]
    #[test_case(&json!({"uniqueItems": false}), &json!([1, 1]))]
    #[test_case(&json!({"uniqueItems": true}), &json!("not an array"))]
    #[test_case(&json!({"uniqueItems": true}), &json!([{"a": 1}, {"a": 2}]))]
    fn unique_items_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"uniqueItems": true}), &json!([1, 1]))]
    #[test_case(&json!({"uniqueItems": true}), &json!([1, 1.0]); "across representations")]
    #[test_case(&json!({"uniqueItems": true}), &json!([{"a": 1}, {"a": 1.0}]))]
    fn unique_items_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
