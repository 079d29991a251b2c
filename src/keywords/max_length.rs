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

pub(crate) struct MaxLength {
    limit: u64,
}

impl Keyword for MaxLength {
    fn name(&self) -> &'static str {
        "maxLength"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Validation
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        if let Value::String(item) = ctx.instance {
            if (bytecount::num_chars(item.as_bytes()) as u64) > self.limit {
                let mut info = Map::new();
                info.insert("actual".to_string(), ctx.instance.clone());
                info.insert("maxLength".to_string(), json!(self.limit));
                return ValidationResult::failure(
                    ctx,
                    "maxLength",
                    "{{actual}} is longer than {{maxLength}} characters",
                    info,
                );
            }
        }
        ValidationResult::success(ctx, "maxLength")
    }

    fn to_json(&self) -> Value {
        json!(self.limit)
    }
}

impl fmt::Display for MaxLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "maxLength: {}", self.limit)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &ParseContext,
) -> Option<KeywordResult> {
    match schema.as_u64() {
        Some(limit) => Some(Ok(Box::new(MaxLength { limit }))),
        None => Some(Err(SchemaError::parse(
            "maxLength",
            "expected a non-negative integer",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"maxLength": 5}), &json!("foo"))]
    #[test_case(&json!({"maxLength": 3}), &json!("日本語"))]
    #[test_case(&json!({"maxLength": 2}), &json!(12345))]
    fn max_length_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"maxLength": 2}), &json!("foo"))]
    fn max_length_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
