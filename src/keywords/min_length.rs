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

pub(crate) struct MinLength {
    limit: u64,
}

impl Keyword for MinLength {
    fn name(&self) -> &'static str {
        "minLength"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Validation
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        if let Value::String(item) = ctx.instance {
            // Unicode code points, not UTF-16 units and not bytes.
            if (bytecount::num_chars(item.as_bytes()) as u64) < self.limit {
                let mut info = Map::new();
                info.insert("actual".to_string(), ctx.instance.clone());
                info.insert("minLength".to_string(), json!(self.limit));
                return ValidationResult::failure(
                    ctx,
                    "minLength",
                    "{{actual}} is shorter than {{minLength}} characters",
                    info,
                );
            }
        }
        ValidationResult::success(ctx, "minLength")
    }

    fn to_json(&self) -> Value {
        json!(self.limit)
    }
}

impl fmt::Display for MinLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "minLength: {}", self.limit)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &ParseContext,
) -> Option<KeywordResult> {
    match schema.as_u64() {
        Some(limit) => Some(Ok(Box::new(MinLength { limit }))),
        None => Some(Err(SchemaError::parse(
            "minLength",
            "expected a non-negative integer",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"minLength": 2}), &json!("ab"))]
    #[test_case(&json!({"minLength": 2}), &json!("日本語"))]
    #[test_case(&json!({"minLength": 2}), &json!(1))]
    fn min_length_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"minLength": 2}), &json!("f"))]
    #[test_case(&json!({"minLength": 2}), &json!("日"))]
    fn min_length_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
