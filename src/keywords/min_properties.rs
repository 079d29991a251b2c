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

pub(crate) struct MinProperties {
    limit: u64,
}

impl Keyword for MinProperties {
    fn name(&self) -> &'static str {
        "minProperties"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Validation
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        if let Value::Object(object) = ctx.instance {
            if (object.len() as u64) < self.limit {
                let mut info = Map::new();
                info.insert("actual".to_string(), ctx.instance.clone());
                info.insert("minProperties".to_string(), json!(self.limit));
                return ValidationResult::failure(
                    ctx,
                    "minProperties",
                    "{{actual}} has less than {{minProperties}} properties",
                    info,
                );
            }
        }
        ValidationResult::success(ctx, "minProperties")
    }

    fn to_json(&self) -> Value {
        json!(self.limit)
    }
}

impl fmt::Display for MinProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "minProperties: {}", self.limit)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &ParseContext,
) -> Option<KeywordResult> {
    match schema.as_u64() {
        Some(limit) => Some(Ok(Box::new(MinProperties { limit }))),
        None => Some(Err(SchemaError::parse(
            "minProperties",
            "expected a non-negative integer",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"minProperties": 1}), &json!({"a": 1}))]
    #[test_case(&json!({"minProperties": 1}), &json!([]))]
    fn min_properties_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"minProperties": 1}), &json!({}))]
    fn min_properties_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
