use crate::{
    context::ValidationContext,
    document::ParseContext,
    error::SchemaError,
    keyword::{Keyword, KeywordResult},
    keywords::helpers,
    result::ValidationResult,
    schemas::{DraftSet, Vocabulary},
};
use serde_json::{Map, Number, Value};
use std::fmt;

pub(crate) struct ExclusiveMinimum {
    limit: Number,
}

impl Keyword for ExclusiveMinimum {
    fn name(&self) -> &'static str {
        "exclusiveMinimum"
    }

    fn drafts(&self) -> DraftSet {
        DraftSet::DRAFT6_UP
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Validation
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        if let Value::Number(item) = ctx.instance {
            if !helpers::num_gt(item, &self.limit) {
                let mut info = Map::new();
                info.insert("actual".to_string(), ctx.instance.clone());
                info.insert(
                    "exclusiveMinimum".to_string(),
                    Value::Number(self.limit.clone()),
                );
                return ValidationResult::failure(
                    ctx,
                    "exclusiveMinimum",
                    "{{actual}} is less than or equal to the minimum of {{exclusiveMinimum}}",
                    info,
                );
            }
        }
        ValidationResult::success(ctx, "exclusiveMinimum")
    }

    fn to_json(&self) -> Value {
        Value::Number(self.limit.clone())
    }
}

impl fmt::Display for ExclusiveMinimum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exclusiveMinimum: {}", self.limit)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &ParseContext,
) -> Option<KeywordResult> {
    if let Value::Number(limit) = schema {
        Some(Ok(Box::new(ExclusiveMinimum {
            limit: limit.clone(),
        })))
    } else {
        Some(Err(SchemaError::parse(
            "exclusiveMinimum",
            "expected a number",
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"exclusiveMinimum": 1.1}), &json!(1.2))]
    #[test_case(&json!({"exclusiveMinimum": 5}), &json!("not a number"))]
    fn exclusive_minimum_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"exclusiveMinimum": 1.1}), &json!(1.1))]
    #[test_case(&json!({"exclusiveMinimum": 5}), &json!(4))]
    fn exclusive_minimum_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
