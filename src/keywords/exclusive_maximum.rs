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

pub(crate) struct ExclusiveMaximum {
    limit: Number,
}

impl Keyword for ExclusiveMaximum {
    fn name(&self) -> &'static str {
        "exclusiveMaximum"
    }

    fn drafts(&self) -> DraftSet {
        DraftSet::DRAFT6_UP
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Validation
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        if let Value::Number(item) = ctx.instance {
            if !helpers::num_lt(item, &self.limit) {
                let mut info = Map::new();
                info.insert("actual".to_string(), ctx.instance.clone());
                info.insert(
                    "exclusiveMaximum".to_string(),
                    Value::Number(self.limit.clone()),
                );
                return ValidationResult::failure(
                    ctx,
                    "exclusiveMaximum",
                    "{{actual}} is greater than or equal to the maximum of {{exclusiveMaximum}}",
                    info,
                );
            }
        }
        ValidationResult::success(ctx, "exclusiveMaximum")
    }

    fn to_json(&self) -> Value {
        Value::Number(self.limit.clone())
    }
}

impl fmt::Display for ExclusiveMaximum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exclusiveMaximum: {}", self.limit)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &ParseContext,
) -> Option<KeywordResult> {
    if let Value::Number(limit) = schema {
        Some(Ok(Box::new(ExclusiveMaximum {
            limit: limit.clone(),
        })))
    } else {
        Some(Err(SchemaError::parse(
            "exclusiveMaximum",
            "expected a number",
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"exclusiveMaximum": 3.0}), &json!(2.9))]
    #[test_case(&json!({"exclusiveMaximum": 5}), &json!("not a number"))]
    fn exclusive_maximum_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"exclusiveMaximum": 3.0}), &json!(3.0))]
    #[test_case(&json!({"exclusiveMaximum": 5}), &json!(6))]
    fn exclusive_maximum_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
