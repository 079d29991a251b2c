use crate::{
    context::ValidationContext,
    document::ParseContext,
    error::SchemaError,
    keyword::{Keyword, KeywordResult},
    keywords::helpers,
    result::ValidationResult,
    schemas::{Draft, Vocabulary},
};
use serde_json::{Map, Number, Value};
use std::fmt;

pub(crate) struct Minimum {
    limit: Number,
    /// Draft 4 sibling form: `"exclusiveMinimum": true` turns the bound strict.
    exclusive: bool,
}

impl Keyword for Minimum {
    fn name(&self) -> &'static str {
        "minimum"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Validation
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        if let Value::Number(item) = ctx.instance {
            let valid = if self.exclusive {
                helpers::num_gt(item, &self.limit)
            } else {
                helpers::num_ge(item, &self.limit)
            };
            if !valid {
                let mut info = Map::new();
                info.insert("actual".to_string(), ctx.instance.clone());
                info.insert("minimum".to_string(), Value::Number(self.limit.clone()));
                let template = if self.exclusive {
                    "{{actual}} is less than or equal to the minimum of {{minimum}}"
                } else {
                    "{{actual}} is less than the minimum of {{minimum}}"
                };
                return ValidationResult::failure(ctx, "minimum", template, info);
            }
        }
        ValidationResult::success(ctx, "minimum")
    }

    fn to_json(&self) -> Value {
        Value::Number(self.limit.clone())
    }
}

impl fmt::Display for Minimum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "minimum: {}", self.limit)
    }
}

#[inline]
pub(crate) fn compile(
    parent: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    if let Value::Number(limit) = schema {
        let exclusive = context.draft == Draft::Draft4
            && parent.get("exclusiveMinimum") == Some(&Value::Bool(true));
        Some(Ok(Box::new(Minimum {
            limit: limit.clone(),
            exclusive,
        })))
    } else {
        Some(Err(SchemaError::parse("minimum", "expected a number")))
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"minimum": 1}), &json!(1))]
    #[test_case(&json!({"minimum": 1}), &json!(1.0))]
    #[test_case(&json!({"minimum": 1.1}), &json!(2))]
    #[test_case(&json!({"minimum": 1}), &json!("not a number"))]
    fn minimum_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"minimum": 1.1}), &json!(0.6))]
    #[test_case(&json!({"minimum": 1}), &json!(0))]
    fn minimum_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }

    #[test]
    fn draft4_exclusive_sibling() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-04/schema#",
            "minimum": 1,
            "exclusiveMinimum": true
        });
        tests_util::is_valid(&schema, &json!(2));
        tests_util::is_not_valid(&schema, &json!(1));
    }
}
