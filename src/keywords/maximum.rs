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

pub(crate) struct Maximum {
    limit: Number,
    /// Draft 4 sibling form: `"exclusiveMaximum": true` turns the bound strict.
    exclusive: bool,
}

impl Keyword for Maximum {
    fn name(&self) -> &'static str {
        "maximum"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Validation
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        if let Value::Number(item) = ctx.instance {
            let valid = if self.exclusive {
                helpers::num_lt(item, &self.limit)
            } else {
                helpers::num_le(item, &self.limit)
            };
            if !valid {
                let mut info = Map::new();
                info.insert("actual".to_string(), ctx.instance.clone());
                info.insert("maximum".to_string(), Value::Number(self.limit.clone()));
                let template = if self.exclusive {
                    "{{actual}} is greater than or equal to the maximum of {{maximum}}"
                } else {
                    "{{actual}} is greater than the maximum of {{maximum}}"
                };
                return ValidationResult::failure(ctx, "maximum", template, info);
            }
        }
        ValidationResult::success(ctx, "maximum")
    }

    fn to_json(&self) -> Value {
        Value::Number(self.limit.clone())
    }
}

impl fmt::Display for Maximum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "maximum: {}", self.limit)
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
            && parent.get("exclusiveMaximum") == Some(&Value::Bool(true));
        Some(Ok(Box::new(Maximum {
            limit: limit.clone(),
            exclusive,
        })))
    } else {
        Some(Err(SchemaError::parse("maximum", "expected a number")))
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"maximum": 3.0}), &json!(3.0))]
    #[test_case(&json!({"maximum": 3}), &json!(2))]
    #[test_case(&json!({"maximum": 3}), &json!("not a number"))]
    fn maximum_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"maximum": 3.0}), &json!(3.5))]
    #[test_case(&json!({"maximum": 3}), &json!(4))]
    fn maximum_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }

    #[test]
    fn draft4_exclusive_sibling() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-04/schema#",
            "maximum": 10,
            "exclusiveMaximum": true
        });
        tests_util::is_valid(&schema, &json!(9));
        tests_util::is_not_valid(&schema, &json!(10));
    }
}
