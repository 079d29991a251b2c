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

pub(crate) struct Required {
    required: Vec<String>,
}

impl Keyword for Required {
    fn name(&self) -> &'static str {
        "required"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Validation
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        if let Value::Object(object) = ctx.instance {
            let missing: Vec<&String> = self
                .required
                .iter()
                .filter(|name| !object.contains_key(name.as_str()))
                .collect();
            if !missing.is_empty() {
                let mut info = Map::new();
                info.insert("missing".to_string(), json!(missing));
                return ValidationResult::failure(
                    ctx,
                    "required",
                    "required properties {{missing}} were not found",
                    info,
                );
            }
        }
        ValidationResult::success(ctx, "required")
    }

    fn to_json(&self) -> Value {
        json!(self.required)
    }
}

impl fmt::Display for Required {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "required: [{}]", self.required.join(", "))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &ParseContext,
) -> Option<KeywordResult> {
    if let Value::Array(items) = schema {
        let mut required = Vec::with_capacity(items.len());
        for item in items {
            match item.as_str() {
                Some(name) => required.push(name.to_string()),
                None => {
                    return Some(Err(SchemaError::parse(
                        "required",
                        "expected an array of strings",
                    )))
                }
            }
        }
        Some(Ok(Box::new(Required { required })))
    } else {
        Some(Err(SchemaError::parse("required", "expected an array")))
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"required": ["a"]}), &json!({"a": 1}))]
    #[test_case(&json!({"required": []}), &json!({}))]
    #[test_case(&json!({"required": ["a"]}), &json!("not an object"))]
    fn required_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"required": ["a"]}), &json!({"b": 1}))]
    #[test_case(&json!({"required": ["foo", "bar"]}), &json!({}))]
    fn required_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
