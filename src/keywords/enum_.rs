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

pub(crate) struct EnumKeyword {
    options: Vec<Value>,
}

impl Keyword for EnumKeyword {
    fn name(&self) -> &'static str {
        "enum"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Validation
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        if self
            .options
            .iter()
            .any(|option| helpers::equal(option, ctx.instance))
        {
            ValidationResult::success(ctx, "enum")
        } else {
            let mut info = Map::new();
            info.insert("actual".to_string(), ctx.instance.clone());
            info.insert("options".to_string(), Value::Array(self.options.clone()));
            ValidationResult::failure(ctx, "enum", "{{actual}} is not one of {{options}}", info)
        }
    }

    fn to_json(&self) -> Value {
        Value::Array(self.options.clone())
    }
}

impl fmt::Display for EnumKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "enum: [{}]",
            self.options
                .iter()
                .map(|option| format!("{}", option))
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &ParseContext,
) -> Option<KeywordResult> {
    if let Value::Array(options) = schema {
        Some(Ok(Box::new(EnumKeyword {
            options: options.clone(),
        })))
    } else {
        Some(Err(SchemaError::parse("enum", "expected an array")))
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"enum": [1, 2, 3]}), &json!(2))]
    #[test_case(&json!({"enum": [0.0]}), &json!(0))]
    #[test_case(&json!({"enum": [[1.0]]}), &json!([1]))]
    #[test_case(&json!({"enum": [{"a": 1.0}]}), &json!({"a": 1}))]
    fn enum_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"enum": [1, 2, 3]}), &json!(4))]
    #[test_case(&json!({"enum": ["1"]}), &json!(1))]
    fn enum_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
