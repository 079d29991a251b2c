use crate::{
    context::ValidationContext,
    document::ParseContext,
    keyword::{Keyword, KeywordResult},
    keywords::helpers,
    result::ValidationResult,
    schemas::{DraftSet, Vocabulary},
};
use serde_json::{Map, Value};
use std::fmt;

pub(crate) struct ConstKeyword {
    value: Value,
}

impl Keyword for ConstKeyword {
    fn name(&self) -> &'static str {
        "const"
    }

    fn drafts(&self) -> DraftSet {
        DraftSet::DRAFT6_UP
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Validation
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        if helpers::equal(&self.value, ctx.instance) {
            ValidationResult::success(ctx, "const")
        } else {
            let mut info = Map::new();
            info.insert("actual".to_string(), ctx.instance.clone());
            info.insert("expected".to_string(), self.value.clone());
            ValidationResult::failure(ctx, "const", "{{expected}} was expected", info)
        }
    }

    fn to_json(&self) -> Value {
        self.value.clone()
    }
}

impl fmt::Display for ConstKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "const: {}", self.value)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &ParseContext,
) -> Option<KeywordResult> {
    Some(Ok(Box::new(ConstKeyword {
        value: schema.clone(),
    })))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"const": 2}), &json!(2))]
    #[test_case(&json!({"const": 0.0}), &json!(0))]
    #[test_case(&json!({"const": {"a": 1.0}}), &json!({"a": 1}))]
    #[test_case(&json!({"const": null}), &json!(null))]
    fn const_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"const": 2}), &json!(5))]
    #[test_case(&json!({"const": "a"}), &json!("b"))]
    fn const_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
