use crate::{
    context::ValidationContext,
    document::ParseContext,
    error::SchemaError,
    keyword::{Keyword, KeywordResult},
    result::ValidationResult,
    schemas::Vocabulary,
};
use serde_json::{Map, Value};
use std::fmt;

pub(crate) struct Pattern {
    pattern: String,
    // ECMA 262 allows look-around and backreferences, `regex` does not.
    regex: fancy_regex::Regex,
}

impl Keyword for Pattern {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Validation
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        if let Value::String(item) = ctx.instance {
            // The pattern matches anywhere unless anchored.
            if !self.regex.is_match(item).unwrap_or(false) {
                let mut info = Map::new();
                info.insert("actual".to_string(), ctx.instance.clone());
                info.insert("pattern".to_string(), Value::String(self.pattern.clone()));
                return ValidationResult::failure(
                    ctx,
                    "pattern",
                    "{{actual}} does not match {{pattern}}",
                    info,
                );
            }
        }
        ValidationResult::success(ctx, "pattern")
    }

    fn to_json(&self) -> Value {
        Value::String(self.pattern.clone())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pattern: {}", self.pattern)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &ParseContext,
) -> Option<KeywordResult> {
    if let Value::String(pattern) = schema {
        match fancy_regex::Regex::new(pattern) {
            Ok(regex) => Some(Ok(Box::new(Pattern {
                pattern: pattern.clone(),
                regex,
            }))),
            Err(error) => Some(Err(error.into())),
        }
    } else {
        Some(Err(SchemaError::parse("pattern", "expected a string")))
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"pattern": "^a*$"}), &json!("aaa"))]
    #[test_case(&json!({"pattern": "a+"}), &json!("xxaxx"); "matches anywhere")]
    #[test_case(&json!({"pattern": "a"}), &json!(1))]
    #[test_case(&json!({"pattern": "^(?!not).*$"}), &json!("yes"); "negative lookahead")]
    fn pattern_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"pattern": "^a*$"}), &json!("abc"))]
    #[test_case(&json!({"pattern": "^(?!not).*$"}), &json!("not this"))]
    fn pattern_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }

    #[test]
    fn invalid_pattern_is_rejected_at_parse_time() {
        assert!(crate::Schema::parse(&json!({"pattern": "(unclosed"})).is_err());
    }
}
