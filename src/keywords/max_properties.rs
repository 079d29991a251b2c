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

pub(crate) struct MaxProperties {
    limit: u64,
}

impl Keyword for MaxProperties {
    fn name(&self) -> &'static str {
        "maxProperties"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Validation
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        if let Value::Object(object) = ctx.instance {
            if (object.len() as u64) > self.limit {
                let mut info = Map::new();
                info.insert("actual".to_string(), ctx.instance.clone());
                info.insert("maxProperties".to_string(), json!(self.limit));
                return ValidationResult::failure(
                    ctx,
                    "maxProperties",
                    "{{actual}} has more than {{maxProperties}} properties",
                    info,
                );
            }
        }
        ValidationResult::success(ctx, "maxProperties")
    }

    fn to_json(&self) -> Value {
        json!(self.limit)
    }
}

impl fmt::Display for MaxProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "maxProperties: {}", self.limit)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &ParseContext,
) -> Option<KeywordResult> {
    match schema.as_u64() {
        Some(limit) => Some(Ok(Box::new(MaxProperties { limit }))),
        None => Some(Err(SchemaError::parse(
            "maxProperties",
            "expected a non-negative integer",
        ))),
    }
}
