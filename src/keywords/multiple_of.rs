use crate::{
    context::ValidationContext,
    document::ParseContext,
    error::SchemaError,
    keyword::{Keyword, KeywordResult},
    result::ValidationResult,
    schemas::Vocabulary,
};
use fraction::{BigFraction, BigUint};
use serde_json::{Map, Number, Value};
use std::fmt;

pub(crate) struct MultipleOf {
    multiple_of: Number,
}

/// `0.1 * 3 != 0.3` in `f64`; big rationals keep the check exact over the
/// decimal representations JSON numbers carry.
fn is_multiple_of(item: f64, multiple_of: f64) -> bool {
    if item.fract() == 0. && multiple_of.fract() == 0. {
        (item % multiple_of) == 0.
    } else {
        let fraction = BigFraction::from(item) / BigFraction::from(multiple_of);
        match fraction.denom() {
            Some(denom) => denom == &BigUint::from(1_u8),
            None => true,
        }
    }
}

impl Keyword for MultipleOf {
    fn name(&self) -> &'static str {
        "multipleOf"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Validation
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        if let Value::Number(item) = ctx.instance {
            let item = item.as_f64().expect("Always valid");
            let multiple_of = self.multiple_of.as_f64().expect("Always valid");
            if !is_multiple_of(item, multiple_of) {
                let mut info = Map::new();
                info.insert("actual".to_string(), ctx.instance.clone());
                info.insert(
                    "multipleOf".to_string(),
                    Value::Number(self.multiple_of.clone()),
                );
                return ValidationResult::failure(
                    ctx,
                    "multipleOf",
                    "{{actual}} is not a multiple of {{multipleOf}}",
                    info,
                );
            }
        }
        ValidationResult::success(ctx, "multipleOf")
    }

    fn to_json(&self) -> Value {
        Value::Number(self.multiple_of.clone())
    }
}

impl fmt::Display for MultipleOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "multipleOf: {}", self.multiple_of)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &ParseContext,
) -> Option<KeywordResult> {
    if let Value::Number(multiple_of) = schema {
        Some(Ok(Box::new(MultipleOf {
            multiple_of: multiple_of.clone(),
        })))
    } else {
        Some(Err(SchemaError::parse("multipleOf", "expected a number")))
    }
}
