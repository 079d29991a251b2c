use crate::{
    context::ValidationContext,
    document::ParseContext,
    error::SchemaError,
    keyword::{Keyword, KeywordResult},
    keywords::helpers,
    primitive_type::{PrimitiveType, PrimitiveTypesBitMap},
    result::ValidationResult,
    schemas::{Draft, Vocabulary},
};
use serde_json::{Map, Value};
use std::{convert::TryFrom, fmt};

pub(crate) struct TypeKeyword {
    types: PrimitiveTypesBitMap,
    raw: Value,
    /// Draft 4 does not accept `1.0` as an integer.
    strict_integer: bool,
}

impl TypeKeyword {
    fn type_matches(&self, primitive_type: PrimitiveType, instance: &Value) -> bool {
        match primitive_type {
            PrimitiveType::Integer => match instance {
                Value::Number(number) => {
                    if self.strict_integer {
                        number.is_u64() || number.is_i64()
                    } else {
                        helpers::is_whole_number(number)
                    }
                }
                _ => false,
            },
            PrimitiveType::Number => matches!(instance, Value::Number(_)),
            PrimitiveType::Array => matches!(instance, Value::Array(_)),
            PrimitiveType::Boolean => matches!(instance, Value::Bool(_)),
            PrimitiveType::Null => matches!(instance, Value::Null),
            PrimitiveType::Object => matches!(instance, Value::Object(_)),
            PrimitiveType::String => matches!(instance, Value::String(_)),
        }
    }
}

impl Keyword for TypeKeyword {
    fn name(&self) -> &'static str {
        "type"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Validation
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        let matched = self
            .types
            .into_iter()
            .any(|primitive_type| self.type_matches(primitive_type, ctx.instance));
        if matched {
            ValidationResult::success(ctx, "type")
        } else {
            let mut info = Map::new();
            info.insert("actual".to_string(), ctx.instance.clone());
            info.insert("expected".to_string(), self.raw.clone());
            ValidationResult::failure(ctx, "type", "{{actual}} is not of type {{expected}}", info)
        }
    }

    fn to_json(&self) -> Value {
        self.raw.clone()
    }
}

impl fmt::Display for TypeKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.raw {
            Value::String(name) => write!(f, "type: {}", name),
            Value::Array(names) => write!(
                f,
                "type: [{}]",
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<&str>>()
                    .join(", ")
            ),
            _ => write!(f, "type"),
        }
    }
}

fn parse_type(name: &str) -> Result<PrimitiveType, SchemaError> {
    PrimitiveType::try_from(name)
        .map_err(|_| SchemaError::parse("type", format!("unknown type name: {}", name)))
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    let mut types = PrimitiveTypesBitMap::new();
    match schema {
        Value::String(name) => match parse_type(name) {
            Ok(primitive_type) => types = types.add_type(primitive_type),
            Err(error) => return Some(Err(error)),
        },
        Value::Array(names) => {
            for name in names {
                match name.as_str().map(parse_type) {
                    Some(Ok(primitive_type)) => types = types.add_type(primitive_type),
                    Some(Err(error)) => return Some(Err(error)),
                    None => {
                        return Some(Err(SchemaError::parse("type", "expected a string")));
                    }
                }
            }
        }
        _ => {
            return Some(Err(SchemaError::parse(
                "type",
                "expected a string or an array of strings",
            )))
        }
    }
    Some(Ok(Box::new(TypeKeyword {
        types,
        raw: schema.clone(),
        strict_integer: context.draft == Draft::Draft4,
    })))
}
