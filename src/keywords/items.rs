use crate::{
    context::ValidationContext,
    document::{ParseContext, SchemaDocument},
    error::SchemaError,
    keyword::{sequence, Keyword, KeywordResult, LocalIds},
    paths::{parse_index, JSONPointer, PathChunk},
    result::ValidationResult,
    schemas::Vocabulary,
};
use serde_json::{json, Map, Value};
use std::fmt;
use url::Url;

pub(crate) enum Items {
    /// One schema applied to every item.
    Single(Box<SchemaDocument>),
    /// Tuple form: one schema per position.
    Tuple(Vec<SchemaDocument>),
}

impl Keyword for Items {
    fn name(&self) -> &'static str {
        "items"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn sequence(&self) -> u8 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        let items = match ctx.instance {
            Value::Array(items) => items,
            _ => return ValidationResult::success(ctx, "items"),
        };
        let mut result = ValidationResult::success(ctx, "items");
        match self {
            Items::Single(schema) => {
                for (index, item) in items.iter().enumerate() {
                    let mut child = ctx.item_child(item, index, &[PathChunk::from("items")]);
                    result.push(schema.validate(&mut child));
                    if !result.is_valid() && ctx.flag() {
                        return result;
                    }
                }
                if result.is_valid() {
                    ctx.evaluated_items = ctx.evaluated_items.max(items.len());
                    result.annotation = Some(Value::Bool(true));
                }
            }
            Items::Tuple(schemas) => {
                let applied = schemas.len().min(items.len());
                for (index, (item, schema)) in items.iter().zip(schemas.iter()).enumerate() {
                    let mut child = ctx.item_child(
                        item,
                        index,
                        &[PathChunk::from("items"), PathChunk::from(index)],
                    );
                    result.push(schema.validate(&mut child));
                    if !result.is_valid() && ctx.flag() {
                        return result;
                    }
                }
                if result.is_valid() {
                    ctx.evaluated_items = ctx.evaluated_items.max(applied);
                    result.annotation = Some(json!(applied));
                }
            }
        }
        result
    }

    fn register_subschemas(&self, scope: &Url, location: &JSONPointer, ids: &mut LocalIds) {
        match self {
            Items::Single(schema) => schema.collect_ids(scope, &location.join("items"), ids),
            Items::Tuple(schemas) => {
                for (index, schema) in schemas.iter().enumerate() {
                    schema.collect_ids(scope, &location.join("items").join(index), ids);
                }
            }
        }
    }

    fn resolve_subschema(&self, chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        match self {
            Items::Single(schema) => schema.resolve_pointer(chunks),
            Items::Tuple(schemas) => {
                let (head, rest) = chunks.split_first()?;
                let index = match head {
                    PathChunk::Name(name) => parse_index(name)?,
                    PathChunk::Index(index) => *index,
                };
                schemas.get(index)?.resolve_pointer(rest)
            }
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Items::Single(schema) => schema.to_json(),
            Items::Tuple(schemas) => {
                Value::Array(schemas.iter().map(SchemaDocument::to_json).collect())
            }
        }
    }
}

impl fmt::Display for Items {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Items::Single(schema) => write!(f, "items: {}", schema),
            Items::Tuple(schemas) => write!(
                f,
                "items: [{}]",
                schemas
                    .iter()
                    .map(|schema| format!("{}", schema))
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
        }
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    match schema {
        Value::Array(schemas) => {
            let mut documents = Vec::with_capacity(schemas.len());
            for subschema in schemas {
                match SchemaDocument::from_value(subschema, context) {
                    Ok(document) => documents.push(document),
                    Err(error) => return Some(Err(error)),
                }
            }
            Some(Ok(Box::new(Items::Tuple(documents))))
        }
        Value::Object(_) | Value::Bool(_) => match SchemaDocument::from_value(schema, context) {
            Ok(document) => Some(Ok(Box::new(Items::Single(Box::new(document))))),
            Err(error) => Some(Err(error)),
        },
        _ => Some(Err(SchemaError::parse(
            "items",
            "expected a schema or an array of schemas",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"items": {"type": "integer"}}), &json!([1, 2, 3]))]
    #[test_case(&json!({"items": {"type": "integer"}}), &json!([]))]
    #[test_case(&json!({"items": [{"type": "string"}, {"type": "integer"}]}), &json!(["a", 1]))]
    #[test_case(&json!({"items": [{"type": "string"}]}), &json!(["a", 1, null]); "extra items unconstrained")]
    #[test_case(&json!({"items": {"type": "integer"}}), &json!("not an array"))]
    fn items_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"items": {"type": "integer"}}), &json!([1, "a"]))]
    #[test_case(&json!({"items": [{"type": "string"}, {"type": "integer"}]}), &json!([1, "a"]))]
    fn items_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
