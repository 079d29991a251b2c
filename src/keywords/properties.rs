use crate::{
    context::ValidationContext,
    document::{ParseContext, SchemaDocument},
    error::SchemaError,
    keyword::{format_key_value_documents, sequence, Keyword, KeywordResult, LocalIds},
    paths::{JSONPointer, PathChunk},
    result::ValidationResult,
    schemas::Vocabulary,
};
use serde_json::{json, Map, Value};
use std::fmt;
use url::Url;

pub(crate) struct Properties {
    properties: Vec<(String, SchemaDocument)>,
}

impl Keyword for Properties {
    fn name(&self) -> &'static str {
        "properties"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn sequence(&self) -> u8 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        let object = match ctx.instance {
            Value::Object(object) => object,
            _ => return ValidationResult::success(ctx, "properties"),
        };
        let mut result = ValidationResult::success(ctx, "properties");
        let mut matched = Vec::new();
        for (name, schema) in &self.properties {
            if let Some(item) = object.get(name) {
                let mut child = ctx.item_child(
                    item,
                    name.as_str(),
                    &[PathChunk::from("properties"), PathChunk::from(name.as_str())],
                );
                matched.push(name.clone());
                result.push(schema.validate(&mut child));
                if !result.is_valid() && ctx.flag() {
                    return result;
                }
            }
        }
        if result.is_valid() {
            result.annotation = Some(json!(matched));
            for name in matched {
                ctx.evaluated_properties.insert(name);
            }
        }
        result
    }

    fn register_subschemas(&self, scope: &Url, location: &JSONPointer, ids: &mut LocalIds) {
        for (name, schema) in &self.properties {
            schema.collect_ids(
                scope,
                &location.join("properties").join(name.as_str()),
                ids,
            );
        }
    }

    fn resolve_subschema(&self, chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        let (head, rest) = chunks.split_first()?;
        let name = match head {
            PathChunk::Name(name) => name,
            PathChunk::Index(_) => return None,
        };
        self.properties
            .iter()
            .find(|(property, _)| property == name)
            .and_then(|(_, schema)| schema.resolve_pointer(rest))
    }

    fn to_json(&self) -> Value {
        Value::Object(
            self.properties
                .iter()
                .map(|(name, schema)| (name.clone(), schema.to_json()))
                .collect(),
        )
    }
}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "properties: {{{}}}",
            format_key_value_documents(&self.properties)
        )
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    if let Value::Object(object) = schema {
        let mut properties = Vec::with_capacity(object.len());
        for (name, subschema) in object {
            match SchemaDocument::from_value(subschema, context) {
                Ok(document) => properties.push((name.clone(), document)),
                Err(error) => return Some(Err(error)),
            }
        }
        Some(Ok(Box::new(Properties { properties })))
    } else {
        Some(Err(SchemaError::parse("properties", "expected an object")))
    }
}
