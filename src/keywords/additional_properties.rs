use crate::{
    context::ValidationContext,
    document::{ParseContext, SchemaDocument},
    keyword::{sequence, Keyword, KeywordResult, LocalIds},
    paths::{JSONPointer, PathChunk},
    result::ValidationResult,
    schemas::Vocabulary,
};
use serde_json::{json, Map, Value};
use std::fmt;
use url::Url;

pub(crate) struct AdditionalProperties {
    schema: SchemaDocument,
    /// Sibling `properties` names captured at parse time: only keys matched
    /// by neither decide what is "additional".
    properties: Vec<String>,
    patterns: Vec<fancy_regex::Regex>,
}

impl AdditionalProperties {
    fn is_additional(&self, name: &str) -> bool {
        !self.properties.iter().any(|property| property == name)
            && !self
                .patterns
                .iter()
                .any(|regex| regex.is_match(name).unwrap_or(false))
    }
}

impl Keyword for AdditionalProperties {
    fn name(&self) -> &'static str {
        "additionalProperties"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn sequence(&self) -> u8 {
        sequence::DEPENDENTS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        let object = match ctx.instance {
            Value::Object(object) => object,
            _ => return ValidationResult::success(ctx, "additionalProperties"),
        };
        let additional: Vec<&String> = object
            .keys()
            .filter(|name| self.is_additional(name))
            .collect();
        if additional.is_empty() {
            return ValidationResult::success(ctx, "additionalProperties");
        }
        if self.schema.bool_form() == Some(false) {
            let mut info = Map::new();
            info.insert("unexpected".to_string(), json!(additional));
            return ValidationResult::failure(
                ctx,
                "additionalProperties",
                "Additional properties are not allowed ({{unexpected}} were unexpected)",
                info,
            );
        }
        let mut result = ValidationResult::success(ctx, "additionalProperties");
        let mut matched = Vec::new();
        for name in additional {
            let item = &object[name];
            let mut child = ctx.item_child(
                item,
                name.as_str(),
                &[PathChunk::from("additionalProperties")],
            );
            matched.push(name.clone());
            result.push(self.schema.validate(&mut child));
            if !result.is_valid() && ctx.flag() {
                return result;
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
        self.schema
            .collect_ids(scope, &location.join("additionalProperties"), ids);
    }

    fn resolve_subschema(&self, chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        self.schema.resolve_pointer(chunks)
    }

    fn to_json(&self) -> Value {
        self.schema.to_json()
    }
}

impl fmt::Display for AdditionalProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "additionalProperties: {}", self.schema)
    }
}

#[inline]
pub(crate) fn compile(
    parent: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    let properties = parent
        .get("properties")
        .and_then(Value::as_object)
        .map(|object| object.keys().cloned().collect())
        .unwrap_or_default();
    let mut patterns = Vec::new();
    if let Some(Value::Object(pattern_properties)) = parent.get("patternProperties") {
        for pattern in pattern_properties.keys() {
            match fancy_regex::Regex::new(pattern) {
                Ok(regex) => patterns.push(regex),
                Err(error) => return Some(Err(error.into())),
            }
        }
    }
    match SchemaDocument::from_value(schema, context) {
        Ok(document) => Some(Ok(Box::new(AdditionalProperties {
            schema: document,
            properties,
            patterns,
        }))),
        Err(error) => Some(Err(error)),
    }
}
