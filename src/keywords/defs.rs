use crate::{
    context::ValidationContext,
    document::{ParseContext, SchemaDocument},
    error::SchemaError,
    keyword::{format_key_value_documents, sequence, Keyword, KeywordResult, LocalIds},
    paths::{JSONPointer, PathChunk},
    result::ValidationResult,
    schemas::{DraftSet, Vocabulary},
};
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

/// `$defs` / `definitions`: a non-validating container whose sole role is to
/// expose subschemas for reference resolution.
pub(crate) struct Defs {
    name: &'static str,
    schemas: Vec<(String, SchemaDocument)>,
}

impl Keyword for Defs {
    fn name(&self) -> &'static str {
        self.name
    }

    fn drafts(&self) -> DraftSet {
        if self.name == "$defs" {
            DraftSet::DRAFT201909_ONLY
        } else {
            DraftSet::ALL
        }
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Core
    }

    fn sequence(&self) -> u8 {
        sequence::IDENTIFIERS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        ValidationResult::success(ctx, self.name)
    }

    fn register_subschemas(&self, scope: &Url, location: &JSONPointer, ids: &mut LocalIds) {
        for (name, schema) in &self.schemas {
            schema.collect_ids(scope, &location.join(self.name).join(name.as_str()), ids);
        }
    }

    fn resolve_subschema(&self, chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        let (head, rest) = chunks.split_first()?;
        let name = match head {
            PathChunk::Name(name) => name,
            PathChunk::Index(_) => return None,
        };
        self.schemas
            .iter()
            .find(|(definition, _)| definition == name)
            .and_then(|(_, schema)| schema.resolve_pointer(rest))
    }

    fn to_json(&self) -> Value {
        Value::Object(
            self.schemas
                .iter()
                .map(|(name, schema)| (name.clone(), schema.to_json()))
                .collect(),
        )
    }
}

impl fmt::Display for Defs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {{{}}}",
            self.name,
            format_key_value_documents(&self.schemas)
        )
    }
}

fn parse_defs(
    name: &'static str,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    if let Value::Object(object) = schema {
        let mut schemas = Vec::with_capacity(object.len());
        for (definition, subschema) in object {
            match SchemaDocument::from_value(subschema, context) {
                Ok(document) => schemas.push((definition.clone(), document)),
                Err(error) => return Some(Err(error)),
            }
        }
        Some(Ok(Box::new(Defs { name, schemas })))
    } else {
        Some(Err(SchemaError::parse(name, "expected an object")))
    }
}

#[inline]
pub(crate) fn compile_defs(
    _: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    parse_defs("$defs", schema, context)
}

#[inline]
pub(crate) fn compile_definitions(
    _: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    parse_defs("definitions", schema, context)
}
