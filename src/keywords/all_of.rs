use crate::{
    context::ValidationContext,
    document::{ParseContext, SchemaDocument},
    error::SchemaError,
    keyword::{format_documents, sequence, Keyword, KeywordResult, LocalIds},
    paths::{parse_index, JSONPointer, PathChunk},
    result::ValidationResult,
    schemas::Vocabulary,
};
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

pub(crate) struct AllOf {
    schemas: Vec<SchemaDocument>,
}

impl Keyword for AllOf {
    fn name(&self) -> &'static str {
        "allOf"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn sequence(&self) -> u8 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        let mut result = ValidationResult::success(ctx, "allOf");
        for (index, schema) in self.schemas.iter().enumerate() {
            let mut child =
                ctx.frame_child(&[PathChunk::from("allOf"), PathChunk::from(index)]);
            let mut nested = schema.validate(&mut child);
            if nested.is_valid() {
                ctx.merge_evaluated(&child);
            } else if !ctx.report_children("allOf") {
                nested.nested.clear();
            }
            result.push(nested);
            if !result.is_valid() && ctx.flag() {
                return result;
            }
        }
        result
    }

    fn register_subschemas(&self, scope: &Url, location: &JSONPointer, ids: &mut LocalIds) {
        for (index, schema) in self.schemas.iter().enumerate() {
            schema.collect_ids(scope, &location.join("allOf").join(index), ids);
        }
    }

    fn resolve_subschema(&self, chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        resolve_branch(&self.schemas, chunks)
    }

    fn to_json(&self) -> Value {
        branches_to_json(&self.schemas)
    }
}

impl fmt::Display for AllOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "allOf: [{}]", format_documents(&self.schemas))
    }
}

pub(crate) fn resolve_branch<'a>(
    schemas: &'a [SchemaDocument],
    chunks: &[PathChunk],
) -> Option<&'a SchemaDocument> {
    let (head, rest) = chunks.split_first()?;
    let index = match head {
        PathChunk::Name(name) => parse_index(name)?,
        PathChunk::Index(index) => *index,
    };
    schemas.get(index)?.resolve_pointer(rest)
}

pub(crate) fn branches_to_json(schemas: &[SchemaDocument]) -> Value {
    Value::Array(schemas.iter().map(SchemaDocument::to_json).collect())
}

pub(crate) fn parse_branches(
    keyword: &'static str,
    schema: &Value,
    context: &ParseContext,
) -> Result<Vec<SchemaDocument>, SchemaError> {
    if let Value::Array(items) = schema {
        let mut schemas = Vec::with_capacity(items.len());
        for item in items {
            schemas.push(SchemaDocument::from_value(item, context)?);
        }
        Ok(schemas)
    } else {
        Err(SchemaError::parse(keyword, "expected an array of schemas"))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    match parse_branches("allOf", schema, context) {
        Ok(schemas) => Some(Ok(Box::new(AllOf { schemas }))),
        Err(error) => Some(Err(error)),
    }
}
