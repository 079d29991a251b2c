use crate::{
    context::{Annotation, ValidationContext, IF_KEYWORD_VALID},
    document::{ParseContext, SchemaDocument},
    keyword::{sequence, Keyword, KeywordResult, LocalIds},
    paths::{JSONPointer, PathChunk},
    result::ValidationResult,
    schemas::{DraftSet, Vocabulary},
};
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

/// `if` always reports valid; its verdict travels over the annotation channel
/// to `then`/`else`, which run in a later evaluation tier.
pub(crate) struct If {
    schema: SchemaDocument,
}

impl Keyword for If {
    fn name(&self) -> &'static str {
        "if"
    }

    fn drafts(&self) -> DraftSet {
        DraftSet::DRAFT7_UP
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn sequence(&self) -> u8 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        let mut child = ctx.frame_child(&[PathChunk::from("if")]);
        let nested = self.schema.validate(&mut child);
        let verdict = nested.is_valid();
        if verdict {
            ctx.merge_evaluated(&child);
        }
        ctx.set_annotation(IF_KEYWORD_VALID, Annotation::Bool(verdict));
        // The keyword itself never fails; the verdict is an annotation.
        let mut result = ValidationResult::success(ctx, "if");
        result.annotation = Some(Value::Bool(verdict));
        result.nested.push(nested);
        result
    }

    fn register_subschemas(&self, scope: &Url, location: &JSONPointer, ids: &mut LocalIds) {
        self.schema.collect_ids(scope, &location.join("if"), ids);
    }

    fn resolve_subschema(&self, chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        self.schema.resolve_pointer(chunks)
    }

    fn to_json(&self) -> Value {
        self.schema.to_json()
    }
}

impl fmt::Display for If {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "if: {}", self.schema)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    match SchemaDocument::from_value(schema, context) {
        Ok(document) => Some(Ok(Box::new(If { schema: document }))),
        Err(error) => Some(Err(error)),
    }
}

pub(crate) struct Then {
    schema: SchemaDocument,
}

impl Keyword for Then {
    fn name(&self) -> &'static str {
        "then"
    }

    fn drafts(&self) -> DraftSet {
        DraftSet::DRAFT7_UP
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn sequence(&self) -> u8 {
        sequence::DEPENDENTS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        // Not applicable without an `if` verdict.
        match ctx.annotation(IF_KEYWORD_VALID) {
            Some(Annotation::Bool(true)) => {
                let mut child = ctx.frame_child(&[PathChunk::from("then")]);
                let nested = self.schema.validate(&mut child);
                if nested.is_valid() {
                    ctx.merge_evaluated(&child);
                }
                let mut result = ValidationResult::success(ctx, "then");
                result.push(nested);
                result
            }
            _ => ValidationResult::success(ctx, "then"),
        }
    }

    fn register_subschemas(&self, scope: &Url, location: &JSONPointer, ids: &mut LocalIds) {
        self.schema.collect_ids(scope, &location.join("then"), ids);
    }

    fn resolve_subschema(&self, chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        self.schema.resolve_pointer(chunks)
    }

    fn to_json(&self) -> Value {
        self.schema.to_json()
    }
}

impl fmt::Display for Then {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "then: {}", self.schema)
    }
}

#[inline]
pub(crate) fn compile_then(
    _: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    match SchemaDocument::from_value(schema, context) {
        Ok(document) => Some(Ok(Box::new(Then { schema: document }))),
        Err(error) => Some(Err(error)),
    }
}

pub(crate) struct Else {
    schema: SchemaDocument,
}

impl Keyword for Else {
    fn name(&self) -> &'static str {
        "else"
    }

    fn drafts(&self) -> DraftSet {
        DraftSet::DRAFT7_UP
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn sequence(&self) -> u8 {
        sequence::DEPENDENTS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        match ctx.annotation(IF_KEYWORD_VALID) {
            Some(Annotation::Bool(false)) => {
                let mut child = ctx.frame_child(&[PathChunk::from("else")]);
                let nested = self.schema.validate(&mut child);
                if nested.is_valid() {
                    ctx.merge_evaluated(&child);
                }
                let mut result = ValidationResult::success(ctx, "else");
                result.push(nested);
                result
            }
            _ => ValidationResult::success(ctx, "else"),
        }
    }

    fn register_subschemas(&self, scope: &Url, location: &JSONPointer, ids: &mut LocalIds) {
        self.schema.collect_ids(scope, &location.join("else"), ids);
    }

    fn resolve_subschema(&self, chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        self.schema.resolve_pointer(chunks)
    }

    fn to_json(&self) -> Value {
        self.schema.to_json()
    }
}

impl fmt::Display for Else {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "else: {}", self.schema)
    }
}

#[inline]
pub(crate) fn compile_else(
    _: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    match SchemaDocument::from_value(schema, context) {
        Ok(document) => Some(Ok(Box::new(Else { schema: document }))),
        Err(error) => Some(Err(error)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"if": {"type": "integer"}, "then": {"minimum": 0}}), &json!(1))]
    #[test_case(&json!({"if": {"type": "integer"}, "then": {"minimum": 0}}), &json!("x"); "if false then skipped")]
    #[test_case(&json!({"if": {"type": "integer"}, "then": {"minimum": 0}, "else": {"type": "string"}}), &json!("x"))]
    #[test_case(&json!({"then": {"minimum": 0}}), &json!(-1); "then without if is inert")]
    #[test_case(&json!({"else": {"type": "string"}}), &json!(-1); "else without if is inert")]
    fn conditional_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"if": {"type": "integer"}, "then": {"minimum": 0}}), &json!(-1))]
    #[test_case(&json!({"if": {"type": "integer"}, "then": {"minimum": 0}, "else": {"type": "string"}}), &json!(-1); "then branch fails")]
    #[test_case(&json!({"if": {"type": "integer"}, "then": {"minimum": 0}, "else": {"type": "string"}}), &json!(1.5); "else branch fails")]
    fn conditional_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
