use crate::{
    context::ValidationContext,
    document::{ParseContext, SchemaDocument},
    keyword::{sequence, Keyword, KeywordResult, LocalIds},
    paths::{JSONPointer, PathChunk},
    result::ValidationResult,
    schemas::Vocabulary,
};
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

pub(crate) struct Not {
    schema: SchemaDocument,
}

impl Keyword for Not {
    fn name(&self) -> &'static str {
        "not"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn sequence(&self) -> u8 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        let mut child = ctx.frame_child(&[PathChunk::from("not")]);
        // Annotations of the negated branch never merge back.
        if self.schema.validate(&mut child).is_valid() {
            let mut info = Map::new();
            info.insert("actual".to_string(), ctx.instance.clone());
            info.insert("not".to_string(), self.schema.to_json());
            ValidationResult::failure(ctx, "not", "{{not}} is not allowed for {{actual}}", info)
        } else {
            ValidationResult::success(ctx, "not")
        }
    }

    fn register_subschemas(&self, scope: &Url, location: &JSONPointer, ids: &mut LocalIds) {
        self.schema.collect_ids(scope, &location.join("not"), ids);
    }

    fn resolve_subschema(&self, chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        self.schema.resolve_pointer(chunks)
    }

    fn to_json(&self) -> Value {
        self.schema.to_json()
    }
}

impl fmt::Display for Not {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not: {}", self.schema)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    match SchemaDocument::from_value(schema, context) {
        Ok(document) => Some(Ok(Box::new(Not { schema: document }))),
        Err(error) => Some(Err(error)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"not": {"type": "integer"}}), &json!("x"))]
    #[test_case(&json!({"not": false}), &json!(1))]
    fn not_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"not": {"type": "integer"}}), &json!(1))]
    #[test_case(&json!({"not": true}), &json!(1))]
    fn not_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
