use crate::{
    context::ValidationContext,
    document::{ParseContext, SchemaDocument},
    keyword::{format_documents, sequence, Keyword, KeywordResult, LocalIds},
    keywords::all_of::{branches_to_json, parse_branches, resolve_branch},
    paths::{JSONPointer, PathChunk},
    result::ValidationResult,
    schemas::Vocabulary,
};
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

pub(crate) struct AnyOf {
    schemas: Vec<SchemaDocument>,
}

impl Keyword for AnyOf {
    fn name(&self) -> &'static str {
        "anyOf"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn sequence(&self) -> u8 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        let mut result = ValidationResult::success(ctx, "anyOf");
        let mut any_valid = false;
        for (index, schema) in self.schemas.iter().enumerate() {
            let mut child =
                ctx.frame_child(&[PathChunk::from("anyOf"), PathChunk::from(index)]);
            let mut nested = schema.validate(&mut child);
            if nested.is_valid() {
                any_valid = true;
                ctx.merge_evaluated(&child);
                result.nested.push(nested);
                // Only the flag format may skip the remaining branches.
                if ctx.flag() {
                    break;
                }
            } else {
                if !ctx.report_children("anyOf") {
                    nested.nested.clear();
                }
                result.nested.push(nested);
            }
        }
        if !any_valid {
            let mut info = Map::new();
            info.insert("actual".to_string(), ctx.instance.clone());
            result.set_invalid(
                "{{actual}} is not valid under any of the given schemas",
                info,
            );
        }
        result
    }

    fn register_subschemas(&self, scope: &Url, location: &JSONPointer, ids: &mut LocalIds) {
        for (index, schema) in self.schemas.iter().enumerate() {
            schema.collect_ids(scope, &location.join("anyOf").join(index), ids);
        }
    }

    fn resolve_subschema(&self, chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        resolve_branch(&self.schemas, chunks)
    }

    fn to_json(&self) -> Value {
        branches_to_json(&self.schemas)
    }
}

impl fmt::Display for AnyOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anyOf: [{}]", format_documents(&self.schemas))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    match parse_branches("anyOf", schema, context) {
        Ok(schemas) => Some(Ok(Box::new(AnyOf { schemas }))),
        Err(error) => Some(Err(error)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"anyOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1))]
    #[test_case(&json!({"anyOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(2.5))]
    fn any_of_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"anyOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1.5))]
    fn any_of_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
