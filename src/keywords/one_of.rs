use crate::{
    context::ValidationContext,
    document::{ParseContext, SchemaDocument},
    keyword::{format_documents, sequence, Keyword, KeywordResult, LocalIds},
    keywords::all_of::{branches_to_json, parse_branches, resolve_branch},
    paths::{JSONPointer, PathChunk},
    result::ValidationResult,
    schemas::Vocabulary,
};
use ahash::AHashSet;
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

pub(crate) struct OneOf {
    schemas: Vec<SchemaDocument>,
}

impl Keyword for OneOf {
    fn name(&self) -> &'static str {
        "oneOf"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn sequence(&self) -> u8 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        let mut result = ValidationResult::success(ctx, "oneOf");
        let mut valid_count = 0_usize;
        // Annotations merge only from the single succeeding branch.
        let mut succeeded: Option<(AHashSet<String>, usize)> = None;
        for (index, schema) in self.schemas.iter().enumerate() {
            let mut child =
                ctx.frame_child(&[PathChunk::from("oneOf"), PathChunk::from(index)]);
            let mut nested = schema.validate(&mut child);
            let branch_valid = nested.is_valid();
            if branch_valid {
                valid_count += 1;
                if valid_count == 1 {
                    succeeded = Some((
                        child.evaluated_properties.clone(),
                        child.evaluated_items,
                    ));
                }
            } else if !ctx.report_children("oneOf") {
                nested.nested.clear();
            }
            result.nested.push(nested);
            // A second success settles the verdict.
            if branch_valid && valid_count > 1 && ctx.flag() {
                break;
            }
        }
        match valid_count {
            1 => {
                if let Some((properties, items)) = succeeded {
                    for property in properties {
                        ctx.evaluated_properties.insert(property);
                    }
                    if items > ctx.evaluated_items {
                        ctx.evaluated_items = items;
                    }
                }
            }
            0 => {
                let mut info = Map::new();
                info.insert("actual".to_string(), ctx.instance.clone());
                result.set_invalid(
                    "{{actual}} is not valid under any of the given schemas",
                    info,
                );
            }
            _ => {
                let mut info = Map::new();
                info.insert("actual".to_string(), ctx.instance.clone());
                result.set_invalid(
                    "{{actual}} is valid under more than one of the given schemas",
                    info,
                );
            }
        }
        result
    }

    fn register_subschemas(&self, scope: &Url, location: &JSONPointer, ids: &mut LocalIds) {
        for (index, schema) in self.schemas.iter().enumerate() {
            schema.collect_ids(scope, &location.join("oneOf").join(index), ids);
        }
    }

    fn resolve_subschema(&self, chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        resolve_branch(&self.schemas, chunks)
    }

    fn to_json(&self) -> Value {
        branches_to_json(&self.schemas)
    }
}

impl fmt::Display for OneOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "oneOf: [{}]", format_documents(&self.schemas))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    match parse_branches("oneOf", schema, context) {
        Ok(schemas) => Some(Ok(Box::new(OneOf { schemas }))),
        Err(error) => Some(Err(error)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 0}]}), &json!(-1); "only the first matches")]
    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(2.5); "only the second matches")]
    fn one_of_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 0}]}), &json!(3); "both match")]
    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1.1); "none match")]
    fn one_of_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
