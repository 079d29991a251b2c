use crate::{
    context::ValidationContext,
    document::{ParseContext, SchemaDocument},
    keyword::{sequence, Keyword, KeywordResult, LocalIds},
    paths::{JSONPointer, PathChunk},
    result::ValidationResult,
    schemas::{DraftSet, Vocabulary},
};
use ahash::{AHashMap, AHashSet};
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

pub(crate) struct PropertyNames {
    schema: SchemaDocument,
}

impl Keyword for PropertyNames {
    fn name(&self) -> &'static str {
        "propertyNames"
    }

    fn drafts(&self) -> DraftSet {
        DraftSet::DRAFT6_UP
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
            _ => return ValidationResult::success(ctx, "propertyNames"),
        };
        let mut result = ValidationResult::success(ctx, "propertyNames");
        for name in object.keys() {
            // Each key is validated as a string instance of its own.
            let key_instance = Value::String(name.clone());
            let mut child = ValidationContext {
                state: ctx.state,
                instance: &key_instance,
                instance_location: ctx.instance_location.join(name.as_str()),
                relative_location: ctx
                    .relative_location
                    .extend_with(&[PathChunk::from("propertyNames")]),
                base_relative_location: ctx
                    .base_relative_location
                    .as_ref()
                    .map(|location| location.extend_with(&[PathChunk::from("propertyNames")])),
                base_uri: ctx.base_uri.clone(),
                recursive_anchor: ctx.recursive_anchor.clone(),
                misc: AHashMap::new(),
                evaluated_properties: AHashSet::new(),
                evaluated_items: 0,
            };
            result.push(self.schema.validate(&mut child));
            if !result.is_valid() && ctx.flag() {
                return result;
            }
        }
        result
    }

    fn register_subschemas(&self, scope: &Url, location: &JSONPointer, ids: &mut LocalIds) {
        self.schema
            .collect_ids(scope, &location.join("propertyNames"), ids);
    }

    fn resolve_subschema(&self, chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        self.schema.resolve_pointer(chunks)
    }

    fn to_json(&self) -> Value {
        self.schema.to_json()
    }
}

impl fmt::Display for PropertyNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "propertyNames: {}", self.schema)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    match SchemaDocument::from_value(schema, context) {
        Ok(document) => Some(Ok(Box::new(PropertyNames { schema: document }))),
        Err(error) => Some(Err(error)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"propertyNames": {"maxLength": 3}}), &json!({"ab": 1}))]
    #[test_case(&json!({"propertyNames": false}), &json!({}))]
    #[test_case(&json!({"propertyNames": {"maxLength": 3}}), &json!([1, 2]))]
    fn property_names_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"propertyNames": {"maxLength": 3}}), &json!({"abcd": 1}))]
    #[test_case(&json!({"propertyNames": false}), &json!({"a": 1}))]
    fn property_names_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
