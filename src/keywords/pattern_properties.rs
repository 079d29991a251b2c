use crate::{
    context::ValidationContext,
    document::{ParseContext, SchemaDocument},
    error::SchemaError,
    keyword::{sequence, Keyword, KeywordResult, LocalIds},
    paths::{JSONPointer, PathChunk},
    result::ValidationResult,
    schemas::Vocabulary,
};
use serde_json::{json, Map, Value};
use std::fmt;
use url::Url;

pub(crate) struct PatternProperties {
    patterns: Vec<(String, fancy_regex::Regex, SchemaDocument)>,
}

impl Keyword for PatternProperties {
    fn name(&self) -> &'static str {
        "patternProperties"
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
            _ => return ValidationResult::success(ctx, "patternProperties"),
        };
        let mut result = ValidationResult::success(ctx, "patternProperties");
        let mut matched = Vec::new();
        for (name, item) in object {
            for (pattern, regex, schema) in &self.patterns {
                if regex.is_match(name).unwrap_or(false) {
                    let mut child = ctx.item_child(
                        item,
                        name.as_str(),
                        &[
                            PathChunk::from("patternProperties"),
                            PathChunk::from(pattern.as_str()),
                        ],
                    );
                    matched.push(name.clone());
                    result.push(schema.validate(&mut child));
                    if !result.is_valid() && ctx.flag() {
                        return result;
                    }
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
        for (pattern, _, schema) in &self.patterns {
            schema.collect_ids(
                scope,
                &location.join("patternProperties").join(pattern.as_str()),
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
        self.patterns
            .iter()
            .find(|(pattern, _, _)| pattern == name)
            .and_then(|(_, _, schema)| schema.resolve_pointer(rest))
    }

    fn to_json(&self) -> Value {
        Value::Object(
            self.patterns
                .iter()
                .map(|(pattern, _, schema)| (pattern.clone(), schema.to_json()))
                .collect(),
        )
    }
}

impl fmt::Display for PatternProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "patternProperties: {{{}}}",
            self.patterns
                .iter()
                .map(|(pattern, _, schema)| format!("{}: {}", pattern, schema))
                .collect::<Vec<String>>()
                .join(", ")
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
        let mut patterns = Vec::with_capacity(object.len());
        for (pattern, subschema) in object {
            let regex = match fancy_regex::Regex::new(pattern) {
                Ok(regex) => regex,
                Err(error) => return Some(Err(error.into())),
            };
            match SchemaDocument::from_value(subschema, context) {
                Ok(document) => patterns.push((pattern.clone(), regex, document)),
                Err(error) => return Some(Err(error)),
            }
        }
        Some(Ok(Box::new(PatternProperties { patterns })))
    } else {
        Some(Err(SchemaError::parse(
            "patternProperties",
            "expected an object",
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"patternProperties": {"^f": {"type": "integer"}}}), &json!({"foo": 1}))]
    #[test_case(&json!({"patternProperties": {"^f": {"type": "integer"}}}), &json!({"bar": "x"}))]
    #[test_case(&json!({"patternProperties": {"^f": {}}}), &json!("not an object"))]
    fn pattern_properties_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"patternProperties": {"^f": {"type": "integer"}}}), &json!({"foo": "x"}))]
    fn pattern_properties_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
