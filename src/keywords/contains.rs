use crate::{
    context::{Annotation, ValidationContext, CONTAINS_COUNT},
    document::{ParseContext, SchemaDocument},
    error::SchemaError,
    keyword::{sequence, Keyword, KeywordResult, LocalIds},
    paths::{JSONPointer, PathChunk},
    result::ValidationResult,
    schemas::{DraftSet, Vocabulary},
};
use serde_json::{json, Map, Value};
use std::fmt;
use url::Url;

pub(crate) struct Contains {
    schema: SchemaDocument,
    /// A sibling `minContains: 0` overrides the default "at least one"
    /// requirement.
    min_contains_zero: bool,
}

impl Keyword for Contains {
    fn name(&self) -> &'static str {
        "contains"
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
        let items = match ctx.instance {
            Value::Array(items) => items,
            _ => return ValidationResult::success(ctx, "contains"),
        };
        let mut count = 0_usize;
        let mut watermark = 0_usize;
        for (index, item) in items.iter().enumerate() {
            let mut child = ctx.item_child(item, index, &[PathChunk::from("contains")]);
            if self.schema.validate(&mut child).is_valid() {
                count += 1;
                watermark = index + 1;
            }
        }
        ctx.set_annotation(CONTAINS_COUNT, Annotation::Count(count));
        if count > 0 || self.min_contains_zero {
            if count > 0 {
                ctx.evaluated_items = ctx.evaluated_items.max(watermark);
            }
            let mut result = ValidationResult::success(ctx, "contains");
            result.annotation = Some(json!(count));
            result
        } else {
            let mut info = Map::new();
            info.insert("actual".to_string(), ctx.instance.clone());
            ValidationResult::failure(
                ctx,
                "contains",
                "None of {{actual}} are valid under the given schema",
                info,
            )
        }
    }

    fn register_subschemas(&self, scope: &Url, location: &JSONPointer, ids: &mut LocalIds) {
        self.schema
            .collect_ids(scope, &location.join("contains"), ids);
    }

    fn resolve_subschema(&self, chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        self.schema.resolve_pointer(chunks)
    }

    fn to_json(&self) -> Value {
        self.schema.to_json()
    }
}

impl fmt::Display for Contains {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contains: {}", self.schema)
    }
}

#[inline]
pub(crate) fn compile(
    parent: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    let min_contains_zero = parent.get("minContains").and_then(Value::as_u64) == Some(0);
    match SchemaDocument::from_value(schema, context) {
        Ok(document) => Some(Ok(Box::new(Contains {
            schema: document,
            min_contains_zero,
        }))),
        Err(error) => Some(Err(error)),
    }
}

pub(crate) struct MinContains {
    limit: u64,
}

impl Keyword for MinContains {
    fn name(&self) -> &'static str {
        "minContains"
    }

    fn drafts(&self) -> DraftSet {
        DraftSet::DRAFT201909_ONLY
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Validation
    }

    fn sequence(&self) -> u8 {
        sequence::DEPENDENTS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        // Not applicable unless `contains` ran first.
        match ctx.annotation(CONTAINS_COUNT) {
            Some(Annotation::Count(count)) if (count as u64) < self.limit => {
                let mut info = Map::new();
                info.insert("actual".to_string(), json!(count));
                info.insert("minContains".to_string(), json!(self.limit));
                ValidationResult::failure(
                    ctx,
                    "minContains",
                    "the array contains {{actual}} matching items, expected at least {{minContains}}",
                    info,
                )
            }
            _ => ValidationResult::success(ctx, "minContains"),
        }
    }

    fn to_json(&self) -> Value {
        json!(self.limit)
    }
}

impl fmt::Display for MinContains {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "minContains: {}", self.limit)
    }
}

#[inline]
pub(crate) fn compile_min_contains(
    _: &Map<String, Value>,
    schema: &Value,
    _: &ParseContext,
) -> Option<KeywordResult> {
    match schema.as_u64() {
        Some(limit) => Some(Ok(Box::new(MinContains { limit }))),
        None => Some(Err(SchemaError::parse(
            "minContains",
            "expected a non-negative integer",
        ))),
    }
}

pub(crate) struct MaxContains {
    limit: u64,
}

impl Keyword for MaxContains {
    fn name(&self) -> &'static str {
        "maxContains"
    }

    fn drafts(&self) -> DraftSet {
        DraftSet::DRAFT201909_ONLY
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Validation
    }

    fn sequence(&self) -> u8 {
        sequence::DEPENDENTS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        match ctx.annotation(CONTAINS_COUNT) {
            Some(Annotation::Count(count)) if (count as u64) > self.limit => {
                let mut info = Map::new();
                info.insert("actual".to_string(), json!(count));
                info.insert("maxContains".to_string(), json!(self.limit));
                ValidationResult::failure(
                    ctx,
                    "maxContains",
                    "the array contains {{actual}} matching items, expected at most {{maxContains}}",
                    info,
                )
            }
            _ => ValidationResult::success(ctx, "maxContains"),
        }
    }

    fn to_json(&self) -> Value {
        json!(self.limit)
    }
}

impl fmt::Display for MaxContains {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "maxContains: {}", self.limit)
    }
}

#[inline]
pub(crate) fn compile_max_contains(
    _: &Map<String, Value>,
    schema: &Value,
    _: &ParseContext,
) -> Option<KeywordResult> {
    match schema.as_u64() {
        Some(limit) => Some(Ok(Box::new(MaxContains { limit }))),
        None => Some(Err(SchemaError::parse(
            "maxContains",
            "expected a non-negative integer",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"contains": {"minimum": 5}}), &json!([1, 5, 2]))]
    #[test_case(&json!({"contains": {"minimum": 5}}), &json!("not an array"))]
    #[test_case(&json!({"type": "array", "contains": {"const": 7}, "minContains": 2}), &json!([1, 7, 7, 3]))]
    #[test_case(&json!({"contains": {"const": 1}, "minContains": 0}), &json!([]); "minContains zero lifts the default")]
    #[test_case(&json!({"contains": {"const": 1}, "maxContains": 2}), &json!([1, 2, 1]))]
    #[test_case(&json!({"minContains": 2}), &json!([1]); "minContains alone is not applicable")]
    fn contains_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"contains": {"minimum": 5}}), &json!([2, 3, 4]))]
    #[test_case(&json!({"type": "array", "contains": {"const": 7}, "minContains": 2}), &json!([1, 7, 3]))]
    #[test_case(&json!({"contains": {"const": 1}, "maxContains": 1}), &json!([1, 1]))]
    fn contains_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
