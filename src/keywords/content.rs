//! `contentMediaType` / `contentEncoding` / `contentSchema`.
//!
//! Annotation-only unless content validation is switched on in the options.
use crate::{
    content_encoding::{
        ContentEncodingCheckType, ContentEncodingConverterType,
        DEFAULT_CONTENT_ENCODING_CHECKS_AND_CONVERTERS,
    },
    content_media_type::{ContentMediaTypeCheckType, DEFAULT_CONTENT_MEDIA_TYPE_CHECKS},
    context::ValidationContext,
    document::{ParseContext, SchemaDocument},
    error::SchemaError,
    keyword::{sequence, Keyword, KeywordResult, LocalIds},
    paths::{JSONPointer, PathChunk},
    result::ValidationResult,
    schemas::{DraftSet, Vocabulary},
};
use ahash::{AHashMap, AHashSet};
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

fn encoding_pair(
    encoding: &str,
    context: &ParseContext,
) -> Option<(ContentEncodingCheckType, ContentEncodingConverterType)> {
    context
        .config
        .custom_encoding(encoding)
        .or_else(|| DEFAULT_CONTENT_ENCODING_CHECKS_AND_CONVERTERS.get(encoding).copied())
}

pub(crate) struct ContentMediaType {
    media_type: String,
    check: Option<ContentMediaTypeCheckType>,
    /// Sibling `contentEncoding` converter; the check runs on decoded content.
    converter: Option<ContentEncodingConverterType>,
    assert: bool,
}

impl Keyword for ContentMediaType {
    fn name(&self) -> &'static str {
        "contentMediaType"
    }

    fn drafts(&self) -> DraftSet {
        DraftSet::DRAFT7_UP
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Content
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        if self.assert {
            if let (Some(check), Value::String(item)) = (self.check, ctx.instance) {
                let decoded = match self.converter {
                    Some(converter) => converter(item),
                    None => Some(item.clone()),
                };
                let valid = match decoded {
                    Some(content) => check(&content),
                    // The sibling `contentEncoding` reports the decode failure.
                    None => true,
                };
                if !valid {
                    let mut info = Map::new();
                    info.insert("actual".to_string(), ctx.instance.clone());
                    info.insert(
                        "contentMediaType".to_string(),
                        Value::String(self.media_type.clone()),
                    );
                    return ValidationResult::failure(
                        ctx,
                        "contentMediaType",
                        "{{actual}} is not valid {{contentMediaType}} content",
                        info,
                    );
                }
            }
        }
        ValidationResult::annotation(
            ctx,
            "contentMediaType",
            Value::String(self.media_type.clone()),
        )
    }

    fn to_json(&self) -> Value {
        Value::String(self.media_type.clone())
    }
}

impl fmt::Display for ContentMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contentMediaType: {}", self.media_type)
    }
}

#[inline]
pub(crate) fn compile_media_type(
    parent: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    let media_type = match schema {
        Value::String(media_type) => media_type,
        _ => {
            return Some(Err(SchemaError::parse(
                "contentMediaType",
                "expected a string",
            )))
        }
    };
    let check = context
        .config
        .custom_media_type(media_type)
        .or_else(|| DEFAULT_CONTENT_MEDIA_TYPE_CHECKS.get(media_type.as_str()).copied());
    let converter = parent
        .get("contentEncoding")
        .and_then(Value::as_str)
        .and_then(|encoding| encoding_pair(encoding, context))
        .map(|(_, converter)| converter);
    Some(Ok(Box::new(ContentMediaType {
        media_type: media_type.clone(),
        check,
        converter,
        assert: context.config.validate_content(),
    })))
}

pub(crate) struct ContentEncoding {
    encoding: String,
    check: Option<ContentEncodingCheckType>,
    assert: bool,
}

impl Keyword for ContentEncoding {
    fn name(&self) -> &'static str {
        "contentEncoding"
    }

    fn drafts(&self) -> DraftSet {
        DraftSet::DRAFT7_UP
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Content
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        if self.assert {
            if let (Some(check), Value::String(item)) = (self.check, ctx.instance) {
                if !check(item) {
                    let mut info = Map::new();
                    info.insert("actual".to_string(), ctx.instance.clone());
                    info.insert(
                        "contentEncoding".to_string(),
                        Value::String(self.encoding.clone()),
                    );
                    return ValidationResult::failure(
                        ctx,
                        "contentEncoding",
                        "{{actual}} is not encoded as {{contentEncoding}}",
                        info,
                    );
                }
            }
        }
        ValidationResult::annotation(
            ctx,
            "contentEncoding",
            Value::String(self.encoding.clone()),
        )
    }

    fn to_json(&self) -> Value {
        Value::String(self.encoding.clone())
    }
}

impl fmt::Display for ContentEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contentEncoding: {}", self.encoding)
    }
}

#[inline]
pub(crate) fn compile_content_encoding(
    _: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    let encoding = match schema {
        Value::String(encoding) => encoding,
        _ => {
            return Some(Err(SchemaError::parse(
                "contentEncoding",
                "expected a string",
            )))
        }
    };
    Some(Ok(Box::new(ContentEncoding {
        encoding: encoding.clone(),
        check: encoding_pair(encoding, context).map(|(check, _)| check),
        assert: context.config.validate_content(),
    })))
}

/// 2019-09 `contentSchema`: applies a schema to the decoded, parsed content.
pub(crate) struct ContentSchema {
    schema: SchemaDocument,
    is_json: bool,
    converter: Option<ContentEncodingConverterType>,
    assert: bool,
}

impl Keyword for ContentSchema {
    fn name(&self) -> &'static str {
        "contentSchema"
    }

    fn drafts(&self) -> DraftSet {
        DraftSet::DRAFT201909_ONLY
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Content
    }

    fn sequence(&self) -> u8 {
        sequence::DEPENDENTS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        if !self.assert || !self.is_json {
            return ValidationResult::annotation(ctx, "contentSchema", self.schema.to_json());
        }
        let item = match ctx.instance {
            Value::String(item) => item,
            _ => return ValidationResult::annotation(ctx, "contentSchema", self.schema.to_json()),
        };
        let content = match self.converter {
            Some(converter) => match converter(item) {
                Some(content) => content,
                // The sibling `contentEncoding` reports the decode failure.
                None => {
                    return ValidationResult::annotation(ctx, "contentSchema", self.schema.to_json())
                }
            },
            None => item.clone(),
        };
        let parsed: Value = match serde_json::from_str(&content) {
            Ok(parsed) => parsed,
            Err(_) => {
                let mut info = Map::new();
                info.insert("actual".to_string(), ctx.instance.clone());
                return ValidationResult::failure(
                    ctx,
                    "contentSchema",
                    "{{actual}} does not decode to JSON content",
                    info,
                );
            }
        };
        let mut child = ValidationContext {
            state: ctx.state,
            instance: &parsed,
            instance_location: ctx.instance_location.clone(),
            relative_location: ctx
                .relative_location
                .extend_with(&[PathChunk::from("contentSchema")]),
            base_relative_location: ctx
                .base_relative_location
                .as_ref()
                .map(|location| location.extend_with(&[PathChunk::from("contentSchema")])),
            base_uri: ctx.base_uri.clone(),
            recursive_anchor: ctx.recursive_anchor.clone(),
            misc: AHashMap::new(),
            evaluated_properties: AHashSet::new(),
            evaluated_items: 0,
        };
        let nested = self.schema.validate(&mut child);
        let mut result = ValidationResult::success(ctx, "contentSchema");
        result.push(nested);
        result
    }

    fn register_subschemas(&self, scope: &Url, location: &JSONPointer, ids: &mut LocalIds) {
        self.schema
            .collect_ids(scope, &location.join("contentSchema"), ids);
    }

    fn resolve_subschema(&self, chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        self.schema.resolve_pointer(chunks)
    }

    fn to_json(&self) -> Value {
        self.schema.to_json()
    }
}

impl fmt::Display for ContentSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contentSchema: {}", self.schema)
    }
}

#[inline]
pub(crate) fn compile_content_schema(
    parent: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    let is_json = parent.get("contentMediaType").and_then(Value::as_str) == Some("application/json");
    let converter = parent
        .get("contentEncoding")
        .and_then(Value::as_str)
        .and_then(|encoding| encoding_pair(encoding, context))
        .map(|(_, converter)| converter);
    match SchemaDocument::from_value(schema, context) {
        Ok(document) => Some(Ok(Box::new(ContentSchema {
            schema: document,
            is_json,
            converter,
            assert: context.config.validate_content(),
        }))),
        Err(error) => Some(Err(error)),
    }
}

#[cfg(test)]
mod tests {
    use crate::Schema;
    use serde_json::json;

    #[test]
    fn content_keywords_annotate_by_default() {
        let compiled = Schema::parse(&json!({
            "contentEncoding": "base64",
            "contentMediaType": "application/json"
        }))
        .unwrap();
        assert!(compiled.is_valid(&json!("not base64!")));
    }

    #[test]
    fn content_encoding_asserts_when_enabled() {
        let compiled = Schema::options()
            .should_validate_content(true)
            .parse(&json!({"contentEncoding": "base64"}))
            .unwrap();
        assert!(compiled.is_valid(&json!("YWJj")));
        assert!(!compiled.is_valid(&json!("a=b")));
        assert!(compiled.is_valid(&json!(42)));
    }

    #[test]
    fn content_media_type_checks_decoded_content() {
        let compiled = Schema::options()
            .should_validate_content(true)
            .parse(&json!({
                "contentEncoding": "base64",
                "contentMediaType": "application/json"
            }))
            .unwrap();
        // base64 of `{"a": 1}`
        assert!(compiled.is_valid(&json!("eyJhIjogMX0=")));
        // base64 of `not json`
        assert!(!compiled.is_valid(&json!("bm90IGpzb24=")));
    }

    #[test]
    fn content_schema_applies_to_parsed_content() {
        let compiled = Schema::options()
            .should_validate_content(true)
            .parse(&json!({
                "contentMediaType": "application/json",
                "contentSchema": {"required": ["a"]}
            }))
            .unwrap();
        assert!(compiled.is_valid(&json!("{\"a\": 1}")));
        assert!(!compiled.is_valid(&json!("{\"b\": 1}")));
    }
}
