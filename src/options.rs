//! Configuration of the evaluation engine.
use crate::{
    content_encoding::{ContentEncodingCheckType, ContentEncodingConverterType},
    content_media_type::ContentMediaTypeCheckType,
    document::{ParseContext, SchemaDocument, DEFAULT_SCOPE},
    error::SchemaError,
    output::OutputFormat,
    paths::JSONPointer,
    registry::{global_registry, SchemaRegistry},
    resolver::{DefaultResolver, SchemaResolver},
    schemas::{draft_from_schema, Draft, VocabularySet},
    Schema,
};
use ahash::AHashMap;
use serde_json::Value;
use std::{fmt, sync::Arc};
use url::Url;

type ChildErrorPolicy = dyn Fn(&str, &JSONPointer) -> bool + Send + Sync;

/// Full configuration to guide schema parsing and instance evaluation.
///
/// Using a `ValidationOptions` instance you can configure the draft fallback,
/// the output format, `format` assertion behavior, content validation, custom
/// formats and the reference-resolution machinery:
///
/// ```rust
/// # use jsonschema_eval::{Draft, Schema, SchemaError};
/// # use serde_json::json;
/// # fn foo() -> Result<(), SchemaError> {
/// # let schema = json!({"maxLength": 5});
/// let compiled = Schema::options()
///     .with_draft(Draft::Draft7)
///     .parse(&schema)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ValidationOptions {
    draft: Option<Draft>,
    output_format: OutputFormat,
    validate_format: bool,
    ignore_unknown_formats: bool,
    validate_content: bool,
    refresh_remote: bool,
    resolver: Arc<dyn SchemaResolver>,
    registry: Option<Arc<SchemaRegistry>>,
    formats: AHashMap<String, fn(&str) -> bool>,
    content_media_type_checks: AHashMap<String, ContentMediaTypeCheckType>,
    content_encoding_checks:
        AHashMap<String, (ContentEncodingCheckType, ContentEncodingConverterType)>,
    report_child_errors: Option<Arc<ChildErrorPolicy>>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            draft: None,
            output_format: OutputFormat::Basic,
            validate_format: false,
            ignore_unknown_formats: true,
            validate_content: false,
            refresh_remote: false,
            resolver: Arc::new(DefaultResolver),
            registry: None,
            formats: AHashMap::new(),
            content_media_type_checks: AHashMap::new(),
            content_encoding_checks: AHashMap::new(),
            report_child_errors: None,
        }
    }
}

impl ValidationOptions {
    /// Use `draft` when a schema does not carry a recognized `$schema`.
    /// Without an override the engine falls back to Draft 2019-09.
    #[must_use]
    pub fn with_draft(mut self, draft: Draft) -> Self {
        self.draft = Some(draft);
        self
    }

    /// Select the output format produced by [`Schema::validate`].
    /// `Flag` enables short-circuiting at the first failure.
    #[must_use]
    pub fn with_output_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = output_format;
        self
    }

    /// Treat `format` as an assertion instead of an annotation.
    #[must_use]
    pub fn should_validate_formats(mut self, validate_format: bool) -> Self {
        self.validate_format = validate_format;
        self
    }

    /// When `false`, parsing a schema with an unknown `format` fails,
    /// provided formats are asserted.
    #[must_use]
    pub fn should_ignore_unknown_formats(mut self, ignore: bool) -> Self {
        self.ignore_unknown_formats = ignore;
        self
    }

    /// Assert `content*` keywords instead of only annotating.
    #[must_use]
    pub fn should_validate_content(mut self, validate_content: bool) -> Self {
        self.validate_content = validate_content;
        self
    }

    /// Re-invoke the resolver on every remote lookup, bypassing cached copies.
    #[must_use]
    pub fn refresh_user_resolver(mut self, refresh: bool) -> Self {
        self.refresh_remote = refresh;
        self
    }

    /// Register a custom `format` validator.
    #[must_use]
    pub fn with_format(mut self, name: impl Into<String>, check: fn(&str) -> bool) -> Self {
        self.formats.insert(name.into(), check);
        self
    }

    /// Register a custom `contentMediaType` check.
    #[must_use]
    pub fn with_content_media_type(
        mut self,
        media_type: impl Into<String>,
        check: ContentMediaTypeCheckType,
    ) -> Self {
        self.content_media_type_checks
            .insert(media_type.into(), check);
        self
    }

    /// Register a custom `contentEncoding` check and converter pair.
    #[must_use]
    pub fn with_content_encoding(
        mut self,
        encoding: impl Into<String>,
        check: ContentEncodingCheckType,
        converter: ContentEncodingConverterType,
    ) -> Self {
        self.content_encoding_checks
            .insert(encoding.into(), (check, converter));
        self
    }

    /// Use a custom resolver for external references.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl SchemaResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Use a private registry instead of the process-wide one.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<SchemaRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Policy hook deciding whether failing branches of combinator keywords
    /// carry their nested errors in the output. Receives the keyword name and
    /// the instance location.
    #[must_use]
    pub fn should_report_child_errors(
        mut self,
        policy: impl Fn(&str, &JSONPointer) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.report_child_errors = Some(Arc::new(policy));
        self
    }

    /// Parse `schema` into a [`Schema`] carrying this configuration.
    pub fn parse(&self, schema: &Value) -> Result<Schema, SchemaError> {
        let (draft, vocabularies) = self.detect(schema);
        let parse_context = ParseContext {
            draft,
            config: self,
            vocabularies,
        };
        let mut root = SchemaDocument::from_value(schema, &parse_context)?;
        let scope: Url = DEFAULT_SCOPE.clone();
        let mut ids = AHashMap::new();
        root.collect_ids(&scope, &JSONPointer::default(), &mut ids);
        root.set_local_ids(ids);
        let root_base = match root.id() {
            Some(id) => Url::options().base_url(Some(&scope)).parse(id)?,
            None => scope.clone(),
        };
        Ok(Schema {
            root: Arc::new(root),
            config: Arc::new(self.clone()),
            scope,
            root_base,
        })
    }

    /// The draft and vocabulary set a document parses under.
    pub(crate) fn detect(&self, schema: &Value) -> (Draft, VocabularySet) {
        let draft = draft_from_schema(schema).unwrap_or_else(|| self.draft.unwrap_or_default());
        let vocabularies = if draft == Draft::Draft201909 {
            schema
                .get("$schema")
                .and_then(Value::as_str)
                .and_then(|uri| self.registry_handle().get(uri))
                .map_or_else(VocabularySet::default, |metaschema| {
                    VocabularySet::from_metaschema(&metaschema)
                })
        } else {
            VocabularySet::default()
        };
        (draft, vocabularies)
    }

    pub(crate) fn default_draft(&self) -> Draft {
        self.draft.unwrap_or_default()
    }

    pub(crate) fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub(crate) fn validate_format(&self) -> bool {
        self.validate_format
    }

    pub(crate) fn ignore_unknown_formats(&self) -> bool {
        self.ignore_unknown_formats
    }

    pub(crate) fn validate_content(&self) -> bool {
        self.validate_content
    }

    pub(crate) fn refresh_remote(&self) -> bool {
        self.refresh_remote
    }

    pub(crate) fn resolver(&self) -> &dyn SchemaResolver {
        self.resolver.as_ref()
    }

    pub(crate) fn registry_handle(&self) -> &SchemaRegistry {
        match &self.registry {
            Some(registry) => registry.as_ref(),
            None => global_registry(),
        }
    }

    pub(crate) fn custom_format(&self, name: &str) -> Option<fn(&str) -> bool> {
        self.formats.get(name).copied()
    }

    pub(crate) fn custom_media_type(&self, name: &str) -> Option<ContentMediaTypeCheckType> {
        self.content_media_type_checks.get(name).copied()
    }

    pub(crate) fn custom_encoding(
        &self,
        name: &str,
    ) -> Option<(ContentEncodingCheckType, ContentEncodingConverterType)> {
        self.content_encoding_checks.get(name).copied()
    }

    pub(crate) fn child_error_policy(&self) -> Option<&ChildErrorPolicy> {
        self.report_child_errors.as_deref()
    }
}

impl fmt::Debug for ValidationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationOptions")
            .field("draft", &self.draft)
            .field("output_format", &self.output_format)
            .field("validate_format", &self.validate_format)
            .field("ignore_unknown_formats", &self.ignore_unknown_formats)
            .field("validate_content", &self.validate_content)
            .field("refresh_remote", &self.refresh_remote)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn draft_detection_prefers_schema_declaration() {
        let options = ValidationOptions::default().with_draft(Draft::Draft4);
        let (draft, _) = options.detect(&json!({"$schema": "http://json-schema.org/draft-07/schema#"}));
        assert_eq!(draft, Draft::Draft7);
        let (draft, _) = options.detect(&json!({}));
        assert_eq!(draft, Draft::Draft4);
    }

    #[test]
    fn default_draft_is_2019_09() {
        let options = ValidationOptions::default();
        let (draft, _) = options.detect(&json!({}));
        assert_eq!(draft, Draft::Draft201909);
    }
}
