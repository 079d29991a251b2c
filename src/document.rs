//! Parsed schema documents and the evaluation driver.
use crate::{
    context::{ValidationContext, ValidationState},
    error::SchemaError,
    keyword::{BoxedKeyword, LocalIds},
    options::ValidationOptions,
    output::{Output, OutputFormat},
    paths::{JSONPointer, PathChunk},
    registry::SchemaRegistry,
    result::ValidationResult,
    schemas::{Draft, Vocabulary, VocabularySet},
};
use ahash::{AHashMap, AHashSet};
use serde_json::{Map, Value};
use std::{cell::RefCell, fmt, sync::Arc};
use url::Url;

pub(crate) const DEFAULT_ROOT_URL: &str = "json-schema:///";

lazy_static::lazy_static! {
    pub(crate) static ref DEFAULT_SCOPE: Url =
        Url::parse(DEFAULT_ROOT_URL).expect("Is a valid URL");
}

/// Context threaded through schema parsing.
pub(crate) struct ParseContext<'a> {
    pub(crate) draft: Draft,
    pub(crate) config: &'a ValidationOptions,
    pub(crate) vocabularies: VocabularySet,
}

impl<'a> ParseContext<'a> {
    /// Whether keywords of `vocabulary` assert under this parse. Outside
    /// 2019-09 everything asserts; the format vocabulary is re-enabled when
    /// format assertion was explicitly requested.
    pub(crate) fn keyword_enabled(&self, vocabulary: Vocabulary) -> bool {
        if self.draft != Draft::Draft201909 {
            return true;
        }
        if self.vocabularies.enabled(vocabulary) {
            return true;
        }
        vocabulary == Vocabulary::Format && self.config.validate_format()
    }
}

/// The composite parsed form of one schema document: its keyword set plus the
/// resolution metadata (`$id`, `$anchor`, `$recursiveAnchor`, `$schema`).
///
/// Immutable after parse; reference targets inside it are resolved lazily at
/// evaluation time.
pub struct SchemaDocument {
    bool_form: Option<bool>,
    id: Option<String>,
    anchor: Option<String>,
    recursive_anchor: bool,
    metaschema: Option<String>,
    draft: Draft,
    /// Pre-2019-09 `$ref` suppression: siblings parse but only `$ref` runs.
    ref_only: bool,
    keywords: Vec<BoxedKeyword>,
    /// Unknown keywords are silently preserved and emitted as annotations,
    /// never failing validation.
    unknown: Vec<(String, Value)>,
    /// Absolute URI -> pointer of the subschema carrying it. Populated on the
    /// document a parse started from.
    local_ids: LocalIds,
}

impl SchemaDocument {
    pub(crate) fn from_value(
        schema: &Value,
        context: &ParseContext<'_>,
    ) -> Result<SchemaDocument, SchemaError> {
        match schema {
            Value::Bool(value) => Ok(SchemaDocument {
                bool_form: Some(*value),
                id: None,
                anchor: None,
                recursive_anchor: false,
                metaschema: None,
                draft: context.draft,
                ref_only: false,
                keywords: Vec::new(),
                unknown: Vec::new(),
                local_ids: AHashMap::new(),
            }),
            Value::Object(object) => SchemaDocument::from_object(object, context),
            _ => Err(SchemaError::parse(
                "schema",
                "expected a boolean or an object",
            )),
        }
    }

    fn from_object(
        object: &Map<String, Value>,
        context: &ParseContext<'_>,
    ) -> Result<SchemaDocument, SchemaError> {
        let draft = context.draft;
        let metaschema = object
            .get("$schema")
            .and_then(Value::as_str)
            .map(String::from);
        let id = object
            .get(draft.id_key())
            .and_then(Value::as_str)
            .map(String::from);
        let (anchor, recursive_anchor) = if draft == Draft::Draft201909 {
            (
                object
                    .get("$anchor")
                    .and_then(Value::as_str)
                    .map(String::from),
                object.get("$recursiveAnchor") == Some(&Value::Bool(true)),
            )
        } else {
            (None, false)
        };

        let mut keywords: Vec<BoxedKeyword> = Vec::with_capacity(object.len());
        let mut unknown = Vec::new();
        // Before 2019-09 a `$ref` suppresses its siblings. They still parse
        // (pointer fragments may resolve through them), but a sibling that
        // rejects its value degrades to an annotation instead of failing.
        let ref_only = draft != Draft::Draft201909 && object.contains_key("$ref");
        if ref_only && !matches!(object.get("$ref"), Some(Value::String(_))) {
            return Err(SchemaError::parse("$ref", "expected a string"));
        }

        for (keyword, value) in object {
            if SchemaDocument::is_core_metadata(keyword, draft) {
                continue;
            }
            match draft.get_keyword(keyword).map(|f| f(object, value, context)) {
                Some(Some(Ok(compiled))) => {
                    if context.keyword_enabled(compiled.vocabulary()) {
                        keywords.push(compiled);
                    } else {
                        unknown.push((keyword.clone(), value.clone()));
                    }
                }
                Some(Some(Err(error))) => {
                    if ref_only && keyword != "$ref" {
                        unknown.push((keyword.clone(), value.clone()));
                    } else {
                        return Err(error);
                    }
                }
                // Consumed by a sibling keyword (e.g. the draft 4 boolean
                // form of `exclusiveMinimum`).
                Some(None) => {}
                None => unknown.push((keyword.clone(), value.clone())),
            }
        }

        Ok(SchemaDocument {
            bool_form: None,
            id,
            anchor,
            recursive_anchor,
            metaschema,
            draft,
            ref_only,
            keywords,
            unknown,
            local_ids: AHashMap::new(),
        })
    }

    fn is_core_metadata(keyword: &str, draft: Draft) -> bool {
        if keyword == "$schema" || keyword == draft.id_key() {
            return true;
        }
        draft == Draft::Draft201909 && (keyword == "$anchor" || keyword == "$recursiveAnchor")
    }

    /// Drive every keyword of this document against the context's instance.
    ///
    /// Keywords run ordered by `(evaluation tier, insertion order)` so that
    /// consumers of the annotation channel see their producers' output.
    /// Under `Flag` output evaluation stops at the first failing keyword.
    pub(crate) fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        if let Some(valid) = self.bool_form {
            let mut result = ValidationResult::composite(ctx, Vec::new());
            if !valid {
                result.set_invalid("Everything is invalid for `false` schema", Map::new());
            }
            return result;
        }

        if let Some(id) = &self.id {
            let scope = Url::options().base_url(Some(&ctx.base_uri)).parse(id);
            if let Ok(scope) = scope {
                ctx.base_uri = scope;
            }
        }
        if self.recursive_anchor && ctx.recursive_anchor.is_none() {
            // The outermost dynamic scope wins.
            let mut anchor = ctx.base_uri.clone();
            anchor.set_fragment(None);
            ctx.recursive_anchor = Some(anchor);
        }

        let mut order: Vec<usize> = (0..self.keywords.len()).collect();
        order.sort_by_key(|&index| (self.keywords[index].sequence(), index));

        let mut nested = Vec::with_capacity(self.keywords.len() + self.unknown.len());
        let mut valid = true;
        for index in order {
            if self.ref_only && self.keywords[index].name() != "$ref" {
                continue;
            }
            let result = self.keywords[index].validate(ctx);
            valid = valid && result.is_valid();
            nested.push(result);
            if !valid && ctx.flag() {
                break;
            }
        }
        if !ctx.flag() {
            for (keyword, value) in &self.unknown {
                nested.push(ValidationResult::annotation(ctx, keyword, value.clone()));
            }
        }
        ValidationResult::composite(ctx, nested)
    }

    /// Walk the document and record every identifier under its absolute URI.
    /// Subschemas whose `$id` does not parse are skipped; references to them
    /// fail at evaluation time instead.
    pub(crate) fn collect_ids(&self, scope: &Url, location: &JSONPointer, ids: &mut LocalIds) {
        let scope = match &self.id {
            Some(id) => match Url::options().base_url(Some(scope)).parse(id) {
                Ok(mut resolved) => {
                    if let Some("") = resolved.fragment() {
                        resolved.set_fragment(None);
                    }
                    ids.insert(
                        resolved.as_str().trim_end_matches('#').to_string(),
                        location.clone(),
                    );
                    resolved
                }
                Err(_) => return,
            },
            None => scope.clone(),
        };
        if let Some(anchor) = &self.anchor {
            let mut anchored = scope.clone();
            anchored.set_fragment(Some(anchor));
            ids.insert(anchored.as_str().to_string(), location.clone());
        }
        for keyword in &self.keywords {
            keyword.register_subschemas(&scope, location, ids);
        }
    }

    pub(crate) fn set_local_ids(&mut self, ids: LocalIds) {
        self.local_ids = ids;
    }

    pub(crate) fn local_ids(&self) -> &LocalIds {
        &self.local_ids
    }

    /// Walk the keyword tree along a JSON Pointer.
    pub(crate) fn resolve_pointer(&self, chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        let (head, rest) = match chunks.split_first() {
            Some(split) => split,
            None => return Some(self),
        };
        let name = match head {
            PathChunk::Name(name) => name.as_str(),
            PathChunk::Index(_) => return None,
        };
        self.keywords
            .iter()
            .find(|keyword| keyword.name() == name)?
            .resolve_subschema(rest)
    }

    /// Serialize the document back to JSON. Round-trips the parsed input up
    /// to keyword ordering.
    pub fn to_json(&self) -> Value {
        if let Some(value) = self.bool_form {
            return Value::Bool(value);
        }
        let mut map = Map::new();
        if let Some(metaschema) = &self.metaschema {
            map.insert("$schema".to_string(), Value::String(metaschema.clone()));
        }
        if let Some(id) = &self.id {
            map.insert(self.draft.id_key().to_string(), Value::String(id.clone()));
        }
        if let Some(anchor) = &self.anchor {
            map.insert("$anchor".to_string(), Value::String(anchor.clone()));
        }
        if self.recursive_anchor {
            map.insert("$recursiveAnchor".to_string(), Value::Bool(true));
        }
        for keyword in &self.keywords {
            map.insert(keyword.name().to_string(), keyword.to_json());
        }
        for (keyword, value) in &self.unknown {
            map.insert(keyword.clone(), value.clone());
        }
        Value::Object(map)
    }

    /// Structural equality.
    pub fn equals(&self, other: &SchemaDocument) -> bool {
        self.to_json() == other.to_json()
    }

    /// The draft this document parsed under.
    pub fn draft(&self) -> Draft {
        self.draft
    }

    /// `Some` when the document is literally `true` or `false`.
    pub fn bool_form(&self) -> Option<bool> {
        self.bool_form
    }

    /// The raw `$id` (or draft 4 `id`) value.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The declared `$schema` URI.
    pub fn metaschema(&self) -> Option<&str> {
        self.metaschema.as_deref()
    }
}

impl fmt::Display for SchemaDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bool_form {
            Some(true) => f.write_str("true"),
            Some(false) => f.write_str("false"),
            None => write!(
                f,
                "{{{}}}",
                self.keywords
                    .iter()
                    .map(|keyword| format!("{:?}", keyword))
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
        }
    }
}

impl fmt::Debug for SchemaDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A parsed schema bound to its configuration, ready to validate instances.
#[derive(Debug)]
pub struct Schema {
    pub(crate) root: Arc<SchemaDocument>,
    pub(crate) config: Arc<ValidationOptions>,
    pub(crate) scope: Url,
    pub(crate) root_base: Url,
}

impl Schema {
    /// Return a default [`ValidationOptions`] that can configure parsing and
    /// evaluation.
    ///
    /// ```rust
    /// # use jsonschema_eval::{Draft, Schema};
    /// # let schema = serde_json::json!({});
    /// let maybe_schema: Result<Schema, _> = Schema::options()
    ///     .with_draft(Draft::Draft7)
    ///     .parse(&schema);
    /// ```
    #[must_use]
    pub fn options() -> ValidationOptions {
        ValidationOptions::default()
    }

    /// Parse `schema` with the default configuration.
    pub fn parse(schema: &Value) -> Result<Schema, SchemaError> {
        Self::options().parse(schema)
    }

    /// Evaluate `instance` and return the result tree. The configured output
    /// format decides whether evaluation short-circuits.
    pub fn validate(&self, instance: &Value) -> ValidationResult {
        self.run(instance, self.config.output_format() == OutputFormat::Flag)
    }

    /// Evaluate `instance` and only report whether it passed. This is the
    /// fastest path: evaluation stops at the first failure.
    #[must_use]
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.run(instance, true).is_valid()
    }

    /// Apply the schema and choose the output format afterwards.
    ///
    /// ```rust
    /// # use jsonschema_eval::Schema;
    /// # use serde_json::json;
    /// let schema = Schema::parse(&json!({"type": "string"})).expect("Valid schema");
    /// let instance = json!("a string");
    /// let output = schema.apply(&instance);
    /// assert!(output.flag());
    /// ```
    pub const fn apply<'a, 'b>(&'a self, instance: &'b Value) -> Output<'a, 'b> {
        Output::new(self, instance)
    }

    pub(crate) fn run(&self, instance: &Value, flag: bool) -> ValidationResult {
        let state = ValidationState {
            config: self.config.as_ref(),
            registry: self.config.registry_handle(),
            root: Arc::clone(&self.root),
            root_uri: self.root_base.clone(),
            flag,
            in_flight: RefCell::new(AHashSet::new()),
            documents: RefCell::new(AHashMap::new()),
        };
        let mut ctx = ValidationContext::new_root(&state, instance, self.scope.clone());
        self.root.validate(&mut ctx)
    }

    /// The [`Draft`] this schema parsed under.
    pub fn draft(&self) -> Draft {
        self.root.draft()
    }

    /// The [`ValidationOptions`] bound to this schema.
    pub fn config(&self) -> Arc<ValidationOptions> {
        Arc::clone(&self.config)
    }

    /// Serialize the parsed schema back to JSON.
    pub fn to_json(&self) -> Value {
        self.root.to_json()
    }
}
