//! The keyword abstraction: every schema keyword is a small immutable value
//! implementing [`Keyword`].
use crate::{
    context::ValidationContext,
    document::SchemaDocument,
    error::SchemaError,
    paths::{JSONPointer, PathChunk},
    result::ValidationResult,
    schemas::{DraftSet, Vocabulary},
};
use ahash::AHashMap;
use serde_json::Value;
use std::fmt;
use url::Url;

/// Evaluation order tiers. Lower runs earlier; within a tier the schema's
/// insertion order decides. Later tiers read annotations written by earlier
/// ones, so the ordering is load-bearing:
/// `if` must run before `then`/`else`, `contains` before `minContains`,
/// every applicator before `unevaluated*`.
pub(crate) mod sequence {
    pub(crate) const IDENTIFIERS: u8 = 0;
    pub(crate) const ASSERTIONS: u8 = 10;
    pub(crate) const APPLICATORS: u8 = 20;
    pub(crate) const DEPENDENTS: u8 = 30;
    pub(crate) const UNEVALUATED: u8 = 40;
}

pub(crate) type KeywordResult = Result<BoxedKeyword, SchemaError>;
pub(crate) type BoxedKeyword = Box<dyn Keyword>;

/// Identifiers discovered while walking a document: absolute URI to the
/// pointer of the subschema carrying it.
pub(crate) type LocalIds = AHashMap<String, JSONPointer>;

pub(crate) trait Keyword: Send + Sync + fmt::Display {
    /// The name this keyword appears under in a schema object.
    fn name(&self) -> &'static str;

    /// Drafts in which the keyword asserts.
    fn drafts(&self) -> DraftSet {
        DraftSet::ALL
    }

    /// The 2019-09 vocabulary the keyword belongs to.
    fn vocabulary(&self) -> Vocabulary;

    /// Evaluation order tier, see [`sequence`].
    fn sequence(&self) -> u8 {
        sequence::ASSERTIONS
    }

    /// Evaluate the keyword against the context's instance.
    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult;

    /// Walk owned subschemas and record every `$id`/`$anchor` under its
    /// absolute URI. `location` is the pointer of this keyword's parent.
    fn register_subschemas(&self, _scope: &Url, _location: &JSONPointer, _ids: &mut LocalIds) {}

    /// Walk owned subschemas along a JSON Pointer. `chunks` are the pointer
    /// components after this keyword's own name.
    fn resolve_subschema(&self, _chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        None
    }

    /// The keyword's value, for round-tripping the schema back to JSON.
    fn to_json(&self) -> Value;

    /// Structural equality with another keyword.
    fn equals(&self, other: &dyn Keyword) -> bool {
        self.name() == other.name() && self.to_json() == other.to_json()
    }
}

impl fmt::Debug for dyn Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string())
    }
}

pub(crate) fn format_documents(documents: &[SchemaDocument]) -> String {
    documents
        .iter()
        .map(|document| format!("{}", document))
        .collect::<Vec<String>>()
        .join(", ")
}

pub(crate) fn format_key_value_documents(documents: &[(String, SchemaDocument)]) -> String {
    documents
        .iter()
        .map(|(name, document)| format!("{}: {}", name, document))
        .collect::<Vec<String>>()
        .join(", ")
}
