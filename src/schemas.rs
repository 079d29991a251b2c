//! Draft versions, vocabularies and the keyword catalog.
use crate::{document::ParseContext, keyword::KeywordResult, keywords};
use serde_json::{Map, Value};

/// JSON Schema Draft version.
#[derive(Debug, PartialEq, Copy, Clone, Hash, Eq)]
pub enum Draft {
    /// JSON Schema Draft 4
    Draft4,
    /// JSON Schema Draft 6
    Draft6,
    /// JSON Schema Draft 7
    Draft7,
    /// JSON Schema Draft 2019-09
    Draft201909,
}

impl Default for Draft {
    fn default() -> Self {
        Draft::Draft201909
    }
}

type ParseFunc = fn(&Map<String, Value>, &Value, &ParseContext) -> Option<KeywordResult>;

impl Draft {
    /// The key under which a schema declares its identifier in this draft.
    pub(crate) const fn id_key(self) -> &'static str {
        match self {
            Draft::Draft4 => "id",
            Draft::Draft6 | Draft::Draft7 | Draft::Draft201909 => "$id",
        }
    }

    pub(crate) fn get_keyword(self, keyword: &str) -> Option<ParseFunc> {
        match keyword {
            "additionalItems" => Some(keywords::additional_items::compile),
            "additionalProperties" => Some(keywords::additional_properties::compile),
            "allOf" => Some(keywords::all_of::compile),
            "anyOf" => Some(keywords::any_of::compile),
            "const" => match self {
                Draft::Draft4 => None,
                _ => Some(keywords::const_::compile),
            },
            "contains" => match self {
                Draft::Draft4 => None,
                _ => Some(keywords::contains::compile),
            },
            "contentEncoding" => match self {
                Draft::Draft7 | Draft::Draft201909 => {
                    Some(keywords::content::compile_content_encoding)
                }
                _ => None,
            },
            "contentMediaType" => match self {
                Draft::Draft7 | Draft::Draft201909 => Some(keywords::content::compile_media_type),
                _ => None,
            },
            "contentSchema" => match self {
                Draft::Draft201909 => Some(keywords::content::compile_content_schema),
                _ => None,
            },
            "default" => Some(keywords::metadata::compile_default),
            "$defs" => match self {
                Draft::Draft201909 => Some(keywords::defs::compile_defs),
                _ => None,
            },
            "definitions" => Some(keywords::defs::compile_definitions),
            "dependencies" => match self {
                Draft::Draft201909 => None,
                _ => Some(keywords::dependencies::compile),
            },
            "dependentRequired" => match self {
                Draft::Draft201909 => Some(keywords::dependent_required::compile),
                _ => None,
            },
            "dependentSchemas" => match self {
                Draft::Draft201909 => Some(keywords::dependencies::compile_dependent_schemas),
                _ => None,
            },
            "deprecated" => match self {
                Draft::Draft201909 => Some(keywords::metadata::compile_deprecated),
                _ => None,
            },
            "description" => Some(keywords::metadata::compile_description),
            "else" => match self {
                Draft::Draft7 | Draft::Draft201909 => Some(keywords::if_::compile_else),
                _ => None,
            },
            "enum" => Some(keywords::enum_::compile),
            "examples" => match self {
                Draft::Draft4 => None,
                _ => Some(keywords::metadata::compile_examples),
            },
            "exclusiveMaximum" => match self {
                // Boolean form, consumed by `maximum`
                Draft::Draft4 => None,
                _ => Some(keywords::exclusive_maximum::compile),
            },
            "exclusiveMinimum" => match self {
                Draft::Draft4 => None,
                _ => Some(keywords::exclusive_minimum::compile),
            },
            "format" => Some(keywords::format::compile),
            "if" => match self {
                Draft::Draft7 | Draft::Draft201909 => Some(keywords::if_::compile),
                _ => None,
            },
            "items" => Some(keywords::items::compile),
            "maxContains" => match self {
                Draft::Draft201909 => Some(keywords::contains::compile_max_contains),
                _ => None,
            },
            "maximum" => Some(keywords::maximum::compile),
            "maxItems" => Some(keywords::max_items::compile),
            "maxLength" => Some(keywords::max_length::compile),
            "maxProperties" => Some(keywords::max_properties::compile),
            "minContains" => match self {
                Draft::Draft201909 => Some(keywords::contains::compile_min_contains),
                _ => None,
            },
            "minimum" => Some(keywords::minimum::compile),
            "minItems" => Some(keywords::min_items::compile),
            "minLength" => Some(keywords::min_length::compile),
            "minProperties" => Some(keywords::min_properties::compile),
            "multipleOf" => Some(keywords::multiple_of::compile),
            "not" => Some(keywords::not::compile),
            "oneOf" => Some(keywords::one_of::compile),
            "pattern" => Some(keywords::pattern::compile),
            "patternProperties" => Some(keywords::pattern_properties::compile),
            "properties" => Some(keywords::properties::compile),
            "propertyNames" => match self {
                Draft::Draft4 => None,
                _ => Some(keywords::property_names::compile),
            },
            "readOnly" => match self {
                Draft::Draft7 | Draft::Draft201909 => Some(keywords::metadata::compile_read_only),
                _ => None,
            },
            "$recursiveRef" => match self {
                Draft::Draft201909 => Some(keywords::ref_::compile_recursive),
                _ => None,
            },
            "$ref" => Some(keywords::ref_::compile),
            "required" => Some(keywords::required::compile),
            "then" => match self {
                Draft::Draft7 | Draft::Draft201909 => Some(keywords::if_::compile_then),
                _ => None,
            },
            "title" => Some(keywords::metadata::compile_title),
            "type" => Some(keywords::type_::compile),
            "unevaluatedItems" => match self {
                Draft::Draft201909 => Some(keywords::unevaluated_items::compile),
                _ => None,
            },
            "unevaluatedProperties" => match self {
                Draft::Draft201909 => Some(keywords::unevaluated_properties::compile),
                _ => None,
            },
            "uniqueItems" => Some(keywords::unique_items::compile),
            "writeOnly" => match self {
                Draft::Draft7 | Draft::Draft201909 => Some(keywords::metadata::compile_write_only),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Get the `Draft` from a meta-schema URL.
#[inline]
pub(crate) fn draft_from_url(url: &str) -> Option<Draft> {
    match url.trim_end_matches('#') {
        "https://json-schema.org/draft/2019-09/schema" => Some(Draft::Draft201909),
        "http://json-schema.org/draft-07/schema" => Some(Draft::Draft7),
        "http://json-schema.org/draft-06/schema" => Some(Draft::Draft6),
        "http://json-schema.org/draft-04/schema" => Some(Draft::Draft4),
        _ => None,
    }
}

/// Get the `Draft` from a JSON Schema.
#[inline]
pub(crate) fn draft_from_schema(schema: &Value) -> Option<Draft> {
    schema
        .get("$schema")
        .and_then(Value::as_str)
        .and_then(draft_from_url)
}

#[inline]
pub(crate) fn id_of(draft: Draft, schema: &Value) -> Option<&str> {
    if let Value::Object(object) = schema {
        object.get(draft.id_key()).and_then(Value::as_str)
    } else {
        None
    }
}

/// Set of drafts in which a keyword applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DraftSet(u8);

const fn draft_bit(draft: Draft) -> u8 {
    match draft {
        Draft::Draft4 => 1,
        Draft::Draft6 => 2,
        Draft::Draft7 => 4,
        Draft::Draft201909 => 8,
    }
}

impl DraftSet {
    pub(crate) const ALL: DraftSet = DraftSet(1 | 2 | 4 | 8);
    pub(crate) const DRAFT6_UP: DraftSet = DraftSet(2 | 4 | 8);
    pub(crate) const DRAFT7_UP: DraftSet = DraftSet(4 | 8);
    pub(crate) const DRAFT201909_ONLY: DraftSet = DraftSet(8);
    pub(crate) const BEFORE_DRAFT201909: DraftSet = DraftSet(1 | 2 | 4);

    pub(crate) const fn contains(self, draft: Draft) -> bool {
        self.0 & draft_bit(draft) != 0
    }
}

/// Named groups of keywords which Draft 2019-09 meta-schemas may switch off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    /// `$ref`, `$defs` and friends.
    Core,
    /// Keywords applying subschemas.
    Applicator,
    /// Assertion keywords.
    Validation,
    /// The `format` keyword.
    Format,
    /// `content*` keywords.
    Content,
    /// Annotation-only keywords.
    MetaData,
}

const fn vocabulary_bit(vocabulary: Vocabulary) -> u8 {
    match vocabulary {
        Vocabulary::Core => 1,
        Vocabulary::Applicator => 2,
        Vocabulary::Validation => 4,
        Vocabulary::Format => 8,
        Vocabulary::Content => 16,
        Vocabulary::MetaData => 32,
    }
}

fn vocabulary_from_uri(uri: &str) -> Option<Vocabulary> {
    match uri.trim_end_matches('#') {
        "https://json-schema.org/draft/2019-09/vocab/core" => Some(Vocabulary::Core),
        "https://json-schema.org/draft/2019-09/vocab/applicator" => Some(Vocabulary::Applicator),
        "https://json-schema.org/draft/2019-09/vocab/validation" => Some(Vocabulary::Validation),
        "https://json-schema.org/draft/2019-09/vocab/format" => Some(Vocabulary::Format),
        "https://json-schema.org/draft/2019-09/vocab/content" => Some(Vocabulary::Content),
        "https://json-schema.org/draft/2019-09/vocab/meta-data" => Some(Vocabulary::MetaData),
        _ => None,
    }
}

/// The set of vocabularies enabled by the active meta-schema.
///
/// Everything is enabled unless the meta-schema carries a `$vocabulary` object;
/// then only the vocabularies it lists with `true` assert. `Core` can not be
/// switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VocabularySet(u8);

impl Default for VocabularySet {
    fn default() -> Self {
        VocabularySet(0xFF)
    }
}

impl VocabularySet {
    pub(crate) fn from_metaschema(metaschema: &Value) -> VocabularySet {
        match metaschema.get("$vocabulary") {
            Some(Value::Object(map)) => {
                let mut enabled = vocabulary_bit(Vocabulary::Core);
                for (uri, required) in map {
                    if required == &Value::Bool(true) {
                        if let Some(vocabulary) = vocabulary_from_uri(uri) {
                            enabled |= vocabulary_bit(vocabulary);
                        }
                    }
                }
                VocabularySet(enabled)
            }
            _ => VocabularySet::default(),
        }
    }

    pub(crate) const fn enabled(self, vocabulary: Vocabulary) -> bool {
        self.0 & vocabulary_bit(vocabulary) != 0
    }
}
