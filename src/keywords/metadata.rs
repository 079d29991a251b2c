//! Annotation-only keywords: `title`, `description`, `default`, `examples`,
//! `readOnly`, `writeOnly`, `deprecated`. They never fail.
use crate::{
    context::ValidationContext,
    document::ParseContext,
    keyword::{Keyword, KeywordResult},
    result::ValidationResult,
    schemas::{DraftSet, Vocabulary},
};
use serde_json::{Map, Value};
use std::fmt;

pub(crate) struct Metadata {
    name: &'static str,
    value: Value,
    drafts: DraftSet,
}

impl Keyword for Metadata {
    fn name(&self) -> &'static str {
        self.name
    }

    fn drafts(&self) -> DraftSet {
        self.drafts
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::MetaData
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        ValidationResult::annotation(ctx, self.name, self.value.clone())
    }

    fn to_json(&self) -> Value {
        self.value.clone()
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

macro_rules! metadata_keyword {
    ($compile:ident, $name:tt, $drafts:expr) => {
        #[inline]
        pub(crate) fn $compile(
            _: &Map<String, Value>,
            schema: &Value,
            _: &ParseContext,
        ) -> Option<KeywordResult> {
            Some(Ok(Box::new(Metadata {
                name: $name,
                value: schema.clone(),
                drafts: $drafts,
            })))
        }
    };
}

metadata_keyword!(compile_title, "title", DraftSet::ALL);
metadata_keyword!(compile_description, "description", DraftSet::ALL);
metadata_keyword!(compile_default, "default", DraftSet::ALL);
metadata_keyword!(compile_examples, "examples", DraftSet::DRAFT6_UP);
metadata_keyword!(compile_read_only, "readOnly", DraftSet::DRAFT7_UP);
metadata_keyword!(compile_write_only, "writeOnly", DraftSet::DRAFT7_UP);
metadata_keyword!(compile_deprecated, "deprecated", DraftSet::DRAFT201909_ONLY);

#[cfg(test)]
mod tests {
    use crate::Schema;
    use serde_json::json;

    #[test]
    fn metadata_never_fails() {
        let compiled = Schema::parse(&json!({
            "title": "a title",
            "description": "a description",
            "default": 42,
            "examples": [1, 2],
            "readOnly": true,
            "writeOnly": false,
            "deprecated": true
        }))
        .unwrap();
        assert!(compiled.is_valid(&json!("anything")));
    }

    #[test]
    fn metadata_is_annotated() {
        let compiled = Schema::parse(&json!({"title": "a title"})).unwrap();
        let result = compiled.validate(&json!(1));
        let annotation = result
            .nested()
            .iter()
            .find(|nested| nested.keyword() == Some("title"))
            .and_then(|nested| nested.annotation_value());
        assert_eq!(annotation, Some(&json!("a title")));
    }
}
