//! Evaluation state threaded through one validation run.
//!
//! A [`ValidationContext`] is one frame: the evaluation of one schema object
//! against one sub-instance. Frames are mutation-isolated clones of their
//! parent; a keyword that applies subschemas builds children and merges their
//! evaluated-property/item annotations back only when the child succeeded.
use crate::{
    document::{SchemaDocument, DEFAULT_ROOT_URL},
    options::ValidationOptions,
    paths::{JSONPointer, PathChunk},
    registry::SchemaRegistry,
};
use ahash::{AHashMap, AHashSet};
use serde_json::Value;
use std::{cell::RefCell, sync::Arc};
use url::Url;

/// Written by `if`, read by `then`/`else`.
pub(crate) const IF_KEYWORD_VALID: &str = "ifKeywordValid";
/// Written by `contains`, read by `minContains`/`maxContains`.
pub(crate) const CONTAINS_COUNT: &str = "containsCount";

/// Values travelling over the inter-keyword annotation channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Annotation {
    Bool(bool),
    Count(usize),
}

/// State shared by every frame of one validation call. Strictly call-local.
pub(crate) struct ValidationState<'a> {
    pub(crate) config: &'a ValidationOptions,
    pub(crate) registry: &'a SchemaRegistry,
    pub(crate) root: Arc<SchemaDocument>,
    pub(crate) root_uri: Url,
    pub(crate) flag: bool,
    /// References currently being evaluated, keyed by
    /// (absolute URI, instance location). Re-entry short-circuits to valid.
    pub(crate) in_flight: RefCell<AHashSet<(String, String)>>,
    /// External documents parsed during this validation.
    pub(crate) documents: RefCell<AHashMap<String, Arc<SchemaDocument>>>,
}

pub(crate) struct ValidationContext<'i, 's> {
    pub(crate) state: &'s ValidationState<'s>,
    pub(crate) instance: &'i Value,
    pub(crate) instance_location: JSONPointer,
    pub(crate) relative_location: JSONPointer,
    /// Keyword path from the resolved schema root; `None` once evaluation
    /// crossed a reference into a document without a known absolute id.
    pub(crate) base_relative_location: Option<JSONPointer>,
    pub(crate) base_uri: Url,
    /// The outermost dynamic scope that declared `$recursiveAnchor: true`.
    pub(crate) recursive_anchor: Option<Url>,
    pub(crate) misc: AHashMap<&'static str, Annotation>,
    pub(crate) evaluated_properties: AHashSet<String>,
    pub(crate) evaluated_items: usize,
}

impl<'i, 's> ValidationContext<'i, 's> {
    pub(crate) fn new_root(
        state: &'s ValidationState<'s>,
        instance: &'i Value,
        base_uri: Url,
    ) -> Self {
        ValidationContext {
            state,
            instance,
            instance_location: JSONPointer::default(),
            relative_location: JSONPointer::default(),
            base_relative_location: Some(JSONPointer::default()),
            base_uri,
            recursive_anchor: None,
            misc: AHashMap::new(),
            evaluated_properties: AHashSet::new(),
            evaluated_items: 0,
        }
    }

    /// A frame for a subschema applied to the *same* instance
    /// (combinators, conditionals, dependent schemas).
    pub(crate) fn frame_child(&self, keyword_path: &[PathChunk]) -> ValidationContext<'i, 's> {
        ValidationContext {
            state: self.state,
            instance: self.instance,
            instance_location: self.instance_location.clone(),
            relative_location: self.relative_location.extend_with(keyword_path),
            base_relative_location: self
                .base_relative_location
                .as_ref()
                .map(|location| location.extend_with(keyword_path)),
            base_uri: self.base_uri.clone(),
            recursive_anchor: self.recursive_anchor.clone(),
            misc: AHashMap::new(),
            evaluated_properties: self.evaluated_properties.clone(),
            evaluated_items: self.evaluated_items,
        }
    }

    /// A frame for a subschema applied to a *sub*-instance
    /// (`properties`, `items`, `contains`, ...). Evaluated-annotation state
    /// starts fresh: it tracks the child instance, not this one.
    pub(crate) fn item_child(
        &self,
        instance: &'i Value,
        instance_chunk: impl Into<PathChunk>,
        keyword_path: &[PathChunk],
    ) -> ValidationContext<'i, 's> {
        ValidationContext {
            state: self.state,
            instance,
            instance_location: self.instance_location.join(instance_chunk),
            relative_location: self.relative_location.extend_with(keyword_path),
            base_relative_location: self
                .base_relative_location
                .as_ref()
                .map(|location| location.extend_with(keyword_path)),
            base_uri: self.base_uri.clone(),
            recursive_anchor: self.recursive_anchor.clone(),
            misc: AHashMap::new(),
            evaluated_properties: AHashSet::new(),
            evaluated_items: 0,
        }
    }

    /// A frame entered through a reference. The base URI moves to the target
    /// document; the base-relative path restarts at the target's pointer, or
    /// becomes unknown when the target has no absolute identifier.
    pub(crate) fn ref_child(
        &self,
        keyword: &'static str,
        base_uri: Url,
        target_location: Option<JSONPointer>,
    ) -> ValidationContext<'i, 's> {
        ValidationContext {
            state: self.state,
            instance: self.instance,
            instance_location: self.instance_location.clone(),
            relative_location: self.relative_location.join(keyword),
            base_relative_location: target_location,
            base_uri,
            recursive_anchor: self.recursive_anchor.clone(),
            misc: AHashMap::new(),
            evaluated_properties: self.evaluated_properties.clone(),
            evaluated_items: self.evaluated_items,
        }
    }

    /// Adopt a successful child's evaluated-annotation state. Only meaningful
    /// when the child evaluated the same instance.
    pub(crate) fn merge_evaluated(&mut self, child: &ValidationContext<'_, '_>) {
        for property in &child.evaluated_properties {
            self.evaluated_properties.insert(property.clone());
        }
        if child.evaluated_items > self.evaluated_items {
            self.evaluated_items = child.evaluated_items;
        }
    }

    pub(crate) fn set_annotation(&mut self, key: &'static str, value: Annotation) {
        self.misc.insert(key, value);
    }

    pub(crate) fn annotation(&self, key: &str) -> Option<Annotation> {
        self.misc.get(key).copied()
    }

    /// Whether evaluation may stop at the first failure.
    pub(crate) fn flag(&self) -> bool {
        self.state.flag
    }

    /// Policy hook: whether a failing branch of `keyword` should carry its
    /// nested errors in the output.
    pub(crate) fn report_children(&self, keyword: &str) -> bool {
        self.state
            .config
            .child_error_policy()
            .map_or(true, |hook| hook(keyword, &self.instance_location))
    }

    /// Absolute URI of the keyword being evaluated, when the enclosing schema
    /// document is addressable.
    pub(crate) fn absolute_location(&self, keyword: Option<&str>) -> Option<String> {
        if self.base_uri.as_str() == DEFAULT_ROOT_URL {
            return None;
        }
        let base_relative = self.base_relative_location.as_ref()?;
        let pointer = match keyword {
            Some(name) => base_relative.join(name),
            None => base_relative.clone(),
        };
        if pointer.is_empty() {
            Some(self.base_uri.as_str().trim_end_matches('#').to_string())
        } else {
            Some(format!(
                "{}#{}",
                self.base_uri.as_str().trim_end_matches('#'),
                pointer
            ))
        }
    }
}
