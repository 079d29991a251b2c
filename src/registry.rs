//! Two-scope schema storage: a process-wide store seeded with the known
//! meta-schemas, plus per-validation lookups layered on top of it.
//!
//! The store is read-mostly: lookups take a shared lock, cache misses and the
//! lifecycle operations take the write lock. Two threads racing to download
//! the same URI both succeed; the last write wins and both observe equivalent
//! documents.
use crate::{error::SchemaError, options::ValidationOptions, Schema};
use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

macro_rules! schema {
    ($name:ident, $path:expr) => {
        static $name: Lazy<Value> =
            Lazy::new(|| serde_json::from_str(include_str!($path)).expect("Invalid schema"));
    };
}

schema!(DRAFT4, "../meta_schemas/draft4.json");
schema!(DRAFT6, "../meta_schemas/draft6.json");
schema!(DRAFT7, "../meta_schemas/draft7.json");
schema!(DRAFT201909, "../meta_schemas/draft2019-09/schema.json");
schema!(
    DRAFT201909_APPLICATOR,
    "../meta_schemas/draft2019-09/meta/applicator.json"
);
schema!(
    DRAFT201909_CONTENT,
    "../meta_schemas/draft2019-09/meta/content.json"
);
schema!(DRAFT201909_CORE, "../meta_schemas/draft2019-09/meta/core.json");
schema!(
    DRAFT201909_FORMAT,
    "../meta_schemas/draft2019-09/meta/format.json"
);
schema!(
    DRAFT201909_META_DATA,
    "../meta_schemas/draft2019-09/meta/meta-data.json"
);
schema!(
    DRAFT201909_VALIDATION,
    "../meta_schemas/draft2019-09/meta/validation.json"
);
schema!(JSON_PATCH, "../meta_schemas/json-patch.json");

fn seeds() -> AHashMap<String, Arc<Value>> {
    let mut store = AHashMap::with_capacity(11);
    store.insert(
        "http://json-schema.org/draft-04/schema".to_string(),
        Arc::new(DRAFT4.clone()),
    );
    store.insert(
        "http://json-schema.org/draft-06/schema".to_string(),
        Arc::new(DRAFT6.clone()),
    );
    store.insert(
        "http://json-schema.org/draft-07/schema".to_string(),
        Arc::new(DRAFT7.clone()),
    );
    store.insert(
        "https://json-schema.org/draft/2019-09/schema".to_string(),
        Arc::new(DRAFT201909.clone()),
    );
    store.insert(
        "https://json-schema.org/draft/2019-09/meta/applicator".to_string(),
        Arc::new(DRAFT201909_APPLICATOR.clone()),
    );
    store.insert(
        "https://json-schema.org/draft/2019-09/meta/content".to_string(),
        Arc::new(DRAFT201909_CONTENT.clone()),
    );
    store.insert(
        "https://json-schema.org/draft/2019-09/meta/core".to_string(),
        Arc::new(DRAFT201909_CORE.clone()),
    );
    store.insert(
        "https://json-schema.org/draft/2019-09/meta/format".to_string(),
        Arc::new(DRAFT201909_FORMAT.clone()),
    );
    store.insert(
        "https://json-schema.org/draft/2019-09/meta/meta-data".to_string(),
        Arc::new(DRAFT201909_META_DATA.clone()),
    );
    store.insert(
        "https://json-schema.org/draft/2019-09/meta/validation".to_string(),
        Arc::new(DRAFT201909_VALIDATION.clone()),
    );
    store.insert(
        "http://json.schemastore.org/json-patch".to_string(),
        Arc::new(JSON_PATCH.clone()),
    );
    store
}

static GLOBAL: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::new);

/// The process-wide registry shared by validations that do not inject their
/// own.
pub fn global_registry() -> &'static SchemaRegistry {
    &GLOBAL
}

/// Storage of raw schema documents keyed by absolute URI (stored without a
/// trailing `#`).
#[derive(Debug)]
pub struct SchemaRegistry {
    store: RwLock<AHashMap<String, Arc<Value>>>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        SchemaRegistry::new()
    }
}

impl SchemaRegistry {
    /// A registry seeded with the draft 04/06/07/2019-09 meta-schemas (plus
    /// the 2019-09 vocabulary sub-schemas) and the JSON Patch schema.
    #[must_use]
    pub fn new() -> SchemaRegistry {
        SchemaRegistry {
            store: RwLock::new(seeds()),
        }
    }

    /// Store `document` under `uri`.
    pub fn register(&self, uri: &str, document: Value) {
        self.store
            .write()
            .insert(uri.trim_end_matches('#').to_string(), Arc::new(document));
    }

    /// Forget the document stored under `uri`.
    pub fn unregister(&self, uri: &str) {
        self.store.write().remove(uri.trim_end_matches('#'));
    }

    /// Reset the registry to its seeded state.
    pub fn clear(&self) {
        *self.store.write() = seeds();
    }

    /// Look `uri` up without invoking the resolver.
    pub fn get(&self, uri: &str) -> Option<Arc<Value>> {
        self.store
            .read()
            .get(uri.trim_end_matches('#'))
            .map(Arc::clone)
    }

    /// Look `url` up; on a miss invoke the configured resolver, check the
    /// downloaded document against its declared meta-schema and cache it.
    pub(crate) fn get_or_fetch(
        &self,
        url: &Url,
        config: &ValidationOptions,
    ) -> Result<Arc<Value>, SchemaError> {
        let key = url.as_str().trim_end_matches('#');
        if !config.refresh_remote() {
            if let Some(cached) = self.get(key) {
                return Ok(cached);
            }
        }
        let resolved = config
            .resolver()
            .resolve(url, key)
            .map_err(|error| SchemaError::load(key, vec![error.to_string()]))?;
        self.check_against_metaschema(key, &resolved)?;
        self.store
            .write()
            .insert(key.to_string(), Arc::clone(&resolved));
        Ok(resolved)
    }

    /// Validate a downloaded document against its declared meta-schema, when
    /// that meta-schema is known. Seeded meta-schemas are trusted and
    /// self-describing documents are skipped to avoid recursion.
    fn check_against_metaschema(&self, uri: &str, document: &Value) -> Result<(), SchemaError> {
        let metaschema_uri = match document.get("$schema").and_then(Value::as_str) {
            Some(value) => value.trim_end_matches('#'),
            None => return Ok(()),
        };
        if metaschema_uri == uri {
            return Ok(());
        }
        let metaschema = match self.get(metaschema_uri) {
            Some(value) => value,
            None => return Ok(()),
        };
        let compiled = Schema::parse(&metaschema)?;
        let result = compiled.validate(document);
        if result.is_valid() {
            Ok(())
        } else {
            let mut errors = Vec::new();
            collect_errors(&result, &mut errors);
            Err(SchemaError::load(uri, errors))
        }
    }
}

fn collect_errors(result: &crate::ValidationResult, errors: &mut Vec<String>) {
    if let Some(message) = result.error_message() {
        errors.push(message.to_string());
    }
    for nested in result.nested() {
        if !nested.is_valid() {
            collect_errors(nested, errors);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn seeded_metaschemas_are_present() {
        let registry = SchemaRegistry::new();
        assert!(registry
            .get("http://json-schema.org/draft-07/schema#")
            .is_some());
        assert!(registry
            .get("https://json-schema.org/draft/2019-09/schema")
            .is_some());
        assert!(registry
            .get("http://json.schemastore.org/json-patch")
            .is_some());
    }

    #[test]
    fn lifecycle() {
        let registry = SchemaRegistry::new();
        registry.register("http://example.com/s#", json!({"type": "integer"}));
        assert!(registry.get("http://example.com/s").is_some());
        registry.unregister("http://example.com/s");
        assert!(registry.get("http://example.com/s").is_none());
        registry.register("http://example.com/s", json!(true));
        registry.clear();
        assert!(registry.get("http://example.com/s").is_none());
        assert!(registry
            .get("http://json-schema.org/draft-04/schema")
            .is_some());
    }
}
