//! # jsonschema-eval
//!
//! A JSON Schema evaluation engine for drafts 4, 6, 7 and 2019-09. Schemas
//! are parsed into keyword objects which evaluate instances recursively,
//! exchanging annotations (`contains` feeds `minContains`, the applicators
//! feed `unevaluatedProperties`/`unevaluatedItems`) and resolving references
//! lazily, so forward references and cycles work. Results come out in the
//! 2019-09 output formats: flag, basic or detailed.
//!
//! ## Usage Examples:
//! A schema can be parsed with two main flavours:
//!  * using default configurations
//! ```rust
//! # use jsonschema_eval::{Schema, SchemaError};
//! # use serde_json::json;
//! # fn foo() -> Result<(), SchemaError> {
//! # let schema = json!({"maxLength": 5});
//! let compiled_schema = Schema::parse(&schema)?;
//! # Ok(())
//! # }
//! ```
//!  * using custom configurations (such as define a Draft version)
//! ```rust
//! # use jsonschema_eval::{Draft, Schema, SchemaError};
//! # use serde_json::json;
//! # fn foo() -> Result<(), SchemaError> {
//! # let schema = json!({"maxLength": 5});
//! let compiled_schema = Schema::options()
//!     .with_draft(Draft::Draft7)
//!     .parse(&schema)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Example (print collected errors)
//! ```rust
//! use jsonschema_eval::{Schema, SchemaError};
//! use serde_json::json;
//!
//! fn main() -> Result<(), SchemaError> {
//!     let schema = json!({"maxLength": 5});
//!     let instance = json!("foo bar baz");
//!     let compiled = Schema::parse(&schema)?;
//!     let result = compiled.validate(&instance);
//!     if !result.is_valid() {
//!         for error in result.nested() {
//!             if let Some(message) = error.error_message() {
//!                 println!("Validation error: {}", message)
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```
#![warn(
    clippy::cast_possible_truncation,
    clippy::doc_markdown,
    clippy::explicit_iter_loop,
    clippy::map_unwrap_or,
    clippy::match_same_arms,
    clippy::needless_borrow,
    clippy::needless_pass_by_value,
    clippy::print_stdout,
    clippy::redundant_closure,
    clippy::trivially_copy_pass_by_ref,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    variant_size_differences
)]
#![allow(clippy::unnecessary_wraps, clippy::upper_case_acronyms)]
mod content_encoding;
mod content_media_type;
mod context;
mod document;
pub mod error;
mod keyword;
mod keywords;
mod options;
pub mod output;
pub mod paths;
pub mod primitive_type;
mod registry;
mod resolver;
mod result;
mod schemas;

pub use document::{Schema, SchemaDocument};
pub use error::SchemaError;
pub use options::ValidationOptions;
pub use output::{BasicOutput, ErrorDescription, Output, OutputFormat, OutputUnit};
pub use paths::JSONPointer;
pub use registry::{global_registry, SchemaRegistry};
pub use resolver::{SchemaResolver, SchemaResolverError};
pub use result::ValidationResult;
pub use schemas::{Draft, Vocabulary};
use serde_json::Value;

/// A shortcut for validating `instance` against `schema`. Draft version is
/// detected automatically.
/// ```rust
/// use jsonschema_eval::is_valid;
/// use serde_json::json;
///
/// let schema = json!({"maxLength": 5});
/// let instance = json!("foo");
/// assert!(is_valid(&schema, &instance));
/// ```
///
/// This function panics if an invalid schema is passed.
#[must_use]
#[inline]
pub fn is_valid(schema: &Value, instance: &Value) -> bool {
    let compiled = Schema::parse(schema).expect("Invalid schema");
    compiled.is_valid(instance)
}

#[cfg(test)]
pub(crate) mod tests_util {
    use super::{Draft, Schema};
    use serde_json::Value;

    pub(crate) fn is_valid(schema: &Value, instance: &Value) {
        let compiled = Schema::parse(schema).unwrap();
        assert!(
            compiled.is_valid(instance),
            "{} should be valid (via is_valid)",
            instance
        );
        assert!(
            compiled.validate(instance).is_valid(),
            "{} should be valid (via validate)",
            instance
        );
    }

    pub(crate) fn is_not_valid(schema: &Value, instance: &Value) {
        let compiled = Schema::parse(schema).unwrap();
        assert!(
            !compiled.is_valid(instance),
            "{} should not be valid (via is_valid)",
            instance
        );
        assert!(
            !compiled.validate(instance).is_valid(),
            "{} should not be valid (via validate)",
            instance
        );
    }

    pub(crate) fn is_valid_draft(draft: Draft, schema: &Value, instance: &Value) {
        let compiled = Schema::options().with_draft(draft).parse(schema).unwrap();
        assert!(compiled.is_valid(instance), "{} should be valid", instance);
    }

    pub(crate) fn is_not_valid_draft(draft: Draft, schema: &Value, instance: &Value) {
        let compiled = Schema::options().with_draft(draft).parse(schema).unwrap();
        assert!(
            !compiled.is_valid(instance),
            "{} should not be valid",
            instance
        );
    }
}

#[cfg(test)]
mod tests {
    use super::is_valid;
    use serde_json::json;

    #[test]
    fn test_is_valid() {
        let schema = json!({"minLength": 5});
        let valid = json!("foobar");
        let invalid = json!("foo");
        assert!(is_valid(&schema, &valid));
        assert!(!is_valid(&schema, &invalid));
    }
}
