//! The download hook used when a reference points at a document the registry
//! has not seen. Is able to load documents from remote locations via HTTP(S).
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// An opaque error type that is returned by resolvers on resolution failures.
pub type SchemaResolverError = anyhow::Error;

/// A resolver that resolves external schema references.
/// Internal references such as `#/definitions` and JSON pointers are handled
/// internally.
///
/// All operations are blocking and it is not possible to return futures.
/// Long-running downloads are the caller's responsibility; this hook is the
/// conventional place to impose timeouts.
///
/// # Example
///
/// ```no_run
/// # use serde_json::{json, Value};
/// # use anyhow::anyhow;
/// # use jsonschema_eval::{SchemaResolver, SchemaResolverError};
/// # use std::sync::Arc;
/// # use url::Url;
///
/// struct MyCustomResolver;
///
/// impl SchemaResolver for MyCustomResolver {
///     fn resolve(&self, url: &Url, _original_reference: &str) -> Result<Arc<Value>, SchemaResolverError> {
///         match url.scheme() {
///             "http" | "https" => {
///                 Ok(Arc::new(json!({ "description": "an external schema" })))
///             }
///             _ => Err(anyhow!("scheme is not supported"))
///         }
///     }
/// }
/// ```
pub trait SchemaResolver: Send + Sync {
    /// Resolve an external schema via an URL.
    ///
    /// Additionally the original reference string is also passed, in most
    /// cases it should not be needed, but it preserves some information, such
    /// as relative paths that are lost when the URL is built.
    fn resolve(&self, url: &Url, original_reference: &str)
        -> Result<Arc<Value>, SchemaResolverError>;
}

pub(crate) struct DefaultResolver;

impl SchemaResolver for DefaultResolver {
    fn resolve(&self, url: &Url, _reference: &str) -> Result<Arc<Value>, SchemaResolverError> {
        match url.scheme() {
            "http" | "https" => {
                #[cfg(feature = "resolve-http")]
                {
                    let response = reqwest::blocking::get(url.as_str())?;
                    let document: Value = response.json()?;
                    Ok(Arc::new(document))
                }
                #[cfg(not(feature = "resolve-http"))]
                Err(anyhow::anyhow!(
                    "`resolve-http` feature or a custom resolver is required to resolve external schemas via HTTP"
                ))
            }
            "json-schema" => Err(anyhow::anyhow!(
                "cannot resolve relative external schema without root schema ID"
            )),
            _ => Err(anyhow::anyhow!("unknown scheme {}", url.scheme())),
        }
    }
}
