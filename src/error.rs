//! Error types.
//!
//! Failures split into two groups: anything going wrong while a schema is
//! being parsed or loaded surfaces as [`SchemaError`]; failures observed while
//! an instance is being evaluated are values in the result tree and are never
//! returned as `Err`.
use std::{
    error,
    fmt::{self, Formatter},
};

/// The error type that happens when the input schema is not usable.
///
/// It includes cases when during validation a remote document is resolved into
/// an invalid schema, which we can't know upfront because schemas can be in
/// remote locations.
#[derive(Debug)]
pub enum SchemaError {
    /// Invalid schema structure: a keyword rejected its value.
    Parse {
        /// Keyword that rejected its value.
        keyword: String,
        /// Human-readable description of the problem.
        detail: String,
    },
    /// `format` names a validator unknown to the engine while unknown formats
    /// are disallowed.
    UnknownFormat {
        /// The offending format name.
        format: String,
    },
    /// A downloaded document does not validate against its declared meta-schema.
    Load {
        /// URI the document was loaded from.
        uri: String,
        /// Structural errors reported by the meta-schema.
        errors: Vec<String>,
    },
    /// A URI could not be built from a `$id` or `$ref` value.
    InvalidUrl {
        /// Parser diagnostic.
        detail: String,
    },
}

impl SchemaError {
    pub(crate) fn parse(keyword: impl Into<String>, detail: impl Into<String>) -> SchemaError {
        SchemaError::Parse {
            keyword: keyword.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn unknown_format(format: impl Into<String>) -> SchemaError {
        SchemaError::UnknownFormat {
            format: format.into(),
        }
    }

    pub(crate) fn load(uri: impl Into<String>, errors: Vec<String>) -> SchemaError {
        SchemaError::Load {
            uri: uri.into(),
            errors,
        }
    }
}

impl error::Error for SchemaError {}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Parse { keyword, detail } => {
                write!(f, "Invalid value for `{}`: {}", keyword, detail)
            }
            SchemaError::UnknownFormat { format } => {
                write!(f, "Unknown format: {}", format)
            }
            SchemaError::Load { uri, errors } => {
                write!(
                    f,
                    "Document loaded from {} does not match its meta-schema: {}",
                    uri,
                    errors.join("; ")
                )
            }
            SchemaError::InvalidUrl { detail } => write!(f, "Invalid URL: {}", detail),
        }
    }
}

impl From<url::ParseError> for SchemaError {
    #[inline]
    fn from(error: url::ParseError) -> Self {
        SchemaError::InvalidUrl {
            detail: error.to_string(),
        }
    }
}

impl From<fancy_regex::Error> for SchemaError {
    #[inline]
    fn from(error: fancy_regex::Error) -> Self {
        SchemaError::parse("pattern", error.to_string())
    }
}

impl From<serde_json::Error> for SchemaError {
    #[inline]
    fn from(error: serde_json::Error) -> Self {
        SchemaError::InvalidUrl {
            detail: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SchemaError;

    #[test]
    fn display_representation() {
        let error = SchemaError::parse("minimum", "expected a number");
        assert_eq!(
            error.to_string(),
            "Invalid value for `minimum`: expected a number"
        );
        let error = SchemaError::unknown_format("my-format");
        assert_eq!(error.to_string(), "Unknown format: my-format");
    }
}
