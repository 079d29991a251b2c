//! Facilities for working with paths within schemas or validated instances.
use serde_json::Value;
use std::borrow::Cow;
use std::fmt::Write;
use std::{fmt, ops::Deref};

/// JSON Pointer as a wrapper around individual path components.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct JSONPointer(Vec<PathChunk>);

impl JSONPointer {
    /// JSON pointer as a vector of strings. Each component is casted to `String`.
    pub fn into_vec(self) -> Vec<String> {
        self.0
            .iter()
            .map(|item| match item {
                PathChunk::Name(value) => value.to_string(),
                PathChunk::Index(idx) => idx.to_string(),
            })
            .collect()
    }

    /// Whether the pointer has no components, i.e. it points at the whole document.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn chunks(&self) -> &[PathChunk] {
        &self.0
    }

    /// A new pointer with `chunk` appended.
    pub(crate) fn join(&self, chunk: impl Into<PathChunk>) -> JSONPointer {
        let mut chunks = self.0.clone();
        chunks.push(chunk.into());
        JSONPointer(chunks)
    }

    /// A new pointer with all `chunks` appended.
    pub(crate) fn extend_with(&self, chunks: &[PathChunk]) -> JSONPointer {
        let mut extended = self.0.clone();
        extended.extend_from_slice(chunks);
        JSONPointer(extended)
    }

    /// Walk `value` along the pointer. Out-of-bounds components yield `None`.
    pub fn resolve<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        let mut target = value;
        for chunk in &self.0 {
            target = match (chunk, target) {
                (PathChunk::Name(name), Value::Object(map)) => map.get(name)?,
                (PathChunk::Name(name), Value::Array(items)) => items.get(parse_index(name)?)?,
                (PathChunk::Index(idx), Value::Array(items)) => items.get(*idx)?,
                _ => return None,
            };
        }
        Some(target)
    }

    /// Parse a URI fragment (without the leading `#`) into a pointer,
    /// unescaping `~1` and `~0` per RFC 6901.
    pub(crate) fn from_fragment(fragment: &str) -> JSONPointer {
        JSONPointer(
            fragment
                .split('/')
                .skip(1)
                .map(|token| {
                    PathChunk::Name(
                        token
                            .maybe_replace("~1", "/")
                            .maybe_replace("~0", "~")
                            .into_owned(),
                    )
                })
                .collect(),
        )
    }
}

impl fmt::Display for JSONPointer {
    fn fmt(&self, mut f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.0.is_empty() {
            for chunk in &self.0 {
                f.write_char('/')?;
                match chunk {
                    PathChunk::Name(value) => f.write_str(
                        value
                            .maybe_replace("~", "~0")
                            .maybe_replace("/", "~1")
                            .as_ref(),
                    )?,
                    PathChunk::Index(idx) => itoa::fmt(&mut f, *idx)?,
                }
            }
        }
        Ok(())
    }
}

impl serde::Serialize for JSONPointer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// A single component of a [`JSONPointer`].
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum PathChunk {
    /// A named (object key) path component.
    Name(String),
    /// An indexed (array index) path component.
    Index(usize),
}

impl From<String> for PathChunk {
    #[inline]
    fn from(value: String) -> Self {
        PathChunk::Name(value)
    }
}
impl From<&str> for PathChunk {
    #[inline]
    fn from(value: &str) -> Self {
        PathChunk::Name(value.to_string())
    }
}
impl From<usize> for PathChunk {
    #[inline]
    fn from(value: usize) -> Self {
        PathChunk::Index(value)
    }
}

impl From<&[&str]> for JSONPointer {
    #[inline]
    fn from(path: &[&str]) -> Self {
        JSONPointer(
            path.iter()
                .map(|item| PathChunk::Name((*item).to_string()))
                .collect(),
        )
    }
}

impl Deref for JSONPointer {
    type Target = [PathChunk];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub(crate) fn parse_index(s: &str) -> Option<usize> {
    if s.starts_with('+') || (s.starts_with('0') && s.len() != 1) {
        None
    } else {
        s.parse().ok()
    }
}

/// Searching twice is better than unconditionally allocating a String twice.
pub(crate) trait MaybeReplaceExt<'a> {
    fn maybe_replace(self, needle: &str, replacement: &str) -> Cow<'a, str>;
}

impl<'a> MaybeReplaceExt<'a> for &'a str {
    fn maybe_replace(self, needle: &str, replacement: &str) -> Cow<'a, str> {
        if memchr::memmem::find(self.as_bytes(), needle.as_bytes()).is_some() {
            self.replace(needle, replacement).into()
        } else {
            self.into()
        }
    }
}

impl<'a> MaybeReplaceExt<'a> for Cow<'a, str> {
    fn maybe_replace(self, needle: &str, replacement: &str) -> Cow<'a, str> {
        if memchr::memmem::find(self.as_bytes(), needle.as_bytes()).is_some() {
            self.replace(needle, replacement).into()
        } else {
            self
        }
    }
}
