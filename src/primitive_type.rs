//! Instance types, as named by the `type` keyword.
use std::{convert::TryFrom, fmt};

/// For faster matching in the `type` keyword validator we have this enum, to match
/// with it instead of a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// JSON array.
    Array,
    /// JSON boolean.
    Boolean,
    /// JSON number without a fractional part.
    Integer,
    /// JSON null.
    Null,
    /// JSON number.
    Number,
    /// JSON object.
    Object,
    /// JSON string.
    String,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveType::Array => write!(f, "array"),
            PrimitiveType::Boolean => write!(f, "boolean"),
            PrimitiveType::Integer => write!(f, "integer"),
            PrimitiveType::Null => write!(f, "null"),
            PrimitiveType::Number => write!(f, "number"),
            PrimitiveType::Object => write!(f, "object"),
            PrimitiveType::String => write!(f, "string"),
        }
    }
}

impl TryFrom<&str> for PrimitiveType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "array" => Ok(PrimitiveType::Array),
            "boolean" => Ok(PrimitiveType::Boolean),
            "integer" => Ok(PrimitiveType::Integer),
            "null" => Ok(PrimitiveType::Null),
            "number" => Ok(PrimitiveType::Number),
            "object" => Ok(PrimitiveType::Object),
            "string" => Ok(PrimitiveType::String),
            _ => Err(()),
        }
    }
}

const fn to_bit_representation(primitive_type: PrimitiveType) -> u8 {
    match primitive_type {
        PrimitiveType::Array => 1,
        PrimitiveType::Boolean => 2,
        PrimitiveType::Integer => 4,
        PrimitiveType::Null => 8,
        PrimitiveType::Number => 16,
        PrimitiveType::Object => 32,
        PrimitiveType::String => 64,
    }
}

/// Compact representation of a set of `PrimitiveType`s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PrimitiveTypesBitMap(u8);

impl PrimitiveTypesBitMap {
    pub(crate) const fn new() -> Self {
        Self(0)
    }

    #[must_use]
    pub(crate) const fn add_type(self, primitive_type: PrimitiveType) -> Self {
        Self(self.0 | to_bit_representation(primitive_type))
    }

    pub(crate) const fn contains_type(self, primitive_type: PrimitiveType) -> bool {
        self.0 & to_bit_representation(primitive_type) != 0
    }
}

impl IntoIterator for PrimitiveTypesBitMap {
    type Item = PrimitiveType;
    type IntoIter = std::vec::IntoIter<PrimitiveType>;

    fn into_iter(self) -> Self::IntoIter {
        let mut types = Vec::with_capacity(3);
        for candidate in &[
            PrimitiveType::Array,
            PrimitiveType::Boolean,
            PrimitiveType::Integer,
            PrimitiveType::Null,
            PrimitiveType::Number,
            PrimitiveType::Object,
            PrimitiveType::String,
        ] {
            if self.contains_type(*candidate) {
                types.push(*candidate);
            }
        }
        types.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_map_membership() {
        let types = PrimitiveTypesBitMap::new()
            .add_type(PrimitiveType::Integer)
            .add_type(PrimitiveType::Null);
        assert!(types.contains_type(PrimitiveType::Integer));
        assert!(types.contains_type(PrimitiveType::Null));
        assert!(!types.contains_type(PrimitiveType::String));
        assert_eq!(
            types.into_iter().collect::<Vec<_>>(),
            vec![PrimitiveType::Integer, PrimitiveType::Null]
        );
    }
}
