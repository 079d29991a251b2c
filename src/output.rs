//! Output formats for validation results, following the JSON Schema 2019-09
//! output structure: `Flag`, `Basic` and `Detailed`.
use crate::{paths::JSONPointer, result::ValidationResult, Schema};
use serde::ser::SerializeMap;
use serde_json::Value;
use std::collections::VecDeque;

/// How much structure a validation run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// A single boolean; evaluation may stop at the first failure.
    Flag,
    /// A flat list of failing keywords (or annotations when valid).
    Basic,
    /// The full result tree.
    Detailed,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Basic
    }
}

/// The output of applying a schema to an instance. No work happens until one
/// of the format methods is called, because the formats have different
/// performance characteristics.
#[derive(Debug, Clone)]
pub struct Output<'a, 'b> {
    schema: &'a Schema,
    instance: &'b Value,
}

impl<'a, 'b> Output<'a, 'b> {
    pub(crate) const fn new(schema: &'a Schema, instance: &'b Value) -> Output<'a, 'b> {
        Output { schema, instance }
    }

    /// Indicates whether the instance was valid, corresponds to the "flag"
    /// output format.
    #[must_use]
    pub fn flag(&self) -> bool {
        self.schema.is_valid(self.instance)
    }

    /// A flat list of errors (or annotations) for each evaluated keyword
    /// according to the basic output format.
    pub fn basic(&self) -> BasicOutput {
        BasicOutput::from_tree(&self.schema.run(self.instance, false))
    }

    /// The full result tree.
    pub fn detailed(&self) -> ValidationResult {
        self.schema.run(self.instance, false)
    }
}

/// The "basic" output format.
#[derive(Debug, Clone, PartialEq)]
pub enum BasicOutput {
    /// The instance was valid; collected annotations can be examined.
    Valid(VecDeque<OutputUnit<Value>>),
    /// The instance was invalid.
    Invalid(VecDeque<OutputUnit<ErrorDescription>>),
}

impl BasicOutput {
    /// Whether the instance was valid.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        match self {
            BasicOutput::Valid(..) => true,
            BasicOutput::Invalid(..) => false,
        }
    }

    fn from_tree(tree: &ValidationResult) -> BasicOutput {
        if tree.is_valid() {
            let mut units = VecDeque::new();
            collect_annotations(tree, &mut units);
            BasicOutput::Valid(units)
        } else {
            let mut units = VecDeque::new();
            collect_errors(tree, &mut units);
            BasicOutput::Invalid(units)
        }
    }
}

fn collect_annotations(result: &ValidationResult, units: &mut VecDeque<OutputUnit<Value>>) {
    if let Some(annotation) = result.annotation_value() {
        units.push_back(OutputUnit {
            keyword_location: result.relative_location().clone(),
            instance_location: result.instance_location().clone(),
            absolute_keyword_location: result.absolute_location().map(String::from),
            value: annotation.clone(),
        });
    }
    for nested in result.nested() {
        collect_annotations(nested, units);
    }
}

fn collect_errors(result: &ValidationResult, units: &mut VecDeque<OutputUnit<ErrorDescription>>) {
    if let Some(error) = result.error_message() {
        units.push_back(OutputUnit {
            keyword_location: result.relative_location().clone(),
            instance_location: result.instance_location().clone(),
            absolute_keyword_location: result.absolute_location().map(String::from),
            value: ErrorDescription(error.to_string()),
        });
    }
    for nested in result.nested() {
        if !nested.is_valid() {
            collect_errors(nested, units);
        }
    }
}

/// One entry of the basic output: a location triple plus an error message or
/// an annotation value.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputUnit<T> {
    keyword_location: JSONPointer,
    instance_location: JSONPointer,
    absolute_keyword_location: Option<String>,
    value: T,
}

impl<T> OutputUnit<T> {
    /// Path of keywords traversed from the validation root.
    pub fn keyword_location(&self) -> &JSONPointer {
        &self.keyword_location
    }

    /// Path into the root instance.
    pub fn instance_location(&self) -> &JSONPointer {
        &self.instance_location
    }

    /// Absolute URI of the keyword, when its schema document has one.
    pub fn absolute_keyword_location(&self) -> Option<&str> {
        self.absolute_keyword_location.as_deref()
    }

    /// The error message or annotation value.
    pub fn value(&self) -> &T {
        &self.value
    }
}

/// A rendered error message.
#[derive(serde::Serialize, Debug, Clone, PartialEq)]
pub struct ErrorDescription(String);

impl From<&str> for ErrorDescription {
    fn from(s: &str) -> Self {
        ErrorDescription(s.to_string())
    }
}

impl serde::Serialize for BasicOutput {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map_ser = serializer.serialize_map(Some(2))?;
        match self {
            BasicOutput::Valid(outputs) => {
                map_ser.serialize_entry("valid", &true)?;
                map_ser.serialize_entry("annotations", outputs)?;
            }
            BasicOutput::Invalid(errors) => {
                map_ser.serialize_entry("valid", &false)?;
                map_ser.serialize_entry("errors", errors)?;
            }
        }
        map_ser.end()
    }
}

impl serde::Serialize for OutputUnit<Value> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map_ser = serializer.serialize_map(Some(4))?;
        map_ser.serialize_entry("keywordLocation", &self.keyword_location)?;
        map_ser.serialize_entry("instanceLocation", &self.instance_location)?;
        if let Some(absolute) = &self.absolute_keyword_location {
            map_ser.serialize_entry("absoluteKeywordLocation", absolute)?;
        }
        map_ser.serialize_entry("annotation", &self.value)?;
        map_ser.end()
    }
}

impl serde::Serialize for OutputUnit<ErrorDescription> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map_ser = serializer.serialize_map(Some(4))?;
        map_ser.serialize_entry("keywordLocation", &self.keyword_location)?;
        map_ser.serialize_entry("instanceLocation", &self.instance_location)?;
        if let Some(absolute) = &self.absolute_keyword_location {
            map_ser.serialize_entry("absoluteKeywordLocation", absolute)?;
        }
        map_ser.serialize_entry("error", &self.value)?;
        map_ser.end()
    }
}

#[cfg(test)]
mod tests {
    use crate::Schema;
    use serde_json::json;

    #[test]
    fn basic_output_collects_annotations() {
        let schema = Schema::parse(&json!({
            "title": "string value",
            "type": "string"
        }))
        .unwrap();
        let output = schema.apply(&json!("some string")).basic();
        let output_json = serde_json::to_value(&output).unwrap();
        assert_eq!(
            output_json,
            json!({
                "valid": true,
                "annotations": [
                    {
                        "keywordLocation": "/title",
                        "instanceLocation": "",
                        "annotation": "string value"
                    }
                ]
            })
        );
    }

    #[test]
    fn basic_output_collects_errors() {
        let schema = Schema::parse(&json!({"maxLength": 3})).unwrap();
        let output = schema.apply(&json!("too long")).basic();
        let output_json = serde_json::to_value(&output).unwrap();
        assert_eq!(
            output_json,
            json!({
                "valid": false,
                "errors": [
                    {
                        "keywordLocation": "/maxLength",
                        "instanceLocation": "",
                        "error": "\"too long\" is longer than 3 characters"
                    }
                ]
            })
        );
    }

    #[test]
    fn flag_matches_detailed_validity() {
        let schema = Schema::parse(&json!({"minimum": 2})).unwrap();
        for instance in &[json!(1), json!(2), json!("not a number")] {
            let output = schema.apply(instance);
            assert_eq!(output.flag(), output.detailed().is_valid());
        }
    }
}
