//! The result tree produced by one validation run.
use crate::{context::ValidationContext, paths::JSONPointer};
use serde_json::{Map, Value};

/// Outcome of evaluating one keyword (or one whole schema object) against one
/// instance location. Results nest: a schema object's result holds one child
/// per evaluated keyword, applicator keywords hold one child per applied
/// subschema.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub(crate) keyword: Option<String>,
    pub(crate) instance_location: JSONPointer,
    pub(crate) relative_location: JSONPointer,
    pub(crate) absolute_location: Option<String>,
    pub(crate) valid: bool,
    pub(crate) error: Option<String>,
    pub(crate) additional_info: Map<String, Value>,
    pub(crate) annotation: Option<Value>,
    pub(crate) nested: Vec<ValidationResult>,
}

impl ValidationResult {
    fn base(ctx: &ValidationContext<'_, '_>, keyword: Option<&str>) -> ValidationResult {
        let relative_location = match keyword {
            Some(name) => ctx.relative_location.join(name),
            None => ctx.relative_location.clone(),
        };
        ValidationResult {
            keyword: keyword.map(String::from),
            instance_location: ctx.instance_location.clone(),
            relative_location,
            absolute_location: ctx.absolute_location(keyword),
            valid: true,
            error: None,
            additional_info: Map::new(),
            annotation: None,
            nested: Vec::new(),
        }
    }

    /// A passing result without annotations, also used when a keyword does not
    /// apply to the instance's type.
    pub(crate) fn success(ctx: &ValidationContext<'_, '_>, keyword: &str) -> ValidationResult {
        ValidationResult::base(ctx, Some(keyword))
    }

    /// A passing result carrying an annotation value.
    pub(crate) fn annotation(
        ctx: &ValidationContext<'_, '_>,
        keyword: &str,
        value: Value,
    ) -> ValidationResult {
        let mut result = ValidationResult::base(ctx, Some(keyword));
        result.annotation = Some(value);
        result
    }

    /// A failing result. `template` refers to `info` entries via `{{token}}`.
    pub(crate) fn failure(
        ctx: &ValidationContext<'_, '_>,
        keyword: &str,
        template: &str,
        info: Map<String, Value>,
    ) -> ValidationResult {
        let mut result = ValidationResult::base(ctx, Some(keyword));
        result.valid = false;
        result.error = Some(render_template(template, &info));
        result.additional_info = info;
        result
    }

    /// The composite result of a whole schema object.
    pub(crate) fn composite(
        ctx: &ValidationContext<'_, '_>,
        nested: Vec<ValidationResult>,
    ) -> ValidationResult {
        let mut result = ValidationResult::base(ctx, None);
        result.valid = nested.iter().all(ValidationResult::is_valid);
        result.nested = nested;
        result
    }

    pub(crate) fn push(&mut self, nested: ValidationResult) {
        self.valid = self.valid && nested.valid;
        self.nested.push(nested);
    }

    pub(crate) fn set_invalid(&mut self, template: &str, info: Map<String, Value>) {
        self.valid = false;
        self.error = Some(render_template(template, &info));
        self.additional_info = info;
    }

    /// Whether the evaluated subtree passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The keyword this result belongs to, absent for composite nodes.
    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    /// Path into the root instance.
    pub fn instance_location(&self) -> &JSONPointer {
        &self.instance_location
    }

    /// Path of keywords traversed from the validation root.
    pub fn relative_location(&self) -> &JSONPointer {
        &self.relative_location
    }

    /// Absolute URI of the keyword, when the enclosing schema has one.
    pub fn absolute_location(&self) -> Option<&str> {
        self.absolute_location.as_deref()
    }

    /// The rendered error message of a failing keyword.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Tokens the error message was rendered from.
    pub fn additional_info(&self) -> &Map<String, Value> {
        &self.additional_info
    }

    /// The annotation emitted by a passing keyword.
    pub fn annotation_value(&self) -> Option<&Value> {
        self.annotation.as_ref()
    }

    /// Per-keyword / per-subschema child results.
    pub fn nested(&self) -> &[ValidationResult] {
        &self.nested
    }
}

impl serde::Serialize for ValidationResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("valid", &self.valid)?;
        map.serialize_entry("keywordLocation", &self.relative_location)?;
        if let Some(absolute) = &self.absolute_location {
            map.serialize_entry("absoluteKeywordLocation", absolute)?;
        }
        map.serialize_entry("instanceLocation", &self.instance_location)?;
        if let Some(error) = &self.error {
            map.serialize_entry("error", error)?;
        }
        if let Some(annotation) = &self.annotation {
            map.serialize_entry("annotation", annotation)?;
        }
        if !self.nested.is_empty() {
            if self.valid {
                map.serialize_entry("annotations", &self.nested)?;
            } else {
                map.serialize_entry("errors", &self.nested)?;
            }
        }
        map.end()
    }
}

/// Replace each `{{name}}` with the JSON text of `info[name]` (strings come
/// out quoted). Unknown tokens are left literal.
pub(crate) fn render_template(template: &str, info: &Map<String, Value>) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        rendered.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let token = &after[..end];
                match info.get(token) {
                    Some(value) => rendered.push_str(&value.to_string()),
                    None => {
                        rendered.push_str("{{");
                        rendered.push_str(token);
                        rendered.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                rendered.push_str("{{");
                rest = after;
            }
        }
    }
    rendered.push_str(rest);
    rendered
}

#[cfg(test)]
mod tests {
    use super::render_template;
    use serde_json::{json, Map, Value};
    use test_case::test_case;

    fn info() -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("actual".to_string(), json!(5));
        map.insert("expected".to_string(), json!("five"));
        map
    }

    #[test_case("{{actual}} is not {{expected}}", "5 is not \"five\"")]
    #[test_case("{{unknown}} stays", "{{unknown}} stays")]
    #[test_case("no tokens", "no tokens")]
    #[test_case("dangling {{", "dangling {{")]
    fn template_rendering(template: &str, expected: &str) {
        assert_eq!(render_template(template, &info()), expected);
    }
}
