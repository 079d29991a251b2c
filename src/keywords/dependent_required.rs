use crate::{
    context::ValidationContext,
    document::ParseContext,
    error::SchemaError,
    keyword::{Keyword, KeywordResult},
    result::ValidationResult,
    schemas::{DraftSet, Vocabulary},
};
use serde_json::{json, Map, Value};
use std::fmt;

/// 2019-09 `dependentRequired`: the required-list form of `dependencies`.
pub(crate) struct DependentRequired {
    dependencies: Vec<(String, Vec<String>)>,
}

impl Keyword for DependentRequired {
    fn name(&self) -> &'static str {
        "dependentRequired"
    }

    fn drafts(&self) -> DraftSet {
        DraftSet::DRAFT201909_ONLY
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Validation
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        let object = match ctx.instance {
            Value::Object(object) => object,
            _ => return ValidationResult::success(ctx, "dependentRequired"),
        };
        let mut result = ValidationResult::success(ctx, "dependentRequired");
        for (property, required) in &self.dependencies {
            if !object.contains_key(property.as_str()) {
                continue;
            }
            let missing: Vec<&String> = required
                .iter()
                .filter(|name| !object.contains_key(name.as_str()))
                .collect();
            if !missing.is_empty() {
                let mut info = Map::new();
                info.insert("property".to_string(), json!(property));
                info.insert("missing".to_string(), json!(missing));
                result.push(ValidationResult::failure(
                    ctx,
                    "dependentRequired",
                    "{{property}} requires properties {{missing}}",
                    info,
                ));
                if ctx.flag() {
                    return result;
                }
            }
        }
        result
    }

    fn to_json(&self) -> Value {
        Value::Object(
            self.dependencies
                .iter()
                .map(|(property, required)| (property.clone(), json!(required)))
                .collect(),
        )
    }
}

impl fmt::Display for DependentRequired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dependentRequired: {}", self.to_json())
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &ParseContext,
) -> Option<KeywordResult> {
    let object = match schema {
        Value::Object(object) => object,
        _ => {
            return Some(Err(SchemaError::parse(
                "dependentRequired",
                "expected an object",
            )))
        }
    };
    let mut dependencies = Vec::with_capacity(object.len());
    for (property, names) in object {
        let names = match names {
            Value::Array(names) => names,
            _ => {
                return Some(Err(SchemaError::parse(
                    "dependentRequired",
                    "expected an array of strings",
                )))
            }
        };
        let mut required = Vec::with_capacity(names.len());
        for name in names {
            match name.as_str() {
                Some(name) => required.push(name.to_string()),
                None => {
                    return Some(Err(SchemaError::parse(
                        "dependentRequired",
                        "expected an array of strings",
                    )))
                }
            }
        }
        dependencies.push((property.clone(), required));
    }
    Some(Ok(Box::new(DependentRequired { dependencies })))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"dependentRequired": {"bar": ["foo"]}}), &json!({"bar": 1, "foo": 2}))]
    #[test_case(&json!({"dependentRequired": {"bar": ["foo"]}}), &json!({"foo": 1}))]
    #[test_case(&json!({"dependentRequired": {"bar": ["foo"]}}), &json!("not an object"))]
    fn dependent_required_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"dependentRequired": {"bar": ["foo"]}}), &json!({"bar": 1}))]
    fn dependent_required_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
