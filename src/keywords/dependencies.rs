use crate::{
    context::ValidationContext,
    document::{ParseContext, SchemaDocument},
    error::SchemaError,
    keyword::{sequence, Keyword, KeywordResult, LocalIds},
    paths::{JSONPointer, PathChunk},
    result::ValidationResult,
    schemas::{DraftSet, Vocabulary},
};
use serde_json::{json, Map, Value};
use std::fmt;
use url::Url;

pub(crate) enum Dependency {
    Schema(SchemaDocument),
    Required(Vec<String>),
}

/// Draft ≤ 7 `dependencies`: per-property schema or required-list form.
pub(crate) struct Dependencies {
    dependencies: Vec<(String, Dependency)>,
}

fn validate_dependencies(
    keyword: &'static str,
    dependencies: &[(String, Dependency)],
    ctx: &mut ValidationContext<'_, '_>,
) -> ValidationResult {
    let object = match ctx.instance {
        Value::Object(object) => object,
        _ => return ValidationResult::success(ctx, keyword),
    };
    let mut result = ValidationResult::success(ctx, keyword);
    for (property, dependency) in dependencies {
        if !object.contains_key(property.as_str()) {
            continue;
        }
        match dependency {
            Dependency::Schema(schema) => {
                let mut child = ctx.frame_child(&[
                    PathChunk::from(keyword),
                    PathChunk::from(property.as_str()),
                ]);
                let nested = schema.validate(&mut child);
                if nested.is_valid() {
                    ctx.merge_evaluated(&child);
                }
                result.push(nested);
            }
            Dependency::Required(required) => {
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
                        keyword,
                        "{{property}} requires properties {{missing}}",
                        info,
                    ));
                }
            }
        }
        if !result.is_valid() && ctx.flag() {
            return result;
        }
    }
    result
}

fn register_dependencies(
    keyword: &str,
    dependencies: &[(String, Dependency)],
    scope: &Url,
    location: &JSONPointer,
    ids: &mut LocalIds,
) {
    for (property, dependency) in dependencies {
        if let Dependency::Schema(schema) = dependency {
            schema.collect_ids(
                scope,
                &location.join(keyword).join(property.as_str()),
                ids,
            );
        }
    }
}

fn resolve_dependency<'a>(
    dependencies: &'a [(String, Dependency)],
    chunks: &[PathChunk],
) -> Option<&'a SchemaDocument> {
    let (head, rest) = chunks.split_first()?;
    let name = match head {
        PathChunk::Name(name) => name,
        PathChunk::Index(_) => return None,
    };
    dependencies
        .iter()
        .find(|(property, _)| property == name)
        .and_then(|(_, dependency)| match dependency {
            Dependency::Schema(schema) => schema.resolve_pointer(rest),
            Dependency::Required(_) => None,
        })
}

fn dependencies_to_json(dependencies: &[(String, Dependency)]) -> Value {
    Value::Object(
        dependencies
            .iter()
            .map(|(property, dependency)| {
                let value = match dependency {
                    Dependency::Schema(schema) => schema.to_json(),
                    Dependency::Required(required) => json!(required),
                };
                (property.clone(), value)
            })
            .collect(),
    )
}

impl Keyword for Dependencies {
    fn name(&self) -> &'static str {
        "dependencies"
    }

    fn drafts(&self) -> DraftSet {
        DraftSet::BEFORE_DRAFT201909
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn sequence(&self) -> u8 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        validate_dependencies("dependencies", &self.dependencies, ctx)
    }

    fn register_subschemas(&self, scope: &Url, location: &JSONPointer, ids: &mut LocalIds) {
        register_dependencies("dependencies", &self.dependencies, scope, location, ids);
    }

    fn resolve_subschema(&self, chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        resolve_dependency(&self.dependencies, chunks)
    }

    fn to_json(&self) -> Value {
        dependencies_to_json(&self.dependencies)
    }
}

impl fmt::Display for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dependencies: {}", dependencies_to_json(&self.dependencies))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    match parse_dependencies(schema, context, true) {
        Ok(dependencies) => Some(Ok(Box::new(Dependencies { dependencies }))),
        Err(error) => Some(Err(error)),
    }
}

fn parse_dependencies(
    schema: &Value,
    context: &ParseContext,
    allow_required_form: bool,
) -> Result<Vec<(String, Dependency)>, SchemaError> {
    let object = match schema {
        Value::Object(object) => object,
        _ => return Err(SchemaError::parse("dependencies", "expected an object")),
    };
    let mut dependencies = Vec::with_capacity(object.len());
    for (property, dependency) in object {
        let parsed = match dependency {
            Value::Array(names) if allow_required_form => {
                let mut required = Vec::with_capacity(names.len());
                for name in names {
                    match name.as_str() {
                        Some(name) => required.push(name.to_string()),
                        None => {
                            return Err(SchemaError::parse(
                                "dependencies",
                                "expected an array of strings",
                            ))
                        }
                    }
                }
                Dependency::Required(required)
            }
            _ => Dependency::Schema(SchemaDocument::from_value(dependency, context)?),
        };
        dependencies.push((property.clone(), parsed));
    }
    Ok(dependencies)
}

/// 2019-09 `dependentSchemas`: the schema form of `dependencies`.
pub(crate) struct DependentSchemas {
    dependencies: Vec<(String, Dependency)>,
}

impl Keyword for DependentSchemas {
    fn name(&self) -> &'static str {
        "dependentSchemas"
    }

    fn drafts(&self) -> DraftSet {
        DraftSet::DRAFT201909_ONLY
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn sequence(&self) -> u8 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        validate_dependencies("dependentSchemas", &self.dependencies, ctx)
    }

    fn register_subschemas(&self, scope: &Url, location: &JSONPointer, ids: &mut LocalIds) {
        register_dependencies("dependentSchemas", &self.dependencies, scope, location, ids);
    }

    fn resolve_subschema(&self, chunks: &[PathChunk]) -> Option<&SchemaDocument> {
        resolve_dependency(&self.dependencies, chunks)
    }

    fn to_json(&self) -> Value {
        dependencies_to_json(&self.dependencies)
    }
}

impl fmt::Display for DependentSchemas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dependentSchemas: {}",
            dependencies_to_json(&self.dependencies)
        )
    }
}

#[inline]
pub(crate) fn compile_dependent_schemas(
    _: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    match parse_dependencies(schema, context, false) {
        Ok(dependencies) => Some(Ok(Box::new(DependentSchemas { dependencies }))),
        Err(error) => Some(Err(error)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"dependencies": {"bar": ["foo"]}}), &json!({"foo": 1, "bar": 2}))]
    #[test_case(&json!({"dependencies": {"bar": ["foo"]}}), &json!({"foo": 1}))]
    #[test_case(&json!({"dependencies": {"bar": {"minProperties": 2}}}), &json!({"bar": 1, "x": 2}))]
    #[test_case(&json!({"dependencies": {"bar": ["foo"]}}), &json!([1]))]
    fn dependencies_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid_draft(crate::Draft::Draft7, schema, instance)
    }

    #[test_case(&json!({"dependencies": {"bar": ["foo"]}}), &json!({"bar": 2}))]
    #[test_case(&json!({"dependencies": {"bar": {"minProperties": 2}}}), &json!({"bar": 1}))]
    fn dependencies_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid_draft(crate::Draft::Draft7, schema, instance)
    }

    #[test_case(&json!({"dependentSchemas": {"bar": {"required": ["foo"]}}}), &json!({"bar": 1, "foo": 2}))]
    fn dependent_schemas_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"dependentSchemas": {"bar": {"required": ["foo"]}}}), &json!({"bar": 1}))]
    fn dependent_schemas_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
