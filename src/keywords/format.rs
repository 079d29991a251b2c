//! Validator registry for the `format` keyword.
use crate::{
    context::ValidationContext,
    document::ParseContext,
    error::SchemaError,
    keyword::{Keyword, KeywordResult},
    result::ValidationResult,
    schemas::{DraftSet, Vocabulary},
};
use regex::Regex;
use serde_json::{Map, Value};
use std::{fmt, net::IpAddr, str::FromStr};
use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};
use url::Url;

lazy_static::lazy_static! {
    static ref IRI_REFERENCE_RE: Regex =
        Regex::new(r"^(\w+:(/?/?))?[^#\\\s]*(#[^\\\s]*)?\z").expect("Is a valid regex");
    static ref JSON_POINTER_RE: Regex =
        Regex::new(r"^(/(([^/~])|(~[01]))*)*\z").expect("Is a valid regex");
    static ref RELATIVE_JSON_POINTER_RE: Regex =
        Regex::new(r"^(?:0|[1-9][0-9]*)(?:#|(?:/(?:[^~/]|~0|~1)*)*)\z").expect("Is a valid regex");
    static ref TIME_RE: Regex = Regex::new(
        r"^([01][0-9]|2[0-3]):([0-5][0-9]):([0-5][0-9]|60)(\.[0-9]+)?(([Zz])|([+-]([01][0-9]|2[0-3]):[0-5][0-9]))\z",
    ).expect("Is a valid regex");
    static ref URI_REFERENCE_RE: Regex =
        Regex::new(r"^(\w+:(/?/?))?[^#\\\s]*(#[^\\\s]*)?\z").expect("Is a valid regex");
    static ref URI_TEMPLATE_RE: Regex = Regex::new(
        r#"^(?:(?:[^\x00-\x20"'<>%\\^`{|}]|%[0-9a-f]{2})|\{[+#./;?&=,!@|]?(?:[a-z0-9_]|%[0-9a-f]{2})+(?::[1-9][0-9]{0,3}|\*)?(?:,(?:[a-z0-9_]|%[0-9a-f]{2})+(?::[1-9][0-9]{0,3}|\*)?)*})*\z"#
    ).expect("Is a valid regex");
}

fn is_valid_date(instance: &str) -> bool {
    Date::parse(instance, &format_description!("[year]-[month]-[day]")).is_ok()
}

fn is_valid_datetime(instance: &str) -> bool {
    OffsetDateTime::parse(instance, &Rfc3339).is_ok()
}

fn is_valid_time(instance: &str) -> bool {
    TIME_RE.is_match(instance)
}

fn is_valid_duration(instance: &str) -> bool {
    iso8601::duration(instance).is_ok()
}

fn is_valid_email(instance: &str) -> bool {
    instance.contains('@')
}

fn is_valid_hostname(instance: &str) -> bool {
    !(instance.ends_with('-')
        || instance.starts_with('-')
        || instance.is_empty()
        || instance.chars().count() > 255
        || instance
            .chars()
            .any(|c| !(c.is_alphanumeric() || c == '-' || c == '.'))
        || instance.split('.').any(|part| part.chars().count() > 63))
}

fn is_valid_ipv4(instance: &str) -> bool {
    if instance.split('.').any(|octet| octet.starts_with('0') && octet.len() > 1) {
        return false;
    }
    match IpAddr::from_str(instance) {
        Ok(address) => address.is_ipv4(),
        Err(_) => false,
    }
}

fn is_valid_ipv6(instance: &str) -> bool {
    match IpAddr::from_str(instance) {
        Ok(address) => address.is_ipv6(),
        Err(_) => false,
    }
}

fn is_valid_uri(instance: &str) -> bool {
    Url::parse(instance).is_ok()
}

fn is_valid_uri_reference(instance: &str) -> bool {
    URI_REFERENCE_RE.is_match(instance)
}

fn is_valid_iri_reference(instance: &str) -> bool {
    IRI_REFERENCE_RE.is_match(instance)
}

fn is_valid_uri_template(instance: &str) -> bool {
    URI_TEMPLATE_RE.is_match(instance)
}

fn is_valid_json_pointer(instance: &str) -> bool {
    JSON_POINTER_RE.is_match(instance)
}

fn is_valid_relative_json_pointer(instance: &str) -> bool {
    RELATIVE_JSON_POINTER_RE.is_match(instance)
}

fn is_valid_regex(instance: &str) -> bool {
    fancy_regex::Regex::new(instance).is_ok()
}

fn is_valid_uuid(instance: &str) -> bool {
    uuid::Uuid::parse_str(instance).is_ok()
}

/// Built-in named validators with the drafts that define them.
fn builtin(format: &str) -> Option<(fn(&str) -> bool, DraftSet)> {
    match format {
        "date-time" => Some((is_valid_datetime, DraftSet::ALL)),
        "email" | "idn-email" => Some((is_valid_email, DraftSet::ALL)),
        "hostname" | "idn-hostname" => Some((is_valid_hostname, DraftSet::ALL)),
        "ipv4" => Some((is_valid_ipv4, DraftSet::ALL)),
        "ipv6" => Some((is_valid_ipv6, DraftSet::ALL)),
        "uri" | "iri" => Some((is_valid_uri, DraftSet::ALL)),
        "uri-reference" => Some((is_valid_uri_reference, DraftSet::DRAFT6_UP)),
        "uri-template" => Some((is_valid_uri_template, DraftSet::DRAFT6_UP)),
        "json-pointer" => Some((is_valid_json_pointer, DraftSet::DRAFT6_UP)),
        "date" => Some((is_valid_date, DraftSet::DRAFT7_UP)),
        "time" => Some((is_valid_time, DraftSet::DRAFT7_UP)),
        "iri-reference" => Some((is_valid_iri_reference, DraftSet::DRAFT7_UP)),
        "relative-json-pointer" => Some((is_valid_relative_json_pointer, DraftSet::DRAFT7_UP)),
        "regex" => Some((is_valid_regex, DraftSet::DRAFT7_UP)),
        "duration" => Some((is_valid_duration, DraftSet::DRAFT201909_ONLY)),
        "uuid" => Some((is_valid_uuid, DraftSet::DRAFT201909_ONLY)),
        _ => None,
    }
}

pub(crate) struct Format {
    format: String,
    check: Option<fn(&str) -> bool>,
    assert: bool,
}

impl Keyword for Format {
    fn name(&self) -> &'static str {
        "format"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Format
    }

    fn validate(&self, ctx: &mut ValidationContext<'_, '_>) -> ValidationResult {
        if self.assert {
            if let (Some(check), Value::String(item)) = (self.check, ctx.instance) {
                if !check(item) {
                    let mut info = Map::new();
                    info.insert("actual".to_string(), ctx.instance.clone());
                    info.insert("format".to_string(), Value::String(self.format.clone()));
                    return ValidationResult::failure(
                        ctx,
                        "format",
                        "{{actual}} is not a {{format}}",
                        info,
                    );
                }
            }
        }
        ValidationResult::annotation(ctx, "format", Value::String(self.format.clone()))
    }

    fn to_json(&self) -> Value {
        Value::String(self.format.clone())
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "format: {}", self.format)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &ParseContext,
) -> Option<KeywordResult> {
    let format = match schema {
        Value::String(format) => format,
        _ => return Some(Err(SchemaError::parse("format", "expected a string"))),
    };
    let check = context.config.custom_format(format).or_else(|| {
        builtin(format).and_then(|(check, drafts)| {
            if drafts.contains(context.draft) {
                Some(check)
            } else {
                None
            }
        })
    });
    if check.is_none() && context.config.validate_format() && !context.config.ignore_unknown_formats()
    {
        return Some(Err(SchemaError::unknown_format(format)));
    }
    Some(Ok(Box::new(Format {
        format: format.clone(),
        check,
        assert: context.config.validate_format(),
    })))
}

#[cfg(test)]
mod tests {
    use crate::{Draft, Schema};
    use serde_json::{json, Value};
    use test_case::test_case;

    fn assert_format(schema: &Value, instance: &Value, expected: bool) {
        let compiled = Schema::options()
            .should_validate_formats(true)
            .parse(schema)
            .unwrap();
        assert_eq!(compiled.is_valid(instance), expected, "{}", instance);
    }

    #[test_case(&json!({"format": "date"}), &json!("2023-02-28"), true)]
    #[test_case(&json!({"format": "date"}), &json!("2023-02-30"), false)]
    #[test_case(&json!({"format": "date-time"}), &json!("2023-02-28T12:00:00Z"), true)]
    #[test_case(&json!({"format": "date-time"}), &json!("not a date"), false)]
    #[test_case(&json!({"format": "time"}), &json!("12:00:00Z"), true)]
    #[test_case(&json!({"format": "time"}), &json!("25:00:00Z"), false)]
    #[test_case(&json!({"format": "duration"}), &json!("P1DT12H"), true)]
    #[test_case(&json!({"format": "duration"}), &json!("one day"), false)]
    #[test_case(&json!({"format": "email"}), &json!("a@b.c"), true)]
    #[test_case(&json!({"format": "email"}), &json!("nope"), false)]
    #[test_case(&json!({"format": "hostname"}), &json!("example.com"), true)]
    #[test_case(&json!({"format": "hostname"}), &json!("-bad-"), false)]
    #[test_case(&json!({"format": "ipv4"}), &json!("127.0.0.1"), true)]
    #[test_case(&json!({"format": "ipv4"}), &json!("2001:db8::1"), false)]
    #[test_case(&json!({"format": "ipv6"}), &json!("2001:db8::1"), true)]
    #[test_case(&json!({"format": "ipv6"}), &json!("127.0.0.1"), false)]
    #[test_case(&json!({"format": "uri"}), &json!("http://example.com/"), true)]
    #[test_case(&json!({"format": "uri"}), &json!("not a uri"), false)]
    #[test_case(&json!({"format": "json-pointer"}), &json!("/a/b"), true)]
    #[test_case(&json!({"format": "json-pointer"}), &json!("a/b"), false)]
    #[test_case(&json!({"format": "regex"}), &json!("^a+$"), true)]
    #[test_case(&json!({"format": "regex"}), &json!("(unclosed"), false)]
    #[test_case(&json!({"format": "uuid"}), &json!("550e8400-e29b-41d4-a716-446655440000"), true)]
    #[test_case(&json!({"format": "uuid"}), &json!("not-a-uuid"), false)]
    #[test_case(&json!({"format": "date"}), &json!(12), true; "non string instances are not applicable")]
    fn format_assertion(schema: &Value, instance: &Value, expected: bool) {
        assert_format(schema, instance, expected)
    }

    #[test]
    fn format_is_annotation_only_by_default() {
        let compiled = Schema::parse(&json!({"format": "date"})).unwrap();
        assert!(compiled.is_valid(&json!("not a date")));
    }

    #[test]
    fn unknown_formats_annotate_by_default() {
        let compiled = Schema::options()
            .should_validate_formats(true)
            .parse(&json!({"format": "made-up"}))
            .unwrap();
        assert!(compiled.is_valid(&json!("anything")));
    }

    #[test]
    fn unknown_formats_can_be_rejected() {
        let result = Schema::options()
            .should_validate_formats(true)
            .should_ignore_unknown_formats(false)
            .parse(&json!({"format": "made-up"}));
        assert!(result.is_err());
    }

    #[test]
    fn formats_from_later_drafts_do_not_assert() {
        // `uuid` arrived in 2019-09; under draft 7 it is an unknown format.
        let compiled = Schema::options()
            .with_draft(Draft::Draft7)
            .should_validate_formats(true)
            .parse(&json!({"format": "uuid"}))
            .unwrap();
        assert!(compiled.is_valid(&json!("not-a-uuid")));
    }

    #[test]
    fn custom_format() {
        fn is_even_length(value: &str) -> bool {
            value.len() % 2 == 0
        }
        let compiled = Schema::options()
            .with_format("even-length", is_even_length)
            .should_validate_formats(true)
            .parse(&json!({"format": "even-length"}))
            .unwrap();
        assert!(compiled.is_valid(&json!("ab")));
        assert!(!compiled.is_valid(&json!("abc")));
    }
}
