//! Checks and converters for `contentEncoding` values.
use ahash::AHashMap;

pub(crate) type ContentEncodingCheckType = fn(&str) -> bool;
/// Decode the instance string; `None` means the encoding did not apply.
pub(crate) type ContentEncodingConverterType = fn(&str) -> Option<String>;

pub(crate) fn is_base64(instance_string: &str) -> bool {
    base64::decode(instance_string).is_ok()
}

pub(crate) fn from_base64(instance_string: &str) -> Option<String> {
    let decoded = base64::decode(instance_string).ok()?;
    String::from_utf8(decoded).ok()
}

lazy_static::lazy_static! {
    pub(crate) static ref DEFAULT_CONTENT_ENCODING_CHECKS_AND_CONVERTERS: AHashMap<&'static str, (ContentEncodingCheckType, ContentEncodingConverterType)> = {
        let mut map: AHashMap<&'static str, (ContentEncodingCheckType, ContentEncodingConverterType)> = AHashMap::with_capacity(1);
        map.insert("base64", (is_base64, from_base64));
        map
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_round_trip() {
        assert!(is_base64("YWJj"));
        assert_eq!(from_base64("YWJj"), Some("abc".to_string()));
        assert!(!is_base64("a=b"));
        assert_eq!(from_base64("a=b"), None);
    }
}
