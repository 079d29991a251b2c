//! Checks for `contentMediaType` values.
use ahash::AHashMap;
use serde_json::Value;

pub(crate) type ContentMediaTypeCheckType = fn(&str) -> bool;

pub(crate) fn is_json(instance_string: &str) -> bool {
    serde_json::from_str::<Value>(instance_string).is_ok()
}

lazy_static::lazy_static! {
    pub(crate) static ref DEFAULT_CONTENT_MEDIA_TYPE_CHECKS: AHashMap<&'static str, ContentMediaTypeCheckType> = {
        let mut map: AHashMap<&'static str, ContentMediaTypeCheckType> = AHashMap::with_capacity(1);
        map.insert("application/json", is_json);
        map
    };
}

#[cfg(test)]
mod tests {
    use super::is_json;

    #[test]
    fn json_media_type() {
        assert!(is_json("{\"a\": 1}"));
        assert!(!is_json("{not json"));
    }
}
