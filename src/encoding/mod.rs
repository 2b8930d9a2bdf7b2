//! Wire-string encoding.
//!
//! Renders parameter values into their wire form and exposes the pluggable
//! JSON serializer seam consumed by the request builder and the response
//! interpreter. URL-encoding is applied exactly once, at the outer
//! query/body rendering layer; `encode_value` itself never percent-encodes.

use std::borrow::Cow;

use crate::error::FbError;
use crate::params::{ParamValue, Params};

/// Render a single parameter value into its wire-string form.
///
/// - `Null` becomes the literal `null`; booleans `true`/`false`
/// - Numbers use invariant decimal text (no locale variance)
/// - Dates are ISO-8601, timezone-normalized to UTC
/// - Key-value sets render as `key=value` pairs joined by `&`
/// - Plain lists render comma-separated (the API's list convention,
///   e.g. `fields=id,name`)
/// - Attachments are legal only at the top level of a call's parameters and
///   fail here
pub fn encode_value(value: &ParamValue) -> Result<String, FbError> {
    match value {
        ParamValue::Null => Ok("null".to_string()),
        ParamValue::Bool(b) => Ok(b.to_string()),
        ParamValue::Int(i) => Ok(i.to_string()),
        ParamValue::Float(f) => Ok(f.to_string()),
        ParamValue::String(s) => Ok(s.clone()),
        ParamValue::Date(d) => Ok(d.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
        ParamValue::List(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                parts.push(encode_value(item)?);
            }
            Ok(parts.join(","))
        }
        ParamValue::Object(params) => {
            let mut parts = Vec::with_capacity(params.len());
            for (key, value) in params.iter() {
                if value.is_attachment() {
                    return Err(FbError::UnsupportedOperation(
                        "attachments are not valid inside nested parameters".into(),
                    ));
                }
                parts.push(format!("{}={}", key, encode_value(value)?));
            }
            Ok(parts.join("&"))
        }
        ParamValue::Attachment(_) | ParamValue::Stream(_) => Err(FbError::UnsupportedOperation(
            "attachments are not valid inside nested parameters".into(),
        )),
    }
}

/// Percent-encode a single query component.
pub fn url_encode(s: &str) -> Cow<'_, str> {
    urlencoding::encode(s)
}

/// Percent-decode a single query component.
pub fn url_decode(s: &str) -> Result<String, FbError> {
    urlencoding::decode(s)
        .map(Cow::into_owned)
        .map_err(|e| FbError::InvalidPath(format!("malformed query component: {e}")))
}

/// Render a parameter set as an URL-encoded `k=v&...` string.
///
/// This is the single place the outer URL-encoding pass happens, used for
/// both query strings and `application/x-www-form-urlencoded` bodies.
pub fn to_query_string(params: &Params) -> Result<String, FbError> {
    let mut parts = Vec::with_capacity(params.len());
    for (key, value) in params.iter() {
        let encoded = encode_value(value)?;
        parts.push(format!("{}={}", url_encode(key), url_encode(&encoded)));
    }
    Ok(parts.join("&"))
}

/// Pluggable JSON serializer/deserializer pair.
///
/// Clients default to serde_json but may substitute their own implementation
/// per client instance.
pub trait JsonSerializer: Send + Sync {
    fn serialize(&self, value: &serde_json::Value) -> Result<String, FbError>;
    fn deserialize(&self, text: &str) -> Result<serde_json::Value, FbError>;
}

/// The serde_json-backed default serializer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerdeSerializer;

impl JsonSerializer for SerdeSerializer {
    fn serialize(&self, value: &serde_json::Value) -> Result<String, FbError> {
        serde_json::to_string(value).map_err(Into::into)
    }

    fn deserialize(&self, text: &str) -> Result<serde_json::Value, FbError> {
        serde_json::from_str(text).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn scalars_encode_invariantly() {
        assert_eq!(encode_value(&ParamValue::Null).unwrap(), "null");
        assert_eq!(encode_value(&ParamValue::Bool(true)).unwrap(), "true");
        assert_eq!(encode_value(&ParamValue::Int(1234567)).unwrap(), "1234567");
        assert_eq!(encode_value(&ParamValue::Float(1.5)).unwrap(), "1.5");
        assert_eq!(
            encode_value(&ParamValue::String("plain text".into())).unwrap(),
            "plain text"
        );
    }

    #[test]
    fn dates_encode_as_iso8601_utc() {
        let date = chrono::Utc.with_ymd_and_hms(2012, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(
            encode_value(&ParamValue::Date(date)).unwrap(),
            "2012-03-04T05:06:07Z"
        );
    }

    #[test]
    fn lists_join_with_commas() {
        let value = ParamValue::List(vec![
            ParamValue::String("id".into()),
            ParamValue::String("name".into()),
        ]);
        assert_eq!(encode_value(&value).unwrap(), "id,name");
    }

    #[test]
    fn objects_join_pairs_with_ampersands() {
        let mut inner = Params::new();
        inner.insert("value", 42i64);
        inner.insert("comment", "great");
        let encoded = encode_value(&ParamValue::Object(inner)).unwrap();
        assert_eq!(encoded, "value=42&comment=great");
        assert!(!encoded.ends_with('&'));
    }

    #[test]
    fn nested_attachment_is_rejected() {
        let mut inner = Params::new();
        inner.insert(
            "photo",
            crate::params::MediaBytes::new("image/png", "a.png", vec![1]),
        );
        let err = encode_value(&ParamValue::Object(inner)).unwrap_err();
        assert!(matches!(err, FbError::UnsupportedOperation(_)));
    }

    #[test]
    fn query_string_url_encodes_once() {
        let mut params = Params::new();
        params.insert("message", "hello world & more");
        assert_eq!(
            to_query_string(&params).unwrap(),
            "message=hello%20world%20%26%20more"
        );
    }

    #[test]
    fn encoded_object_round_trips_key_set() {
        let mut inner = Params::new();
        inner.insert("a", 1i64);
        inner.insert("b", "two");
        inner.insert("c", true);
        let encoded = encode_value(&ParamValue::Object(inner)).unwrap();

        let keys: Vec<_> = encoded
            .split('&')
            .map(|pair| pair.split('=').next().unwrap())
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        let values: Vec<_> = encoded
            .split('&')
            .map(|pair| pair.split('=').nth(1).unwrap())
            .collect();
        assert_eq!(values, vec!["1", "two", "true"]);
    }
}
