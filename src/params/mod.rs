//! Call parameters.
//!
//! A single API call takes an insertion-ordered set of loosely-typed
//! parameters (`Params`). Values are a closed union (`ParamValue`) over the
//! kinds the wire format distinguishes: scalars, dates, nested sets, lists,
//! and binary attachments. Attachments are legal only at the top level of the
//! outermost set of a call; `normalize` moves them into side collections so
//! the request builder can give them multipart treatment while the remaining
//! values are stringified.

use std::fmt;
use std::io;
use std::pin::Pin;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::Serialize;

use crate::error::FbError;

/// Caller-owned readable byte stream used for stream attachments.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// A binary attachment held fully in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBytes {
    pub content_type: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl MediaBytes {
    pub fn new(
        content_type: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// A binary attachment backed by a caller-owned stream.
///
/// The engine only borrows a read reference: assembling a multipart body
/// consumes the stream lazily and never buffers or closes it eagerly.
pub struct MediaStream {
    pub content_type: String,
    pub file_name: String,
    pub stream: ByteStream,
}

impl MediaStream {
    pub fn new(
        content_type: impl Into<String>,
        file_name: impl Into<String>,
        stream: ByteStream,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            file_name: file_name.into(),
            stream,
        }
    }
}

impl fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStream")
            .field("content_type", &self.content_type)
            .field("file_name", &self.file_name)
            .field("stream", &"<byte stream>")
            .finish()
    }
}

/// A loosely-typed parameter value.
#[derive(Debug)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(DateTime<Utc>),
    List(Vec<ParamValue>),
    Object(Params),
    Attachment(MediaBytes),
    Stream(MediaStream),
}

impl ParamValue {
    /// Whether this value is an attachment of either kind.
    pub fn is_attachment(&self) -> bool {
        matches!(self, Self::Attachment(_) | Self::Stream(_))
    }

    /// Convert a decoded JSON tree into a parameter value.
    ///
    /// This is the flattening boundary for ad-hoc structured parameter
    /// records: anything serializable goes through `serde_json::Value` first.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    Self::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => {
                let mut params = Params::new();
                for (k, v) in map {
                    params.insert(k, Self::from_json(v));
                }
                Self::Object(params)
            }
        }
    }

    /// Convert this value into a JSON tree.
    ///
    /// Dates become ISO-8601 strings. Attachments have no JSON form and
    /// yield an error; they must be extracted by `normalize` first.
    pub fn to_json(&self) -> Result<serde_json::Value, FbError> {
        match self {
            Self::Null => Ok(serde_json::Value::Null),
            Self::Bool(b) => Ok(serde_json::Value::Bool(*b)),
            Self::Int(i) => Ok(serde_json::Value::from(*i)),
            Self::Float(f) => Ok(serde_json::Value::from(*f)),
            Self::String(s) => Ok(serde_json::Value::String(s.clone())),
            Self::Date(d) => Ok(serde_json::Value::String(
                d.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            )),
            Self::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(item.to_json()?);
                }
                Ok(serde_json::Value::Array(out))
            }
            Self::Object(params) => {
                let mut map = serde_json::Map::new();
                for (k, v) in params.iter() {
                    map.insert(k.clone(), v.to_json()?);
                }
                Ok(serde_json::Value::Object(map))
            }
            Self::Attachment(_) | Self::Stream(_) => Err(FbError::UnsupportedOperation(
                "attachments cannot be serialized as JSON".into(),
            )),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for ParamValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u32> for ParamValue {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for ParamValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(d: DateTime<Utc>) -> Self {
        Self::Date(d)
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(items: Vec<ParamValue>) -> Self {
        Self::List(items)
    }
}

impl From<Params> for ParamValue {
    fn from(params: Params) -> Self {
        Self::Object(params)
    }
}

impl From<MediaBytes> for ParamValue {
    fn from(a: MediaBytes) -> Self {
        Self::Attachment(a)
    }
}

impl From<MediaStream> for ParamValue {
    fn from(a: MediaStream) -> Self {
        Self::Stream(a)
    }
}

impl From<serde_json::Value> for ParamValue {
    fn from(value: serde_json::Value) -> Self {
        Self::from_json(value)
    }
}

/// An insertion-ordered set of named parameters with unique keys.
#[derive(Debug, Default)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten any serializable record into a parameter set.
    ///
    /// Fails unless the record serializes to a JSON object.
    pub fn from_serialize<T: Serialize>(record: &T) -> Result<Self, FbError> {
        let value = serde_json::to_value(record)?;
        match ParamValue::from_json(value) {
            ParamValue::Object(params) => Ok(params),
            _ => Err(FbError::InvalidParameter(
                "parameters must serialize to a key-value record".into(),
            )),
        }
    }

    /// Insert a value, replacing any existing value under the same key while
    /// keeping its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Remove and return the value under `key`, if present.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, ParamValue)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl IntoIterator for Params {
    type Item = (String, ParamValue);
    type IntoIter = std::vec::IntoIter<(String, ParamValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, ParamValue)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Split a parameter set into scalar/structured values and attachments.
///
/// Attachment-typed values are moved into the returned side collections and
/// removed from the set; everything else is kept as-is (no deep cloning, no
/// encoding). Attachment field validation happens later, at assembly time.
pub fn normalize(
    params: Params,
) -> (Params, Vec<(String, MediaBytes)>, Vec<(String, MediaStream)>) {
    let mut scalars = Params::new();
    let mut media_bytes = Vec::new();
    let mut media_streams = Vec::new();

    for (key, value) in params {
        match value {
            ParamValue::Attachment(a) => media_bytes.push((key, a)),
            ParamValue::Stream(s) => media_streams.push((key, s)),
            other => scalars.insert(key, other),
        }
    }

    (scalars, media_bytes, media_streams)
}
