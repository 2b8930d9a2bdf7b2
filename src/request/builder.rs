//! Request building orchestration.
//!
//! Combines normalization, path resolution, value encoding and multipart
//! assembly into one transport-ready request descriptor. Decisions follow a
//! fixed order: defaults injection, etag extraction, path/query resolution,
//! legacy dispatch, host choice, stringification, then body encoding.

use reqwest::header::{HeaderMap, HeaderValue, IF_NONE_MATCH};
use reqwest::{Method, Url};
use tracing::debug;

use crate::encoding::{encode_value, to_query_string, JsonSerializer};
use crate::error::FbError;
use crate::params::{normalize, ParamValue, Params};
use crate::request::hosts;
use crate::request::multipart::MultipartBody;
use crate::request::path::resolve_path;

/// Reserved pseudo-parameter carrying a cached-response validation token.
pub const ETAG_KEY: &str = "_etag_";

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Immutable client state the builder reads during one call.
pub struct BuildContext<'a> {
    /// Default access token injected when the caller supplies none.
    pub access_token: Option<&'a str>,
    /// Route to the `.beta.` host variants.
    pub use_beta: bool,
    /// Inject `return_ssl_resources=true` unless overridden.
    pub is_secure: bool,
    /// Serializer used to stringify structured parameter values.
    pub serializer: &'a dyn JsonSerializer,
}

/// Body source of an assembled request.
#[derive(Debug)]
pub enum RequestBody {
    Empty,
    /// In-memory `application/x-www-form-urlencoded` payload.
    Form(String),
    /// Composite multipart stream.
    Multipart(MultipartBody),
}

/// A transport-ready request.
#[derive(Debug)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
    pub content_type: Option<String>,
    /// Known body length; `None` for composite streams whose length would be
    /// expensive to precompute.
    pub content_length: Option<u64>,
}

/// Build a request descriptor for one API call.
///
/// Returns the descriptor plus whether the call carried the caching
/// pseudo-key and expects a headers-wrapped response.
pub fn build_request(
    ctx: &BuildContext<'_>,
    http_method: &str,
    path: &str,
    parameters: Params,
) -> Result<(RequestDescriptor, bool), FbError> {
    // 1. Validate caller input
    if http_method.is_empty() {
        return Err(FbError::InvalidParameter("httpMethod is required".into()));
    }
    if path.is_empty() {
        return Err(FbError::InvalidParameter("path is required".into()));
    }
    let method = Method::from_bytes(http_method.to_ascii_uppercase().as_bytes())
        .map_err(|_| FbError::InvalidParameter(format!("invalid HTTP method '{http_method}'")))?;

    // 2. Normalize and inject client defaults
    let (mut params, byte_attachments, stream_attachments) = normalize(parameters);
    if let Some(token) = ctx.access_token {
        if !token.is_empty() && !params.contains_key("access_token") {
            params.insert("access_token", token);
        }
    }
    if ctx.is_secure && !params.contains_key("return_ssl_resources") {
        params.insert("return_ssl_resources", true);
    }

    // 3. Extract the caching pseudo-parameter
    let etag = match params.remove(ETAG_KEY) {
        Some(value) => Some(encode_value(&value)?),
        None => None,
    };
    let contains_etag = etag.is_some();

    // 4. Resolve path and inline query; force the decodable format
    let resolved = resolve_path(path, &mut params)?;
    if params.contains_key("format") {
        params.insert("format", "json-strings");
    }

    // 5. Legacy-REST dispatch rules
    let rpc_method = match params.get("method") {
        Some(value) => {
            let name = encode_value(value)?;
            if name.eq_ignore_ascii_case("delete") {
                return Err(FbError::InvalidParameter(
                    "parameters cannot contain 'method=delete'; use the DELETE verb instead"
                        .into(),
                ));
            }
            Some(name)
        }
        None => {
            if resolved.is_legacy_rest {
                return Err(FbError::UnsupportedOperation(
                    "legacy REST calls must name their RPC method".into(),
                ));
            }
            None
        }
    };
    let is_legacy_rest = rpc_method.is_some();

    // 6. Host selection, skipped when the caller addressed a host directly
    let (mut url, request_path) = match &resolved.absolute_url {
        Some(absolute) => {
            let mut base = absolute.clone();
            base.set_path("");
            base.set_query(None);
            (base, resolved.path.clone())
        }
        None => {
            let (host, request_path) = if let Some(name) = rpc_method.as_deref() {
                (hosts::rest_host_for(name, ctx.use_beta), "restserver.php".to_string())
            } else {
                (
                    hosts::graph_host_for(method == Method::POST, &resolved.path, ctx.use_beta),
                    resolved.path.clone(),
                )
            };
            let base = Url::parse(&format!("https://{host}"))
                .map_err(|e| FbError::InvalidPath(e.to_string()))?;
            (base, request_path)
        }
    };
    url.set_path(&request_path);
    debug!(
        host = url.host_str().unwrap_or_default(),
        path = %request_path,
        legacy = is_legacy_rest,
        "selected request target"
    );

    // 7. Stringify structured values as embedded JSON text
    let mut stringified = Params::new();
    for (key, value) in params {
        let text = match value {
            ParamValue::String(s) => s,
            ParamValue::Object(_) | ParamValue::List(_) => {
                ctx.serializer.serialize(&value.to_json()?)?
            }
            other => encode_value(&other)?,
        };
        stringified.insert(key, ParamValue::String(text));
    }
    let mut params = stringified;

    // 8. The access token always rides on the query line. An explicitly
    // empty token counts as absent and is dropped.
    let mut query = Params::new();
    match params.remove("access_token") {
        Some(ParamValue::String(token)) if !token.is_empty() => {
            query.insert("access_token", token);
        }
        _ => {}
    }

    // 9-11. Pick the body encoding
    let has_attachments = !byte_attachments.is_empty() || !stream_attachments.is_empty();
    let (body, content_type) = if method != Method::POST {
        if has_attachments {
            return Err(FbError::UnsupportedOperation(
                "attachments are only valid on POST requests".into(),
            ));
        }
        for (key, value) in params {
            query.insert(key, value);
        }
        (RequestBody::Empty, None)
    } else if !has_attachments {
        if params.is_empty() {
            (RequestBody::Empty, None)
        } else {
            (
                RequestBody::Form(to_query_string(&params)?),
                Some(FORM_URLENCODED.to_string()),
            )
        }
    } else {
        let body = MultipartBody::assemble(
            &params,
            byte_attachments,
            stream_attachments,
            MultipartBody::generate_boundary(),
        )?;
        let content_type = body.content_type();
        debug!(boundary = body.boundary(), "assembled multipart body");
        (RequestBody::Multipart(body), Some(content_type))
    };

    if !query.is_empty() {
        url.set_query(Some(&to_query_string(&query)?));
    }

    // 12. Conditional-match header
    let mut headers = HeaderMap::new();
    if let Some(etag) = &etag {
        let value = format!("\"{etag}\"");
        headers.insert(
            IF_NONE_MATCH,
            HeaderValue::from_str(&value)
                .map_err(|_| FbError::InvalidParameter("etag is not a valid header value".into()))?,
        );
    }

    // 13. Known body length
    let content_length = match &body {
        RequestBody::Empty => None,
        RequestBody::Form(form) => Some(form.len() as u64),
        RequestBody::Multipart(multipart) => multipart.len_hint(),
    };

    Ok((
        RequestDescriptor {
            method,
            url,
            headers,
            body,
            content_type,
            content_length,
        },
        contains_etag,
    ))
}
