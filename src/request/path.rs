//! Path and query resolution.
//!
//! Callers may address a call as a relative resource path (`me/feed`), a
//! relative path with inline query (`me?fields=id,name`), or a full absolute
//! URL on a recognized host. This resolver canonicalizes all three into a
//! relative path, merges inline query parameters into the call's parameter
//! set, and flags legacy-REST addressing. It runs before host selection
//! because query-derived parameters (a `method=` value in particular) can
//! themselves determine legacy-vs-graph dispatch.

use reqwest::Url;

use crate::encoding::url_decode;
use crate::error::FbError;
use crate::params::{ParamValue, Params};
use crate::request::hosts;

/// Outcome of path resolution.
#[derive(Debug)]
pub struct ResolvedPath {
    /// Canonical relative path, no leading slash, no query part.
    pub path: String,
    /// Whether the caller addressed the legacy REST surface by host.
    pub is_legacy_rest: bool,
    /// The caller-supplied absolute URL, when one was given on a recognized
    /// host. Host selection is skipped in that case.
    pub absolute_url: Option<Url>,
}

/// Resolve a caller-supplied path against `params`.
///
/// Inline query pairs are decoded and merged into `params`, but explicit
/// parameters always win over same-named query-string parameters. An
/// absolute URL on an unrecognized host is kept whole as an opaque id-style
/// path component, with no query splitting.
pub fn resolve_path(path: &str, params: &mut Params) -> Result<ResolvedPath, FbError> {
    if let Ok(url) = Url::parse(path) {
        if let Some(host) = url.host_str() {
            let host = host.to_ascii_lowercase();
            if hosts::is_graph_host(&host) || hosts::is_rest_host(&host) {
                let mut relative = url.path().to_string();
                if let Some(query) = url.query() {
                    relative.push('?');
                    relative.push_str(query);
                }
                let path = split_and_merge(&relative, params)?;
                return Ok(ResolvedPath {
                    path,
                    is_legacy_rest: hosts::is_rest_host(&host),
                    absolute_url: Some(url),
                });
            }
            if hosts::is_site_host(&host) {
                // Site hosts (www/apps) classify the URL but are never a
                // request target: strip to a relative path and let normal
                // host selection pick the API endpoint.
                let mut relative = url.path().to_string();
                if let Some(query) = url.query() {
                    relative.push('?');
                    relative.push_str(query);
                }
                let path = split_and_merge(&relative, params)?;
                return Ok(ResolvedPath {
                    path,
                    is_legacy_rest: false,
                    absolute_url: None,
                });
            }
            // Unrecognized host: the caller is addressing an external URL as
            // if it were a graph object id. Keep the whole string opaque.
            return Ok(ResolvedPath {
                path: path.to_string(),
                is_legacy_rest: false,
                absolute_url: None,
            });
        }
    }

    let path = split_and_merge(path, params)?;
    Ok(ResolvedPath {
        path,
        is_legacy_rest: false,
        absolute_url: None,
    })
}

/// Strip a single leading `/`, split off the query part, and merge its pairs
/// into `params`.
fn split_and_merge(path: &str, params: &mut Params) -> Result<String, FbError> {
    let path = path.strip_prefix('/').unwrap_or(path);

    if path.matches('?').count() > 1 {
        return Err(FbError::InvalidPath(format!(
            "path contains more than one '?': {path}"
        )));
    }

    let (path, query) = match path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path, None),
    };

    if let Some(query) = query {
        merge_query(query, params)?;
    }

    Ok(path.to_string())
}

fn merge_query(query: &str, params: &mut Params) -> Result<(), FbError> {
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            FbError::InvalidPath(format!("malformed query pair '{pair}' in path"))
        })?;
        if key.is_empty() {
            return Err(FbError::InvalidPath(format!(
                "malformed query pair '{pair}' in path"
            )));
        }
        let key = url_decode(key)?;
        let value = url_decode(value)?;
        if !params.contains_key(&key) {
            params.insert(key, ParamValue::String(value));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_with_inline_query() {
        let mut params = Params::new();
        let resolved = resolve_path("me?fields=id,name", &mut params).unwrap();
        assert_eq!(resolved.path, "me");
        assert!(!resolved.is_legacy_rest);
        assert!(resolved.absolute_url.is_none());
        assert!(matches!(params.get("fields"), Some(ParamValue::String(s)) if s == "id,name"));
    }

    #[test]
    fn explicit_parameters_win_over_query_pairs() {
        let mut params = Params::new();
        params.insert("fields", "id");
        resolve_path("me?fields=id,name", &mut params).unwrap();
        assert!(matches!(params.get("fields"), Some(ParamValue::String(s)) if s == "id"));
    }

    #[test]
    fn resolution_is_idempotent_on_stripped_paths() {
        let mut params = Params::new();
        let first = resolve_path("me/feed", &mut params).unwrap();
        let second = resolve_path(&first.path, &mut params).unwrap();
        assert_eq!(first.path, second.path);
        assert!(params.is_empty());
    }

    #[test]
    fn leading_slash_is_stripped() {
        let mut params = Params::new();
        let resolved = resolve_path("/me/feed", &mut params).unwrap();
        assert_eq!(resolved.path, "me/feed");
    }

    #[test]
    fn double_question_mark_is_rejected() {
        let mut params = Params::new();
        let err = resolve_path("me?fields=id?name=x", &mut params).unwrap_err();
        assert!(matches!(err, FbError::InvalidPath(_)));
    }

    #[test]
    fn malformed_query_pair_is_rejected() {
        let mut params = Params::new();
        assert!(resolve_path("me?fields", &mut params).is_err());
        assert!(resolve_path("me?=value", &mut params).is_err());
    }

    #[test]
    fn graph_absolute_url_is_stripped() {
        let mut params = Params::new();
        let resolved =
            resolve_path("https://graph.facebook.com/me/feed?limit=5", &mut params).unwrap();
        assert_eq!(resolved.path, "me/feed");
        assert!(!resolved.is_legacy_rest);
        assert!(resolved.absolute_url.is_some());
        assert!(matches!(params.get("limit"), Some(ParamValue::String(s)) if s == "5"));
    }

    #[test]
    fn rest_absolute_url_flags_legacy() {
        let mut params = Params::new();
        let resolved =
            resolve_path("https://api.facebook.com/restserver.php", &mut params).unwrap();
        assert_eq!(resolved.path, "restserver.php");
        assert!(resolved.is_legacy_rest);
    }

    #[test]
    fn site_host_url_is_stripped_but_not_pinned() {
        let mut params = Params::new();
        let resolved =
            resolve_path("https://www.facebook.com/me?fields=id", &mut params).unwrap();
        assert_eq!(resolved.path, "me");
        assert!(!resolved.is_legacy_rest);
        assert!(resolved.absolute_url.is_none());
        assert!(matches!(params.get("fields"), Some(ParamValue::String(s)) if s == "id"));
    }

    #[test]
    fn unrecognized_host_stays_opaque() {
        let mut params = Params::new();
        let resolved = resolve_path("https://example.com/thing?x=1", &mut params).unwrap();
        assert_eq!(resolved.path, "https://example.com/thing?x=1");
        assert!(resolved.absolute_url.is_none());
        assert!(params.is_empty());
    }
}
