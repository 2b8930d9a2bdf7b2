//! Facebook API client.
//!
//! Thin transport wiring around the request-assembly engine: immutable
//! per-client configuration, a shared `reqwest::Client`, and the single
//! call-style `api` operation plus verb conveniences. The client holds no
//! per-call state, so one instance is safe to share across concurrent calls.

use std::sync::Arc;

use reqwest::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::encoding::{JsonSerializer, SerdeSerializer};
use crate::error::FbError;
use crate::params::Params;
use crate::request::builder::{build_request, BuildContext, RequestBody};
use crate::response::{interpret, ResponseEnvelope};

/// Client for the Facebook Graph and legacy REST APIs.
#[derive(Clone)]
pub struct FacebookClient {
    access_token: Option<String>,
    use_beta: bool,
    is_secure: bool,
    serializer: Arc<dyn JsonSerializer>,
    http: reqwest::Client,
}

impl std::fmt::Debug for FacebookClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacebookClient")
            .field("access_token", &self.access_token.as_deref().map(|_| "***"))
            .field("use_beta", &self.use_beta)
            .field("is_secure", &self.is_secure)
            .finish()
    }
}

impl FacebookClient {
    /// Create a client with an access token and default configuration.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::builder().access_token(access_token).build()
    }

    /// Returns a builder for constructing a client.
    pub fn builder() -> FacebookClientBuilder {
        FacebookClientBuilder::new()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Perform one API call and decode the response into `T`.
    ///
    /// `path` accepts a relative resource path (`"me/feed"`), a relative
    /// path with inline query (`"me?fields=id,name"`), or a full absolute
    /// URL on a recognized host.
    pub async fn api<T: DeserializeOwned>(
        &self,
        http_method: &str,
        path: &str,
        parameters: Params,
    ) -> Result<T, FbError> {
        let ctx = BuildContext {
            access_token: self.access_token.as_deref(),
            use_beta: self.use_beta,
            is_secure: self.is_secure,
            serializer: self.serializer.as_ref(),
        };
        let (descriptor, contains_etag) = build_request(&ctx, http_method, path, parameters)?;
        debug!(method = %descriptor.method, url = %descriptor.url, "sending request");

        let mut rb = self
            .http
            .request(descriptor.method, descriptor.url)
            .headers(descriptor.headers);
        if let Some(content_type) = &descriptor.content_type {
            rb = rb.header(
                CONTENT_TYPE,
                HeaderValue::from_str(content_type)
                    .map_err(|e| FbError::HttpError(e.to_string()))?,
            );
        }
        match descriptor.body {
            RequestBody::Empty => {}
            RequestBody::Form(form) => {
                rb = rb.body(form);
            }
            RequestBody::Multipart(multipart) => {
                if let Some(length) = descriptor.content_length {
                    rb = rb.header(CONTENT_LENGTH, length);
                }
                rb = rb.body(reqwest::Body::wrap_stream(multipart.into_stream()));
            }
        }

        let resp = rb.send().await.map_err(FbError::from)?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let headers = resp.headers().clone();
        let url = resp.url().clone();
        let body = resp.text().await.map_err(FbError::from)?;
        debug!(status, content_type = %content_type, "received response");

        let envelope = ResponseEnvelope {
            status,
            content_type,
            headers,
            url,
            body,
        };
        let decoded = interpret(self.serializer.as_ref(), &envelope, contains_etag)?;
        serde_json::from_value(decoded.into_value()).map_err(Into::into)
    }

    /// GET convenience wrapper.
    pub async fn get(&self, path: &str, parameters: Params) -> Result<Value, FbError> {
        self.api("GET", path, parameters).await
    }

    /// POST convenience wrapper.
    pub async fn post(&self, path: &str, parameters: Params) -> Result<Value, FbError> {
        self.api("POST", path, parameters).await
    }

    /// DELETE convenience wrapper.
    pub async fn delete(&self, path: &str, parameters: Params) -> Result<Value, FbError> {
        self.api("DELETE", path, parameters).await
    }
}

/// Builder for `FacebookClient`.
#[derive(Clone, Default)]
pub struct FacebookClientBuilder {
    access_token: Option<String>,
    use_beta: bool,
    is_secure: bool,
    serializer: Option<Arc<dyn JsonSerializer>>,
    http: Option<reqwest::Client>,
}

impl FacebookClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default access token injected into calls that do not supply one.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Route calls to the `.beta.` host variants.
    pub fn beta(mut self, use_beta: bool) -> Self {
        self.use_beta = use_beta;
        self
    }

    /// Request SSL resource URLs in responses.
    pub fn secure(mut self, is_secure: bool) -> Self {
        self.is_secure = is_secure;
        self
    }

    /// Substitute the JSON serializer/deserializer pair.
    pub fn serializer(mut self, serializer: Arc<dyn JsonSerializer>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    /// Supply a preconfigured transport client (proxies, timeouts, pools are
    /// transport concerns and belong here).
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> FacebookClient {
        FacebookClient {
            access_token: self.access_token,
            use_beta: self.use_beta,
            is_secure: self.is_secure,
            serializer: self
                .serializer
                .unwrap_or_else(|| Arc::new(SerdeSerializer)),
            http: self.http.unwrap_or_default(),
        }
    }
}
