//! Core request and response types.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Method`] | HTTP verbs the resource model can issue |
//! | [`RequestOptions`] | Raw options handed to the pipeline by a verb call |
//! | [`RequestPatch`] | Partial options returned by a request interceptor |
//! | [`PreparedRequest`] | Options after interceptors, header defaults and serialization |
//! | [`TransportRequest`] | What the transport actually sends |
//! | [`RawResponse`] | What the transport hands back |
//! | [`RestieResponse`] | The shaped result returned to callers |
//! | [`ResponsePatch`] | Fields contributed by a response interceptor |

use crate::error::{RestieError, Result};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::time::Instant;

/// Request headers.
///
/// A `None` value is an explicit null: for `Authorization` it removes the header
/// entirely during preparation, any other null header is skipped on the wire.
pub type Headers = BTreeMap<String, Option<String>>;

/// Query parameters, serialized in key order.
pub type Params = BTreeMap<String, Value>;

/// HTTP method issued by a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Methods that carry a serialized JSON body.
    pub fn sends_body(&self) -> bool {
        matches!(self, Method::Post | Method::Patch | Method::Put | Method::Delete)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Options describing one request before it enters the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    /// HTTP method
    pub method: Method,
    /// Target URL (any query string is replaced by `params`)
    pub url: String,
    /// Optional JSON payload
    pub data: Option<Value>,
    /// Query parameters
    pub params: Params,
    /// Header overrides
    pub headers: Headers,
}

impl RequestOptions {
    /// Create options with no body, parameters or headers.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            data: None,
            params: Params::new(),
            headers: Headers::new(),
        }
    }

    /// Shallow overlay of a patch onto these options.
    ///
    /// Every field present in the patch replaces the corresponding field
    /// wholesale; absent fields are left untouched. Headers and parameters are
    /// not merged key by key, so an interceptor that wants to add a header
    /// starts from the headers it was given.
    pub fn merge(&mut self, patch: RequestPatch) {
        if let Some(method) = patch.method {
            self.method = method;
        }
        if let Some(data) = patch.data {
            self.data = data;
        }
        if let Some(params) = patch.params {
            self.params = params;
        }
        if let Some(headers) = patch.headers {
            self.headers = headers;
        }
    }
}

/// Partial [`RequestOptions`] returned by a request interceptor.
///
/// # Examples
///
/// ```
/// use restie::{Method, RequestOptions, RequestPatch};
///
/// let mut options = RequestOptions::new(Method::Get, "http://api/users");
/// let mut headers = options.headers.clone();
/// headers.insert("X-Trace".into(), Some("1".into()));
///
/// options.merge(RequestPatch::new().headers(headers));
/// assert_eq!(options.headers["X-Trace"].as_deref(), Some("1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestPatch {
    /// Replacement method
    pub method: Option<Method>,
    /// Replacement payload (`Some(None)` clears it)
    pub data: Option<Option<Value>>,
    /// Replacement query parameters
    pub params: Option<Params>,
    /// Replacement headers
    pub headers: Option<Headers>,
}

impl RequestPatch {
    /// An empty patch; merging it changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Replace the payload.
    pub fn data(mut self, data: Option<Value>) -> Self {
        self.data = Some(data);
        self
    }

    /// Replace the query parameters.
    pub fn params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    /// Replace the headers.
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }
}

/// A request after phase one of the pipeline.
///
/// Interceptors have run, default headers are applied, the body is serialized
/// and the query string is appended to [`PreparedRequest::full_url`]. The cache
/// key is computed from this value.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// Options after interceptors and header processing
    pub options: RequestOptions,
    /// URL including the serialized query string
    pub full_url: String,
    /// Serialized JSON body, when the method carries one
    pub body: Option<String>,
}

impl PreparedRequest {
    /// Build what the transport sends. Null headers are dropped.
    pub fn transport_request(&self) -> TransportRequest {
        let headers = self
            .options
            .headers
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), v.clone())))
            .collect();

        TransportRequest {
            method: self.options.method,
            headers,
            body: self.body.clone(),
        }
    }
}

/// The request as seen by a [`Transport`](crate::client::Transport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// HTTP method
    pub method: Method,
    /// Header name/value pairs
    pub headers: BTreeMap<String, String>,
    /// Body, if any
    pub body: Option<String>,
}

impl TransportRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response returned by a transport.
///
/// Header names are stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase
    pub status_text: String,
    /// Response headers
    pub headers: BTreeMap<String, String>,
    /// Raw body
    pub body: Bytes,
}

impl RawResponse {
    /// An empty response with the canonical reason phrase for `status`.
    pub fn new(status: u16) -> Self {
        let status_text = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();

        Self {
            status,
            status_text,
            headers: BTreeMap::new(),
            body: Bytes::new(),
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// A JSON response with the given status.
    pub fn json_body(status: u16, value: &Value) -> Self {
        Self::new(status)
            .with_header("content-type", "application/json")
            .with_body(value.to_string())
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Declared `Content-Type`, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Decode the body as JSON.
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Decode the body as UTF-8 text.
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| RestieError::InvalidUtf8(e.to_string()))
    }
}

/// Provenance of a result served from the TTL cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheMeta {
    /// Key the result was stored under
    pub key: String,
    /// When the result was stored
    pub cached_at: Instant,
}

/// Fields contributed by a response interceptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponsePatch {
    /// Replacement data
    pub data: Option<Value>,
    /// Extra named fields, merged over existing ones
    pub fields: Map<String, Value>,
}

impl ResponsePatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the response data.
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach an extra field.
    pub fn field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }
}

/// The shaped result of a request.
///
/// Data is parsed on a best-effort basis: JSON for `application/json`, text for
/// everything else and `null` if decoding fails. When the client enforces
/// immutability the result is frozen once response interceptors ran and
/// [`RestieResponse::data_mut`] refuses access.
#[derive(Debug, Clone)]
pub struct RestieResponse {
    method: Method,
    headers: Headers,
    raw: Arc<RawResponse>,
    data: Value,
    data_key: Option<String>,
    fields: Map<String, Value>,
    frozen: bool,
    cache_meta: Option<CacheMeta>,
}

impl RestieResponse {
    pub(crate) fn new(
        method: Method,
        headers: Headers,
        raw: Arc<RawResponse>,
        data: Value,
        data_key: Option<String>,
    ) -> Self {
        Self {
            method,
            headers,
            raw,
            data,
            data_key,
            fields: Map::new(),
            frozen: false,
            cache_meta: None,
        }
    }

    /// HTTP status of the underlying response.
    pub fn status_code(&self) -> u16 {
        self.raw.status
    }

    /// Whether the status falls in `[200, 300)`.
    pub fn is_success(&self) -> bool {
        crate::client::is_success_status(self.raw.status)
    }

    /// Method of the request that produced this response.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Headers the request was sent with.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The untouched transport response.
    pub fn raw(&self) -> &RawResponse {
        &self.raw
    }

    /// Parsed response data.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Mutable access to the parsed data.
    ///
    /// Fails with [`RestieError::Immutable`] on frozen results.
    pub fn data_mut(&mut self) -> Result<&mut Value> {
        if self.frozen {
            return Err(RestieError::Immutable);
        }
        Ok(&mut self.data)
    }

    /// Consume the response, keeping its data.
    pub fn into_data(self) -> Value {
        self.data
    }

    /// Data unwrapped by the configured data key.
    ///
    /// Without a data key this is the whole data. With one, the value under
    /// that key, or `null` when the data has no such key.
    pub fn result(&self) -> Value {
        match &self.data_key {
            Some(key) => self.data.get(key).cloned().unwrap_or(Value::Null),
            None => self.data.clone(),
        }
    }

    /// [`RestieResponse::result`] deserialized into `T`.
    pub fn result_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.result())?)
    }

    /// Compatibility shim: `{"data": <data>}`.
    pub fn body(&self) -> Value {
        let mut shim = Map::new();
        shim.insert("data".to_string(), self.data.clone());
        Value::Object(shim)
    }

    /// Extra field contributed by a response interceptor.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// All interceptor-contributed fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Whether the result is frozen.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Set when the result was served from the TTL cache.
    pub fn cache_meta(&self) -> Option<&CacheMeta> {
        self.cache_meta.as_ref()
    }

    pub(crate) fn apply(&mut self, patch: ResponsePatch) {
        if let Some(data) = patch.data {
            self.data = data;
        }
        self.fields.extend(patch.fields);
    }

    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
    }

    pub(crate) fn tag(&mut self, meta: CacheMeta) {
        self.cache_meta = Some(meta);
    }
}
