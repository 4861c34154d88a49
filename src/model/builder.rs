//! Request builders returned by resource verbs.

use crate::client::Restie;
use crate::error::{RestieError, Result};
use crate::protocol::{concat_paths, PathSegment};
use crate::types::{Headers, Method, Params, RequestOptions, RestieResponse};
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use std::future::IntoFuture;

/// A request under construction.
///
/// Await it directly or call [`RequestBuilder::send`]. Serialization errors from
/// [`RequestBuilder::json`] or [`RequestBuilder::param`] are reported when the
/// request is sent.
///
/// # Examples
///
/// ```no_run
/// use restie::Restie;
/// use serde_json::json;
///
/// # async fn run() -> restie::Result<()> {
/// let api = Restie::new("http://example.com/api");
/// let page = api
///     .collection("users")
///     .get_all()
///     .param("page", 2)
///     .header("X-Trace", "1")
///     .await?;
/// let patched = api.collection("users").patch().path(7).json(&json!({"a": 1})).await?;
/// # Ok(())
/// # }
/// ```
#[must_use = "requests do nothing unless awaited or sent"]
pub struct RequestBuilder {
    client: Restie,
    method: Method,
    url: String,
    path: Option<PathSegment>,
    data: Option<Value>,
    params: Params,
    headers: Headers,
    error: Option<RestieError>,
}

impl RequestBuilder {
    pub(crate) fn new(client: Restie, method: Method, url: &str, data: Option<Value>) -> Self {
        Self {
            client,
            method,
            url: url.to_string(),
            path: None,
            data,
            params: Params::new(),
            headers: Headers::new(),
            error: None,
        }
    }

    /// Extend the node URL by a sub-path. An empty path is ignored.
    pub fn path(mut self, path: impl Into<PathSegment>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the payload. `Value::Null` sends no body.
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Serialize `body` as the payload.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.data = Some(value),
            Err(e) => self.fail(e.into()),
        }
        self
    }

    /// Add a query parameter.
    pub fn param<V: Serialize>(mut self, key: impl Into<String>, value: V) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.params.insert(key.into(), value);
            }
            Err(e) => self.fail(e.into()),
        }
        self
    }

    /// Add several query parameters.
    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Serialize,
    {
        for (key, value) in params {
            self = self.param(key, value);
        }
        self
    }

    /// Set a header, overriding the default of the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), Some(value.into()));
        self
    }

    /// Set a header to null.
    ///
    /// A null `Authorization` removes the header from the request; any other
    /// null header is not sent.
    pub fn null_header(mut self, name: impl Into<String>) -> Self {
        self.headers.insert(name.into(), None);
        self
    }

    /// Merge a header map.
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    pub(crate) fn params_value(mut self, params: Value) -> Self {
        match params {
            Value::Null => {}
            Value::Object(map) => self.params.extend(map),
            other => self.fail(RestieError::Config(format!(
                "query parameters must be an object, got {other}"
            ))),
        }
        self
    }

    pub(crate) fn headers_value(mut self, headers: Value) -> Self {
        match headers {
            Value::Null => {}
            Value::Object(map) => {
                for (name, value) in map {
                    let value = match value {
                        Value::Null => None,
                        Value::String(s) => Some(s),
                        other => Some(other.to_string()),
                    };
                    self.headers.insert(name, value);
                }
            }
            other => self.fail(RestieError::Config(format!(
                "headers must be an object, got {other}"
            ))),
        }
        self
    }

    fn fail(&mut self, err: RestieError) {
        self.error.get_or_insert(err);
    }

    /// The options this builder hands to the pipeline.
    pub fn build(self) -> Result<RequestOptions> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let url = match self.path.filter(|path| !path.is_empty()) {
            Some(path) => concat_paths(&[self.url.as_str(), path.as_str()]),
            None => self.url,
        };

        Ok(RequestOptions {
            method: self.method,
            url,
            data: self.data,
            params: self.params,
            headers: self.headers,
        })
    }

    /// Send the request.
    pub async fn send(self) -> Result<RestieResponse> {
        let client = self.client.clone();
        let options = self.build()?;
        client.request(options).await
    }
}

impl IntoFuture for RequestBuilder {
    type Output = Result<RestieResponse>;
    type IntoFuture = BoxFuture<'static, Result<RestieResponse>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.send())
    }
}
