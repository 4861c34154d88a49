//! Transport capability.
//!
//! The pipeline never talks to the network directly: it hands a
//! [`TransportRequest`] to a [`Transport`] and gets a [`RawResponse`] back.
//! Plugins decorate transports, tests substitute them.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ReqwestTransport`] | Default transport backed by `reqwest` |
//! | [`TransportFn`] | Adapts an async closure |

use crate::error::{RestieError, Result};
use crate::types::{RawResponse, TransportRequest};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

/// Sends a request and returns the raw response.
///
/// Implementations resolve for every HTTP status and fail only when no response
/// could be obtained.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` to `url`.
    async fn send(&self, url: &str, request: TransportRequest) -> Result<RawResponse>;
}

/// Default transport backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// A transport whose requests time out after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::with_timeout(Duration::from_millis(30000))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, url: &str, request: TransportRequest) -> Result<RawResponse> {
        let mut req_builder = self.client.request(request.method.into(), url);

        for (k, v) in &request.headers {
            req_builder = req_builder.header(k.as_str(), v.as_str());
        }

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| RestieError::Transport(e.to_string()))?;

        let status = response.status();

        // Convert headers
        let mut headers = BTreeMap::new();
        for (k, v) in response.headers() {
            if let Ok(val) = v.to_str() {
                headers.insert(k.as_str().to_ascii_lowercase(), val.to_string());
            }
        }

        // Read body
        let body = response
            .bytes()
            .await
            .map_err(|e| RestieError::Transport(e.to_string()))?;

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

/// A [`Transport`] backed by an async closure.
///
/// # Examples
///
/// ```
/// use restie::client::{transport_fn, Transport};
/// use restie::{Method, RawResponse, TransportRequest};
/// use std::collections::BTreeMap;
///
/// # tokio_test::block_on(async {
/// let transport = transport_fn(|_url, _request| async { Ok(RawResponse::new(204)) });
/// let request = TransportRequest { method: Method::Get, headers: BTreeMap::new(), body: None };
/// let raw = transport.send("http://api/a", request).await.unwrap();
/// assert_eq!(raw.status, 204);
/// # });
/// ```
pub struct TransportFn<F> {
    f: F,
}

/// Build a [`TransportFn`] from a closure.
pub fn transport_fn<F, Fut>(f: F) -> TransportFn<F>
where
    F: Fn(String, TransportRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<RawResponse>> + Send + 'static,
{
    TransportFn { f }
}

#[async_trait]
impl<F, Fut> Transport for TransportFn<F>
where
    F: Fn(String, TransportRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<RawResponse>> + Send + 'static,
{
    async fn send(&self, url: &str, request: TransportRequest) -> Result<RawResponse> {
        (self.f)(url.to_string(), request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn request() -> TransportRequest {
        TransportRequest {
            method: Method::Post,
            headers: BTreeMap::from([("X".to_string(), "1".to_string())]),
            body: Some("{}".into()),
        }
    }

    #[tokio::test]
    async fn test_transport_fn_receives_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let transport = transport_fn(move |url, req| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                assert_eq!(url, "http://api/a");
                assert_eq!(req.header("x"), Some("1"));
                Ok(RawResponse::new(201))
            }
        });

        let raw = transport.send("http://api/a", request()).await.unwrap();
        assert_eq!(raw.status, 201);
        assert_eq!(raw.status_text, "Created");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reqwest_transport_connection_failure() {
        let transport = ReqwestTransport::with_timeout(Duration::from_millis(500));
        let err = transport
            .send("http://127.0.0.1:1/unreachable", request())
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
