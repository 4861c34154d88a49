//! The Restie client instance and its request pipeline.
//!
//! A request goes through two phases:
//!
//! 1. **prepare**: request interceptors, default headers, body serialization
//!    and query string. Cheap and always executed, it yields the
//!    [`PreparedRequest`] the cache key is computed from.
//! 2. **commit**: the (plugin-decorated) transport call, best-effort body
//!    decoding, response shaping and response/error interceptors.
//!
//! When caching is enabled, commit runs at most once per cache key while a
//! request is in flight.
//!
//! # Examples
//!
//! ## Building resources
//!
//! ```
//! use restie::Restie;
//!
//! let api = Restie::new("http://example.com/api");
//! let humans = api.item("planets", 3).collection("humans");
//! assert_eq!(humans.url(), "http://example.com/api/planets/3/humans");
//! ```
//!
//! ## Sending requests
//!
//! ```no_run
//! use restie::Restie;
//! use serde_json::json;
//!
//! # async fn run() -> restie::Result<()> {
//! let api = Restie::new("http://example.com/api");
//! let created = api.collection("users").post().json(&json!({"name": "ada"})).await?;
//! println!("Status: {}", created.status_code());
//! # Ok(())
//! # }
//! ```

use crate::client::cache::ResponseCache;
use crate::client::config::{ClientConfig, Configuration};
use crate::client::interceptors::{InterceptorId, Interceptors};
use crate::client::transport::{ReqwestTransport, Transport};
use crate::client::utils::{is_success_status, parse_body};
use crate::error::{RestieError, Result};
use crate::model::Resource;
use crate::plugin::{compose_transport, Plugin, RateLimiter};
use crate::protocol::{apply_default_headers, with_query, PathSegment};
use crate::types::{
    PreparedRequest, RequestOptions, RequestPatch, ResponsePatch, RestieResponse,
};
use futures::FutureExt;
use http::Extensions;
use parking_lot::{RwLock, RwLockReadGuard};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// The client instance.
///
/// Cloning is cheap: clones share configuration, interceptors, plugins and the
/// response cache.
#[derive(Clone)]
pub struct Restie {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    base_url: String,
    configuration: RwLock<Configuration>,
    interceptors: Interceptors,
    base_transport: Arc<dyn Transport>,
    transport: RwLock<Arc<dyn Transport>>,
    cache: Option<Arc<ResponseCache>>,
    extensions: RwLock<Extensions>,
    enable_logging: bool,
}

impl Restie {
    /// Create a client with default configuration and the reqwest transport.
    pub fn new(base_url: impl Into<String>) -> Self {
        let config = ClientConfig::default();
        let transport = Arc::new(ReqwestTransport::with_timeout(Duration::from_millis(
            config.request_timeout_ms,
        )));
        Self::assemble(base_url.into(), &config, transport)
    }

    /// Create a client with custom configuration and the reqwest transport.
    ///
    /// Fails with [`RestieError::Config`] on invalid options.
    pub fn with_config(base_url: impl Into<String>, config: ClientConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::with_timeout(Duration::from_millis(
            config.request_timeout_ms,
        )));
        Self::with_transport(base_url, config, transport)
    }

    /// Create a client that sends through `transport`.
    pub fn with_transport(
        base_url: impl Into<String>,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        config.validate()?;

        let mut plugins = config.plugins.clone();
        if let Some(tuning) = &config.rate_limit {
            plugins.push(Arc::new(RateLimiter::new(tuning.clone())?));
        }

        let client = Self::assemble(base_url.into(), &config, transport);
        client.install(plugins)?;
        Ok(client)
    }

    fn assemble(base_url: String, config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let configuration = Configuration::from_config(config);
        let cache = configuration
            .enabled_cache()
            .then(|| Arc::new(ResponseCache::new(configuration.cache_ttl())));

        Restie {
            inner: Arc::new(ClientInner {
                base_url,
                configuration: RwLock::new(configuration),
                interceptors: Interceptors::new(),
                base_transport: transport.clone(),
                transport: RwLock::new(transport),
                cache,
                extensions: RwLock::new(Extensions::new()),
                enable_logging: config.enable_logging,
            }),
        }
    }

    /// The base URL this client was created with.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Alias of [`Restie::base_url`].
    pub fn url(&self) -> &str {
        &self.inner.base_url
    }

    /// Root collection node `base_url/name`.
    pub fn collection(&self, name: impl Into<PathSegment>) -> Resource {
        Resource::root(self.clone(), name.into())
    }

    /// Alias of [`Restie::collection`].
    pub fn custom(&self, name: impl Into<PathSegment>) -> Resource {
        self.collection(name)
    }

    /// Root item node `base_url/name/id`; its parent is the `name` collection.
    pub fn item(&self, name: impl Into<PathSegment>, id: impl Into<PathSegment>) -> Resource {
        self.item_opt(name, Some(id))
    }

    /// Like [`Restie::item`], degrading to [`Restie::collection`] when `id` is
    /// absent or empty.
    pub fn item_opt<I: Into<PathSegment>>(
        &self,
        name: impl Into<PathSegment>,
        id: Option<I>,
    ) -> Resource {
        self.collection(name).item_child(id.map(Into::into))
    }

    /// Read access to the runtime configuration.
    pub fn configuration(&self) -> RwLockReadGuard<'_, Configuration> {
        self.inner.configuration.read()
    }

    /// A configuration extension stored by a plugin.
    pub fn config_extension<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
        self.inner.configuration.read().extension::<T>()
    }

    /// An instance extension stored by a plugin.
    pub fn instance_extension<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
        self.inner.extensions.read().get::<T>().cloned()
    }

    /// Whether immutability is enforced.
    pub fn is_immutable(&self) -> bool {
        self.inner.configuration.read().enforce_immutability()
    }

    /// Register a request interceptor.
    pub fn add_request_interceptor<F>(&self, hook: F) -> InterceptorId
    where
        F: Fn(&RequestOptions) -> RequestPatch + Send + Sync + 'static,
    {
        self.inner.interceptors.request.add(Arc::new(hook))
    }

    /// Remove a request interceptor. Returns false if it was not registered.
    pub fn remove_request_interceptor(&self, id: InterceptorId) -> bool {
        self.inner.interceptors.request.remove(id)
    }

    /// Register a response interceptor, run on successful responses only.
    pub fn add_response_interceptor<F>(&self, hook: F) -> InterceptorId
    where
        F: Fn(&RestieResponse, &RequestOptions) -> ResponsePatch + Send + Sync + 'static,
    {
        self.inner.interceptors.response.add(Arc::new(hook))
    }

    /// Remove a response interceptor.
    pub fn remove_response_interceptor(&self, id: InterceptorId) -> bool {
        self.inner.interceptors.response.remove(id)
    }

    /// Register an error interceptor. It observes failures but cannot
    /// suppress them.
    pub fn add_error_interceptor<F>(&self, hook: F) -> InterceptorId
    where
        F: Fn(&RestieError, &str, &RequestOptions) + Send + Sync + 'static,
    {
        self.inner.interceptors.error.add(Arc::new(hook))
    }

    /// Remove an error interceptor.
    pub fn remove_error_interceptor(&self, id: InterceptorId) -> bool {
        self.inner.interceptors.error.remove(id)
    }

    /// Install plugins after construction.
    ///
    /// Rejected with [`RestieError::Config`] when immutability is enforced.
    pub fn install_plugins(&self, plugins: Vec<Arc<dyn Plugin>>) -> Result<()> {
        if self.is_immutable() {
            return Err(RestieError::Config(
                "plugins cannot be installed on an immutable client".into(),
            ));
        }
        self.install(plugins)
    }

    fn install(&self, plugins: Vec<Arc<dyn Plugin>>) -> Result<()> {
        if plugins.is_empty() {
            return Ok(());
        }

        let enabled = {
            let mut configuration = self.inner.configuration.write();
            configuration.record_plugins(&plugins);
            let enabled = configuration.plugins_enabled();
            if enabled {
                for plugin in &plugins {
                    plugin.extend_configuration(&mut configuration);
                }
            }
            enabled
        };

        if !enabled {
            tracing::debug!(count = plugins.len(), "Plugins recorded but disabled");
            return Ok(());
        }

        {
            let mut extensions = self.inner.extensions.write();
            for plugin in &plugins {
                plugin.extend_instance(&mut extensions);
            }
        }

        let installed = self.inner.configuration.read().plugins().to_vec();
        let composed = compose_transport(&installed, self.inner.base_transport.clone(), self);
        *self.inner.transport.write() = composed;

        tracing::debug!(
            installed = installed.len(),
            "Installed plugins: {:?}",
            plugins.iter().map(|p| p.name()).collect::<Vec<_>>()
        );
        Ok(())
    }

    /// Phase one of the pipeline.
    pub fn prepare(&self, options: RequestOptions) -> PreparedRequest {
        let mut options = options;
        self.inner.interceptors.apply_request(&mut options);

        options.headers = apply_default_headers(&options.headers);

        let body = match &options.data {
            Some(data) if !data.is_null() && options.method.sends_body() => Some(data.to_string()),
            _ => None,
        };

        let full_url = with_query(&options.url, &options.params);

        PreparedRequest {
            options,
            full_url,
            body,
        }
    }

    /// Cache key of a prepared request.
    pub fn cache_key(&self, prepared: &PreparedRequest) -> String {
        self.inner.configuration.read().cache_key(prepared)
    }

    /// Run `options` through the whole pipeline.
    ///
    /// This is what every verb on a [`Resource`] ends up calling.
    pub async fn request(&self, options: RequestOptions) -> Result<RestieResponse> {
        let prepared = self.prepare(options);

        match &self.inner.cache {
            Some(cache) => {
                let key = self.cache_key(&prepared);
                let inner = Arc::clone(&self.inner);
                cache
                    .get_or_commit(key, move || commit(inner, prepared).boxed())
                    .await
            }
            None => commit(Arc::clone(&self.inner), prepared).await,
        }
    }

    #[cfg(test)]
    fn cache(&self) -> Option<&Arc<ResponseCache>> {
        self.inner.cache.as_ref()
    }
}

/// Phase two of the pipeline.
async fn commit(inner: Arc<ClientInner>, prepared: PreparedRequest) -> Result<RestieResponse> {
    let transport = inner.transport.read().clone();
    let request = prepared.transport_request();
    let PreparedRequest { options, full_url, .. } = prepared;

    tracing::debug!(method = %options.method, url = %full_url, "Dispatching request");

    let raw = match transport.send(&full_url, request).await {
        Ok(raw) => Arc::new(raw),
        Err(e) => {
            if inner.enable_logging {
                tracing::warn!(method = %options.method, url = %full_url, "Request failed: {}", e);
            }
            inner.interceptors.notify_error(&e, &full_url, &options);
            return Err(e);
        }
    };

    let data: Value = parse_body(&raw);
    let (immutable, data_key) = {
        let configuration = inner.configuration.read();
        (
            configuration.enforce_immutability(),
            configuration.data_key().map(str::to_string),
        )
    };

    let mut response = RestieResponse::new(
        options.method,
        options.headers.clone(),
        raw.clone(),
        data,
        data_key,
    );

    if is_success_status(raw.status) {
        inner.interceptors.apply_response(&mut response, &options);
        if immutable {
            response.freeze();
        }
        return Ok(response);
    }

    let message = if raw.status_text.is_empty() {
        format!("HTTP {}", raw.status)
    } else {
        raw.status_text.clone()
    };
    let err = RestieError::Status {
        status: raw.status,
        message,
        response: Box::new(response),
    };

    if inner.enable_logging {
        tracing::warn!(
            method = %options.method,
            url = %full_url,
            status = raw.status,
            "Request returned an error status"
        );
    }
    inner.interceptors.notify_error(&err, &full_url, &options);
    Err(err)
}

/// Two handles are equal when they refer to the same client instance.
impl PartialEq for Restie {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Restie {}

impl fmt::Debug for Restie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Restie")
            .field("base_url", &self.inner.base_url)
            .field("configuration", &*self.inner.configuration.read())
            .finish()
    }
}
