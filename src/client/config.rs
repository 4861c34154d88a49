//! Configuration for the Restie client.
//!
//! [`ClientConfig`] holds the options a caller passes when creating a client.
//! [`Configuration`] is the runtime record the client keeps afterwards: it has
//! read-only accessors only, plus a typed extension map that plugins fill in
//! from their configuration hook.
//!
//! # Configuration Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `immutable` | false | Freeze results, reject post-construction plugins |
//! | `cache` | false | De-duplicate identical in-flight requests |
//! | `cache_ttl` | None | Keep settled results for this long (implies `cache`) |
//! | `cache_by` | None | Custom cache key function |
//! | `data_key` | None | Key unwrapped by `RestieResponse::result()` |
//! | `plugins` | [] | Plugins installed at construction |
//! | `enable_plugins` | true | Apply installed plugins |
//! | `rate_limit` | None | Install a rate limiter with this tuning |
//! | `request_timeout_ms` | 30000 | Timeout of the default transport |
//! | `enable_logging` | false | Warn-level logs for failed requests |
//!
//! # Examples
//!
//! ```
//! use restie::client::ClientConfig;
//! use std::time::Duration;
//!
//! let config = ClientConfig {
//!     cache_ttl: Some(Duration::from_secs(5)),
//!     data_key: Some("payload".into()),
//!     ..Default::default()
//! };
//! assert!(config.caching_enabled());
//! ```

use crate::error::{RestieError, Result};
use crate::plugin::{Plugin, RateLimiterConfig};
use crate::types::PreparedRequest;
use http::Extensions;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Computes the cache key of a prepared request.
pub type CacheKeyFn = Arc<dyn Fn(&PreparedRequest) -> String + Send + Sync>;

/// Default cache key: `"METHOD:full_url"`.
///
/// ```
/// use restie::client::default_cache_key;
/// use restie::{Method, PreparedRequest, RequestOptions};
///
/// let prepared = PreparedRequest {
///     options: RequestOptions::new(Method::Get, "http://api/a"),
///     full_url: "http://api/a?x=1".into(),
///     body: None,
/// };
/// assert_eq!(default_cache_key(&prepared), "GET:http://api/a?x=1");
/// ```
pub fn default_cache_key(prepared: &PreparedRequest) -> String {
    format!("{}:{}", prepared.options.method, prepared.full_url)
}

/// Options accepted when creating a client.
#[derive(Clone)]
pub struct ClientConfig {
    /// Enforce immutability.
    ///
    /// Successful results are frozen and plugins can no longer be installed
    /// after construction.
    pub immutable: bool,

    /// De-duplicate concurrent identical requests.
    pub cache: bool,

    /// Retain successful results for this long. Implies `cache`.
    pub cache_ttl: Option<Duration>,

    /// Custom cache key. Defaults to [`default_cache_key`].
    pub cache_by: Option<CacheKeyFn>,

    /// Key unwrapped by `RestieResponse::result()`.
    pub data_key: Option<String>,

    /// Plugins installed at construction, in order.
    pub plugins: Vec<Arc<dyn Plugin>>,

    /// When false, plugins are recorded but none of their hooks run.
    pub enable_plugins: bool,

    /// When set, a rate limiter with this tuning is installed after `plugins`.
    pub rate_limit: Option<RateLimiterConfig>,

    /// Request timeout of the default reqwest transport, in milliseconds.
    pub request_timeout_ms: u64,

    /// Log failed requests at warn level.
    pub enable_logging: bool,
}

impl ClientConfig {
    /// Whether the de-duplication layer is active.
    pub fn caching_enabled(&self) -> bool {
        self.cache || self.cache_ttl.is_some()
    }

    /// Reject option combinations that can never work.
    pub fn validate(&self) -> Result<()> {
        if self.cache_ttl.is_some_and(|ttl| ttl.is_zero()) {
            return Err(RestieError::Config("cache_ttl must be greater than zero".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(RestieError::Config(
                "request_timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            immutable: false,
            cache: false,
            cache_ttl: None,
            cache_by: None,
            data_key: None,
            plugins: Vec::new(),
            enable_plugins: true,
            rate_limit: None,
            request_timeout_ms: 30000,
            enable_logging: false,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("immutable", &self.immutable)
            .field("cache", &self.cache)
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_by", &self.cache_by.as_ref().map(|_| "<fn>"))
            .field("data_key", &self.data_key)
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.name().to_string()).collect::<Vec<_>>(),
            )
            .field("enable_plugins", &self.enable_plugins)
            .field("rate_limit", &self.rate_limit)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("enable_logging", &self.enable_logging)
            .finish()
    }
}

/// Runtime configuration record of a client.
pub struct Configuration {
    enforce_immutability: bool,
    enabled_cache: bool,
    cache_ttl: Option<Duration>,
    cache_by: CacheKeyFn,
    data_key: Option<String>,
    plugins: Vec<Arc<dyn Plugin>>,
    plugins_enabled: bool,
    extensions: Extensions,
}

impl Configuration {
    pub(crate) fn from_config(config: &ClientConfig) -> Self {
        Configuration {
            enforce_immutability: config.immutable,
            enabled_cache: config.caching_enabled(),
            cache_ttl: config.cache_ttl,
            cache_by: config
                .cache_by
                .clone()
                .unwrap_or_else(|| Arc::new(default_cache_key)),
            data_key: config.data_key.clone(),
            plugins: Vec::new(),
            plugins_enabled: config.enable_plugins,
            extensions: Extensions::new(),
        }
    }

    /// Whether immutability is enforced.
    pub fn enforce_immutability(&self) -> bool {
        self.enforce_immutability
    }

    /// Whether in-flight de-duplication is active.
    pub fn enabled_cache(&self) -> bool {
        self.enabled_cache
    }

    /// TTL of settled results, if TTL caching is active.
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl
    }

    /// Key unwrapped by `RestieResponse::result()`.
    pub fn data_key(&self) -> Option<&str> {
        self.data_key.as_deref()
    }

    /// Installed plugins, in installation order.
    pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }

    /// Whether plugin hooks run.
    pub fn plugins_enabled(&self) -> bool {
        self.plugins_enabled
    }

    /// Cache key of a prepared request.
    pub fn cache_key(&self, prepared: &PreparedRequest) -> String {
        (self.cache_by)(prepared)
    }

    /// A clone of the extension of type `T`, if a plugin stored one.
    pub fn extension<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
        self.extensions.get::<T>().cloned()
    }

    /// Extension map written by plugins during installation.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    pub(crate) fn record_plugins(&mut self, plugins: &[Arc<dyn Plugin>]) {
        self.plugins.extend(plugins.iter().cloned());
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("enforce_immutability", &self.enforce_immutability)
            .field("enabled_cache", &self.enabled_cache)
            .field("cache_ttl", &self.cache_ttl)
            .field("data_key", &self.data_key)
            .field("plugins", &self.plugins.len())
            .field("plugins_enabled", &self.plugins_enabled)
            .finish()
    }
}
