//! Plugin protocol.
//!
//! A plugin is a set of optional hooks, each defaulting to a no-op:
//!
//! | Hook | Purpose |
//! |------|---------|
//! | [`Plugin::wrap_transport`] | Decorate the transport every request goes through |
//! | [`Plugin::extend_configuration`] | Store typed values in the configuration record |
//! | [`Plugin::extend_instance`] | Store typed values on the client instance |
//!
//! Transport decorators compose left to right: the first installed plugin is
//! the outermost wrapper and sees each request first.
//!
//! ```text
//! request → plugin[0] → plugin[1] → … → base transport
//! ```
//!
//! # Examples
//!
//! ```
//! use restie::client::{ClientConfig, Restie};
//! use restie::plugin::Plugin;
//! use std::sync::Arc;
//!
//! #[derive(Clone)]
//! struct Tenant(&'static str);
//!
//! struct TenantPlugin;
//!
//! impl Plugin for TenantPlugin {
//!     fn name(&self) -> &str {
//!         "tenant"
//!     }
//!
//!     fn extend_instance(&self, extensions: &mut http::Extensions) {
//!         extensions.insert(Tenant("acme"));
//!     }
//! }
//!
//! let config = ClientConfig {
//!     plugins: vec![Arc::new(TenantPlugin)],
//!     ..Default::default()
//! };
//! let api = Restie::with_config("http://api", config).unwrap();
//! assert_eq!(api.instance_extension::<Tenant>().map(|t| t.0), Some("acme"));
//! ```

mod limiter;

pub use limiter::{RateLimiter, RateLimiterConfig, RateLimiterControl};

use crate::client::{Configuration, Restie, Transport};
use http::Extensions;
use std::sync::Arc;

/// An installable capability set.
pub trait Plugin: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str {
        "plugin"
    }

    /// Return a transport that wraps `next`, or `None` to leave it alone.
    fn wrap_transport(&self, _next: Arc<dyn Transport>, _client: &Restie) -> Option<Arc<dyn Transport>> {
        None
    }

    /// Called once at installation with the configuration record.
    fn extend_configuration(&self, _configuration: &mut Configuration) {}

    /// Called once at installation with the instance extension map.
    fn extend_instance(&self, _extensions: &mut Extensions) {}
}

/// Wrap `base` with the transport decorators of `plugins`.
///
/// The first plugin ends up outermost.
pub fn compose_transport(
    plugins: &[Arc<dyn Plugin>],
    base: Arc<dyn Transport>,
    client: &Restie,
) -> Arc<dyn Transport> {
    plugins
        .iter()
        .rev()
        .fold(base, |next, plugin| {
            match plugin.wrap_transport(Arc::clone(&next), client) {
                Some(wrapped) => wrapped,
                None => next,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{transport_fn, ClientConfig};
    use crate::error::Result;
    use crate::types::{Method, RawResponse, TransportRequest};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::BTreeMap;

    struct Tagging {
        tag: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    struct TaggingTransport {
        tag: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        next: Arc<dyn Transport>,
    }

    #[async_trait]
    impl Transport for TaggingTransport {
        async fn send(&self, url: &str, request: TransportRequest) -> Result<RawResponse> {
            self.log.lock().push(self.tag);
            self.next.send(url, request).await
        }
    }

    impl Plugin for Tagging {
        fn wrap_transport(&self, next: Arc<dyn Transport>, _client: &Restie) -> Option<Arc<dyn Transport>> {
            Some(Arc::new(TaggingTransport {
                tag: self.tag,
                log: self.log.clone(),
                next,
            }))
        }
    }

    struct Inert;

    impl Plugin for Inert {}

    #[tokio::test]
    async fn test_first_plugin_is_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let base_log = log.clone();
        let base: Arc<dyn Transport> = Arc::new(transport_fn(move |_url, _req| {
            base_log.lock().push("base");
            async { Ok(RawResponse::new(200)) }
        }));

        let plugins: Vec<Arc<dyn Plugin>> = vec![
            Arc::new(Tagging { tag: "first", log: log.clone() }),
            Arc::new(Inert),
            Arc::new(Tagging { tag: "second", log: log.clone() }),
        ];
        let client = Restie::with_config("http://api", ClientConfig::default()).unwrap();
        let transport = compose_transport(&plugins, base, &client);

        let request = TransportRequest {
            method: Method::Get,
            headers: BTreeMap::new(),
            body: None,
        };
        transport.send("http://api/x", request).await.unwrap();
        assert_eq!(*log.lock(), vec!["first", "second", "base"]);
    }

    #[test]
    fn test_default_hooks_are_noops() {
        let plugin = Inert;
        assert_eq!(plugin.name(), "plugin");
        let mut extensions = Extensions::new();
        plugin.extend_instance(&mut extensions);
        assert!(extensions.is_empty());
    }
}
