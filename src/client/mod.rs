//! Restie client implementation.
//!
//! This module provides the client instance and everything a request passes
//! through on its way to the network:
//!
//! - **Interceptors** that rewrite requests and enrich responses
//! - **De-duplication** of identical in-flight requests
//! - **TTL caching** of settled results
//! - **Pluggable transports** decorated by plugins
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── fetch        - Restie client and the request pipeline
//! ├── cache        - In-flight de-duplication and TTL cache
//! ├── interceptors - Ordered interceptor registries
//! ├── transport    - Transport trait and implementations
//! ├── config       - Client configuration
//! └── utils        - Utility functions
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Restie`] | Client instance and request pipeline |
//! | [`ClientConfig`] | Client configuration options |
//! | [`Configuration`] | Runtime configuration record |
//! | [`Transport`] | Sends prepared requests |
//! | [`InterceptorId`] | Handle of a registered interceptor |
//!
//! # Examples
//!
//! ## Creating a Client
//!
//! ```
//! use restie::client::{ClientConfig, Restie};
//! use std::time::Duration;
//!
//! // Default configuration
//! let api = Restie::new("http://example.com/api");
//!
//! // Custom configuration
//! let config = ClientConfig {
//!     cache_ttl: Some(Duration::from_secs(30)),
//!     data_key: Some("data".into()),
//!     ..Default::default()
//! };
//! let api = Restie::with_config("http://example.com/api", config).unwrap();
//! assert!(api.configuration().enabled_cache());
//! ```
//!
//! ## Interceptors
//!
//! ```
//! use restie::client::Restie;
//! use restie::RequestPatch;
//!
//! let api = Restie::new("http://example.com/api");
//! let id = api.add_request_interceptor(|options| {
//!     let mut headers = options.headers.clone();
//!     headers.insert("X-Client".into(), Some("restie".into()));
//!     RequestPatch::new().headers(headers)
//! });
//! assert!(api.remove_request_interceptor(id));
//! ```
//!
//! ## Utility Functions
//!
//! ```
//! use restie::client::{is_success_status, mime_essence};
//!
//! assert!(is_success_status(201));
//! assert!(!is_success_status(404));
//! assert_eq!(mime_essence("text/plain; charset=utf-8"), "text/plain");
//! ```

mod cache;
mod config;
mod fetch;
mod interceptors;
mod transport;
mod utils;

pub use cache::SETTLED_CAPACITY;
pub use config::{default_cache_key, CacheKeyFn, ClientConfig, Configuration};
pub use fetch::Restie;
pub use interceptors::{
    ErrorInterceptor, InterceptorId, RequestInterceptor, ResponseInterceptor,
};
pub use transport::{transport_fn, ReqwestTransport, Transport, TransportFn};
pub use utils::*;
