#![warn(missing_docs)]

//! # Restie: fluent client for nested RESTful resources
//!
//! Restie models a REST API as a tree of resources. Every node knows its URL,
//! its parent and the client it belongs to, and exposes the usual verbs.
//!
//! ## Overview
//!
//! A request travels through a small pipeline:
//!
//! 1. **Resource model** - `collection`/`item` chains build the URL
//! 2. **Prepare** - request interceptors, default headers, JSON body, query string
//! 3. **De-duplication** - identical in-flight requests share one transport call
//! 4. **Commit** - the plugin-decorated transport sends the request
//! 5. **Shape** - best-effort body decoding, response or error interceptors
//!
//! ## Key Features
//!
//! - **Nested resources** with parent back-references
//! - **Interceptors** for requests, responses and errors
//! - **In-flight de-duplication** keyed by method and URL
//! - **TTL caching** of settled results (100 entries, oldest evicted first)
//! - **Plugins** that decorate the transport or extend the client
//! - **Rate limiting** through FIFO batches of bounded concurrency
//! - **Status handling**:
//!   - `2xx` - resolves with a [`RestieResponse`]
//!   - anything else - fails with [`RestieError::Status`] carrying the response
//!   - no response at all - fails with [`RestieError::Transport`] (status code 0)
//!
//! ## Client Usage
//!
//! ```no_run
//! use restie::{ClientConfig, Restie};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = Restie::with_config(
//!         "http://localhost:3000/api",
//!         ClientConfig {
//!             cache_ttl: Some(Duration::from_secs(10)),
//!             ..Default::default()
//!         },
//!     )?;
//!
//!     let humans = api.item("planets", 3).collection("humans");
//!
//!     let created = humans.post().json(&json!({"name": "Ada"})).await?;
//!     println!("Created: {}", created.data());
//!
//!     let page = humans.get_all().param("page", 1).await?;
//!     println!("Page: {}", page.result());
//!
//!     match humans.get().path(404).await {
//!         Err(e) => println!("Failed with status {}", e.status_code()),
//!         Ok(found) => println!("Found: {}", found.data()),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Rate Limiting
//!
//! ```no_run
//! use restie::plugin::{RateLimiterConfig, RateLimiterControl};
//! use restie::{ClientConfig, Restie};
//!
//! # fn main() -> restie::Result<()> {
//! let api = Restie::with_config(
//!     "http://localhost:3000/api",
//!     ClientConfig {
//!         rate_limit: Some(RateLimiterConfig { bucket_size: 5, ..Default::default() }),
//!         ..Default::default()
//!     },
//! )?;
//!
//! let limiter = api.config_extension::<RateLimiterControl>().unwrap();
//! limiter.set_bucket_size(2)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - **[types]** - Request and response types
//! - **[error]** - Error types and result handling
//! - **[client]** - Client instance, pipeline, cache and transports
//! - **[model]** - Resource nodes and request builders
//! - **[plugin]** - Plugin protocol and the rate limiter
//! - **[protocol]** - Path joining, query strings and default headers
//! - **[openapi]** - OpenAPI path map conversion

pub mod client;
pub mod error;
pub mod model;
pub mod openapi;
pub mod plugin;
pub mod protocol;
pub mod types;

pub use client::{ClientConfig, Configuration, InterceptorId, Restie, Transport};
pub use error::{RestieError, Result};
pub use model::{RequestBuilder, Resource, Verb};
pub use plugin::{Plugin, RateLimiter, RateLimiterConfig};
pub use types::{
    CacheMeta, Headers, Method, Params, PreparedRequest, RawResponse, RequestOptions,
    RequestPatch, ResponsePatch, RestieResponse, TransportRequest,
};
