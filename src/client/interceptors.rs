//! Ordered interceptor registries.
//!
//! Interceptors run in registration order. Each registry hands out an
//! [`InterceptorId`] on registration; removing by id is the only way to take
//! an interceptor out again. Hooks are invoked on a snapshot, so a hook may
//! register or remove interceptors without deadlocking.

use crate::error::RestieError;
use crate::types::{RequestOptions, RequestPatch, ResponsePatch, RestieResponse};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Transforms outgoing request options. The returned patch is merged shallowly.
pub type RequestInterceptor = Arc<dyn Fn(&RequestOptions) -> RequestPatch + Send + Sync>;

/// Contributes to a successful response.
pub type ResponseInterceptor =
    Arc<dyn Fn(&RestieResponse, &RequestOptions) -> ResponsePatch + Send + Sync>;

/// Observes a failure together with the full URL and the request options.
pub type ErrorInterceptor = Arc<dyn Fn(&RestieError, &str, &RequestOptions) + Send + Sync>;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Handle returned when an interceptor is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterceptorId(u64);

/// An ordered set of interceptors of one kind.
pub struct Registry<T> {
    entries: RwLock<Vec<(InterceptorId, T)>>,
}

impl<T: Clone> Registry<T> {
    fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Append an interceptor.
    pub fn add(&self, hook: T) -> InterceptorId {
        let id = InterceptorId(NEXT_ID.fetch_add(1, Ordering::Relaxed));
        self.entries.write().push((id, hook));
        id
    }

    /// Remove an interceptor. Returns false when the id is unknown.
    pub fn remove(&self, id: InterceptorId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        entries.len() != before
    }

    /// Registered interceptors, in order.
    pub fn snapshot(&self) -> Vec<T> {
        self.entries.read().iter().map(|(_, hook)| hook.clone()).collect()
    }

    /// Number of registered interceptors.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no interceptor is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// The three registries of a client.
pub struct Interceptors {
    pub(crate) request: Registry<RequestInterceptor>,
    pub(crate) response: Registry<ResponseInterceptor>,
    pub(crate) error: Registry<ErrorInterceptor>,
}

impl Interceptors {
    pub(crate) fn new() -> Self {
        Self {
            request: Registry::new(),
            response: Registry::new(),
            error: Registry::new(),
        }
    }

    /// Fold every request interceptor over `options`.
    pub(crate) fn apply_request(&self, options: &mut RequestOptions) {
        for hook in self.request.snapshot() {
            let patch = hook(options);
            options.merge(patch);
        }
    }

    /// Let every response interceptor contribute to `response`.
    pub(crate) fn apply_response(&self, response: &mut RestieResponse, options: &RequestOptions) {
        for hook in self.response.snapshot() {
            let patch = hook(response, options);
            response.apply(patch);
        }
    }

    /// Notify every error interceptor.
    pub(crate) fn notify_error(&self, err: &RestieError, full_url: &str, options: &RequestOptions) {
        for hook in self.error.snapshot() {
            hook(err, full_url, options);
        }
    }
}
