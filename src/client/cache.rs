//! In-flight de-duplication and TTL caching of responses.
//!
//! Requests with the same cache key that overlap in time share a single
//! transport call: the first caller starts it, later callers join the pending
//! future and every one of them receives the same outcome, success or failure.
//!
//! With a TTL, successful results are additionally kept after they settle. The
//! settled store holds at most 100 entries and evicts in insertion order. An
//! entry older than the TTL is discarded on lookup and the request is issued
//! again.

use crate::error::{RestieError, Result};
use crate::types::{CacheMeta, RestieResponse};
use futures::future::{BoxFuture, FutureExt, Shared};
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Maximum number of settled results kept for TTL reuse.
pub const SETTLED_CAPACITY: NonZeroUsize = match NonZeroUsize::new(100) {
    Some(capacity) => capacity,
    None => panic!("settled capacity must be non-zero"),
};

type SharedResponse = Shared<BoxFuture<'static, Result<RestieResponse>>>;

/// Removes an in-flight key when its request task finishes or unwinds.
struct InFlightGuard {
    cache: Weak<ResponseCache>,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Some(cache) = self.cache.upgrade() {
            cache.in_flight.lock().remove(&self.key);
        }
    }
}

pub(crate) struct ResponseCache {
    in_flight: Mutex<HashMap<String, SharedResponse>>,
    settled: Mutex<LruCache<String, (RestieResponse, Instant)>>,
    ttl: Option<Duration>,
}

impl ResponseCache {
    pub(crate) fn new(ttl: Option<Duration>) -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
            settled: Mutex::new(LruCache::new(SETTLED_CAPACITY)),
            ttl,
        }
    }

    /// Serve `key` from the TTL store, join a pending request for it, or run
    /// `commit` and publish it for later callers.
    pub(crate) async fn get_or_commit<F>(self: &Arc<Self>, key: String, commit: F) -> Result<RestieResponse>
    where
        F: FnOnce() -> BoxFuture<'static, Result<RestieResponse>>,
    {
        let (shared, request) = {
            let mut in_flight = self.in_flight.lock();

            if let Some(hit) = self.lookup_settled(&key) {
                tracing::debug!(key = %key, "Serving cached response");
                return Ok(hit);
            }

            match in_flight.get(&key) {
                Some(pending) => {
                    tracing::debug!(key = %key, "Joining in-flight request");
                    (pending.clone(), None)
                }
                None => {
                    let (tx, rx) = oneshot::channel();
                    let shared = async move {
                        rx.await.unwrap_or_else(|_| {
                            Err(RestieError::Transport("request task aborted".into()))
                        })
                    }
                    .boxed()
                    .shared();

                    in_flight.insert(key.clone(), shared.clone());
                    (shared, Some((commit(), tx)))
                }
            }
        };

        // Spawned after the entry is published, so the task settles and cleans
        // up even if every caller stops waiting.
        if let Some((request, tx)) = request {
            let guard = InFlightGuard {
                cache: Arc::downgrade(self),
                key,
            };
            tokio::spawn(async move {
                let result = request.await;
                if let (Ok(response), Some(cache)) = (&result, guard.cache.upgrade()) {
                    cache.store(&guard.key, response);
                }
                drop(guard);
                let _ = tx.send(result);
            });
        }

        shared.await
    }

    fn lookup_settled(&self, key: &str) -> Option<RestieResponse> {
        let ttl = self.ttl?;
        let mut settled = self.settled.lock();

        let expired = settled.peek(key).map(|(_, stored_at)| stored_at.elapsed() >= ttl)?;
        if expired {
            settled.pop(key);
            return None;
        }

        let (response, stored_at) = settled.peek(key)?;
        let mut hit = response.clone();
        hit.tag(CacheMeta {
            key: key.to_string(),
            cached_at: *stored_at,
        });
        Some(hit)
    }

    fn store(&self, key: &str, response: &RestieResponse) {
        if self.ttl.is_none() {
            return;
        }
        self.settled
            .lock()
            .push(key.to_string(), (response.clone(), Instant::now()));
    }

    #[cfg(test)]
    pub(crate) fn in_flight_len(&self) -> usize {
        self.in_flight.lock().len()
    }

    #[cfg(test)]
    pub(crate) fn settled_len(&self) -> usize {
        self.settled.lock().len()
    }
}
