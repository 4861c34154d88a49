//! FIFO batching rate limiter.
//!
//! Every transport call becomes a queued task. A drain loop starts after a
//! short grouping window, then repeatedly takes up to `bucket_size` tasks from
//! the front of the queue, runs them concurrently and waits for all of them
//! (and for `bucket_delay`, measured from the start of the batch) before
//! taking the next batch. The loop stops when the queue is empty.
//!
//! Once `bucket_limit` tasks are waiting, new calls are rejected with
//! [`RestieError::QueueOverflow`] instead of being queued.
//!
//! # Examples
//!
//! ```
//! use restie::client::{ClientConfig, Restie};
//! use restie::plugin::{RateLimiterConfig, RateLimiterControl};
//!
//! let config = ClientConfig {
//!     rate_limit: Some(RateLimiterConfig { bucket_size: 2, ..Default::default() }),
//!     ..Default::default()
//! };
//! let api = Restie::with_config("http://api", config).unwrap();
//!
//! let control = api.config_extension::<RateLimiterControl>().unwrap();
//! assert_eq!(control.bucket_size(), 2);
//! control.set_bucket_size(4).unwrap();
//! assert_eq!(control.bucket_size(), 4);
//! ```

use crate::client::{Configuration, Restie, Transport};
use crate::error::{RestieError, Result};
use crate::plugin::Plugin;
use crate::types::{RawResponse, TransportRequest};
use async_trait::async_trait;
use futures::future::{join_all, BoxFuture, FutureExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// Tuning of a [`RateLimiter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Maximum number of tasks running concurrently in one batch.
    pub bucket_size: usize,

    /// Maximum number of queued tasks before new ones are rejected.
    pub bucket_limit: usize,

    /// Minimum time between the start of one batch and the start of the next.
    pub bucket_delay: Duration,

    /// Debounce before the queue starts draining.
    pub grouping_window: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        RateLimiterConfig {
            bucket_size: 10,
            bucket_limit: 10000,
            bucket_delay: Duration::ZERO,
            grouping_window: Duration::from_millis(10),
        }
    }
}

type Task = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

struct Queue {
    tasks: VecDeque<Task>,
    draining: bool,
}

struct Settings {
    bucket_size: AtomicUsize,
    bucket_limit: AtomicUsize,
    bucket_delay_ms: AtomicU64,
    grouping_window: Duration,
    batches: AtomicU64,
}

/// The rate limiter plugin.
///
/// Clones share the same queue.
#[derive(Clone)]
pub struct RateLimiter {
    settings: Arc<Settings>,
    queue: Arc<Mutex<Queue>>,
}

impl RateLimiter {
    /// Create a limiter. A zero `bucket_size` or `bucket_limit` is rejected.
    pub fn new(config: RateLimiterConfig) -> Result<Self> {
        validate_size("bucket_size", config.bucket_size)?;
        validate_size("bucket_limit", config.bucket_limit)?;

        Ok(RateLimiter {
            settings: Arc::new(Settings {
                bucket_size: AtomicUsize::new(config.bucket_size),
                bucket_limit: AtomicUsize::new(config.bucket_limit),
                bucket_delay_ms: AtomicU64::new(duration_ms(config.bucket_delay)),
                grouping_window: config.grouping_window,
                batches: AtomicU64::new(0),
            }),
            queue: Arc::new(Mutex::new(Queue {
                tasks: VecDeque::new(),
                draining: false,
            })),
        })
    }

    /// Runtime control over this limiter.
    pub fn control(&self) -> RateLimiterControl {
        RateLimiterControl {
            limiter: self.clone(),
        }
    }

    /// Queue `task` and wait for its outcome.
    pub async fn schedule<T, F>(&self, task: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();

        {
            let mut queue = self.queue.lock();
            let limit = self.settings.bucket_limit.load(Ordering::Relaxed);
            if queue.tasks.len() >= limit {
                tracing::warn!(limit, "Rate limiter queue is full, rejecting request");
                return Err(RestieError::QueueOverflow { limit });
            }

            queue.tasks.push_back(Box::new(move || {
                async move {
                    let outcome = AssertUnwindSafe(task).catch_unwind().await.unwrap_or_else(|_| {
                        tracing::warn!("Rate limited request panicked");
                        Err(RestieError::Transport("request panicked".into()))
                    });
                    let _ = tx.send(outcome);
                }
                .boxed()
            }));

            if !queue.draining {
                queue.draining = true;
                let limiter = self.clone();
                tokio::spawn(async move { limiter.drain().await });
            }
        }

        rx.await
            .map_err(|_| RestieError::Transport("rate limiter dropped the request".into()))?
    }

    async fn drain(self) {
        let mut guard = DrainGuard {
            queue: Arc::clone(&self.queue),
            finished: false,
        };

        if !self.settings.grouping_window.is_zero() {
            tokio::time::sleep(self.settings.grouping_window).await;
        }

        loop {
            let batch: Vec<Task> = {
                let mut queue = self.queue.lock();
                let size = self.settings.bucket_size.load(Ordering::Relaxed);
                let take = size.min(queue.tasks.len());
                if take == 0 {
                    queue.draining = false;
                    guard.finished = true;
                    return;
                }
                queue.tasks.drain(..take).collect()
            };

            let delay = Duration::from_millis(self.settings.bucket_delay_ms.load(Ordering::Relaxed));
            tracing::trace!(size = batch.len(), "Running rate limiter batch");

            let running = join_all(batch.into_iter().map(|task| task()));
            if delay.is_zero() {
                running.await;
            } else {
                futures::join!(running, tokio::time::sleep(delay));
            }

            self.settings.batches.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Lets a later `schedule` start a new drain if this one unwinds.
struct DrainGuard {
    queue: Arc<Mutex<Queue>>,
    finished: bool,
}

impl Drop for DrainGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.queue.lock().draining = false;
        }
    }
}

impl Plugin for RateLimiter {
    fn name(&self) -> &str {
        "rate-limiter"
    }

    fn wrap_transport(&self, next: Arc<dyn Transport>, _client: &Restie) -> Option<Arc<dyn Transport>> {
        Some(Arc::new(RateLimitedTransport {
            next,
            limiter: self.clone(),
        }))
    }

    fn extend_configuration(&self, configuration: &mut Configuration) {
        configuration.extensions_mut().insert(self.control());
    }
}

struct RateLimitedTransport {
    next: Arc<dyn Transport>,
    limiter: RateLimiter,
}

#[async_trait]
impl Transport for RateLimitedTransport {
    async fn send(&self, url: &str, request: TransportRequest) -> Result<RawResponse> {
        let next = Arc::clone(&self.next);
        let url = url.to_string();
        self.limiter
            .schedule(async move { next.send(&url, request).await })
            .await
    }
}

/// Runtime handle on a [`RateLimiter`], stored in the configuration record.
#[derive(Clone)]
pub struct RateLimiterControl {
    limiter: RateLimiter,
}

impl RateLimiterControl {
    /// Current batch size.
    pub fn bucket_size(&self) -> usize {
        self.limiter.settings.bucket_size.load(Ordering::Relaxed)
    }

    /// Change the batch size, effective from the next batch.
    pub fn set_bucket_size(&self, size: usize) -> Result<()> {
        validate_size("bucket_size", size)?;
        self.limiter.settings.bucket_size.store(size, Ordering::Relaxed);
        Ok(())
    }

    /// Current queue limit.
    pub fn bucket_limit(&self) -> usize {
        self.limiter.settings.bucket_limit.load(Ordering::Relaxed)
    }

    /// Change the queue limit.
    pub fn set_bucket_limit(&self, limit: usize) -> Result<()> {
        validate_size("bucket_limit", limit)?;
        self.limiter.settings.bucket_limit.store(limit, Ordering::Relaxed);
        Ok(())
    }

    /// Current delay between batch starts.
    pub fn bucket_delay(&self) -> Duration {
        Duration::from_millis(self.limiter.settings.bucket_delay_ms.load(Ordering::Relaxed))
    }

    /// Change the delay between batch starts.
    pub fn set_bucket_delay(&self, delay: Duration) {
        self.limiter
            .settings
            .bucket_delay_ms
            .store(duration_ms(delay), Ordering::Relaxed);
    }

    /// Tasks waiting to start.
    pub fn queued(&self) -> usize {
        self.limiter.queue.lock().tasks.len()
    }

    /// Batches fully completed so far.
    pub fn batches_completed(&self) -> u64 {
        self.limiter.settings.batches.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for RateLimiterControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterControl")
            .field("bucket_size", &self.bucket_size())
            .field("bucket_limit", &self.bucket_limit())
            .field("bucket_delay", &self.bucket_delay())
            .field("queued", &self.queued())
            .finish()
    }
}

fn validate_size(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(RestieError::Config(format!("{name} must be greater than zero")));
    }
    Ok(())
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
