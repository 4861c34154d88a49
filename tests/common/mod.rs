//! Shared fixtures for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use restie::{RawResponse, Result, Transport, TransportRequest};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

type Responder = Box<dyn Fn(&str, &TransportRequest) -> Result<RawResponse> + Send + Sync>;

/// Transport that records every call and answers through a closure.
pub struct RecordingTransport {
    calls: Mutex<Vec<(String, TransportRequest)>>,
    respond: Responder,
    delay: Duration,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl RecordingTransport {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&str, &TransportRequest) -> Result<RawResponse> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            respond: Box::new(respond),
            delay: Duration::ZERO,
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Always answer `status` with a JSON body.
    pub fn json(status: u16, body: Value) -> Self {
        Self::new(move |_, _| Ok(RawResponse::json_body(status, &body)))
    }

    /// Answer with the call number as JSON, starting at 1.
    pub fn numbered() -> Self {
        let counter = AtomicUsize::new(0);
        Self::new(move |_, _| {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(RawResponse::json_body(200, &serde_json::json!({ "call": n })))
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls(&self) -> Vec<(String, TransportRequest)> {
        self.calls.lock().clone()
    }

    pub fn last(&self) -> Option<(String, TransportRequest)> {
        self.calls.lock().last().cloned()
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, url: &str, request: TransportRequest) -> Result<RawResponse> {
        self.calls.lock().push((url.to_string(), request.clone()));

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        (self.respond)(url, &request)
    }
}

pub fn shared(transport: RecordingTransport) -> (Arc<RecordingTransport>, Arc<dyn Transport>) {
    let transport = Arc::new(transport);
    let as_dyn: Arc<dyn Transport> = transport.clone();
    (transport, as_dyn)
}
