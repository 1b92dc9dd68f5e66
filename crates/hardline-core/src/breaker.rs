//! Per-host circuit breaker decorator.
//!
//! After a `ServerError` or `ConnectionFailed` outcome for a host, every
//! attempt against that host within the cooldown window is short-circuited
//! to a synthetic 503 without touching the inner transport. The circuit
//! closes implicitly once the window elapses; openings are just read-time
//! comparisons against a per-host timestamp, never explicitly cleared.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::headers::Headers;
use crate::outcome::Outcome;
use crate::request::{Request, Version};
use crate::response::Response;
use crate::sink::BodyStream;
use crate::transport::Transport;

/// Marker header carried by synthetic circuit-open responses.
pub const CIRCUIT_OPENED_HEADER: &str = "x-circuit-opened";

pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30);

/// Circuit-breaking decorator. Hosts are tracked independently; the key is
/// the URL's authority host only, never scheme, port or path.
pub struct CircuitBreaker<T> {
    inner: T,
    cooldown: Duration,
    opened: HashMap<String, Instant>,
}

impl<T: Transport> CircuitBreaker<T> {
    pub fn new(inner: T, cooldown: Duration) -> Self {
        CircuitBreaker {
            inner,
            cooldown,
            opened: HashMap::new(),
        }
    }

    fn is_open(&self, host: &str) -> bool {
        match self.opened.get(host) {
            Some(at) => at.elapsed() < self.cooldown,
            None => false,
        }
    }

    fn synthetic(request: Request) -> Outcome {
        let mut headers = Headers::new();
        headers.append(CIRCUIT_OPENED_HEADER, "true");
        let response = Response::new(503, Version::Http11, headers, BodyStream::empty());
        Outcome::server_error(request, response)
    }
}

impl<T: Transport> Transport for CircuitBreaker<T> {
    fn attempt(&mut self, request: Request) -> Outcome {
        let host = request.host().map(str::to_owned);
        if let Some(host) = &host {
            if self.is_open(host) {
                tracing::debug!(host = %host, "circuit open, short-circuiting attempt");
                return Self::synthetic(request);
            }
        }
        let outcome = self.inner.attempt(request);
        if outcome.is_retryable() {
            if let Some(host) = host {
                tracing::warn!(host = %host, outcome = %outcome, "circuit opened");
                self.opened.insert(host, Instant::now());
            }
        }
        outcome
    }
}
