//! Exponential-backoff retry decorator.
//!
//! The delay schedule is fixed at construction and replayed from the start
//! on every top-level attempt. Retries happen only while the outcome stays
//! `ServerError` or `ConnectionFailed`; anything else returns immediately.
//! When the schedule runs out, the last retryable outcome is returned
//! as-is, never wrapped.

use std::time::Duration;

use crate::outcome::Outcome;
use crate::request::Request;
use crate::transport::Transport;

/// Default schedule: `⌈e^i · 100ms⌉` for i = 0..4. The literal values are
/// kept for compatibility with existing deployments.
pub const DEFAULT_DELAYS_MS: [u64; 5] = [100, 271, 738, 2008, 5459];

/// The halt performed between attempts. Injectable so tests can record the
/// exact delays instead of sleeping.
pub type Halt = Box<dyn FnMut(Duration)>;

/// Retry decorator with a fixed, non-empty delay schedule.
pub struct ExponentialBackoff<T> {
    inner: T,
    delays: Vec<Duration>,
    halt: Halt,
}

impl<T: Transport> ExponentialBackoff<T> {
    /// Default schedule, blocking `thread::sleep` halt.
    pub fn new(inner: T) -> Self {
        Self::with_delays(inner, DEFAULT_DELAYS_MS.map(Duration::from_millis).to_vec())
    }

    /// Custom schedule. N delays allow at most N+1 inner attempts.
    ///
    /// # Panics
    ///
    /// Panics if `delays` is empty; a zero-retry backoff is a configuration
    /// error, callers wanting no retries should skip the decorator.
    pub fn with_delays(inner: T, delays: Vec<Duration>) -> Self {
        assert!(!delays.is_empty(), "backoff schedule must be non-empty");
        ExponentialBackoff {
            inner,
            delays,
            halt: Box::new(std::thread::sleep),
        }
    }

    /// Replace the halt action. Used by tests.
    pub fn with_halt(mut self, halt: Halt) -> Self {
        self.halt = halt;
        self
    }
}

impl<T: Transport> Transport for ExponentialBackoff<T> {
    fn attempt(&mut self, request: Request) -> Outcome {
        let mut outcome = self.inner.attempt(request.clone());
        for (retry, delay) in self.delays.clone().into_iter().enumerate() {
            if !outcome.is_retryable() {
                break;
            }
            tracing::debug!(
                retry = retry + 1,
                delay_ms = delay.as_millis() as u64,
                outcome = %outcome,
                "retrying after backoff"
            );
            (self.halt)(delay);
            outcome = self.inner.attempt(request.clone());
        }
        outcome
    }
}
