//! Standard decorator stack assembly.
//!
//! Composition order, outermost first: redirect follower, circuit breaker,
//! exponential backoff, engine-backed base. Backoff sits inside the breaker
//! so transient failures are retried first and the circuit only opens once
//! retries are exhausted; while a circuit is open, no retry sequence even
//! starts.

use std::time::Duration;

use crate::backoff::ExponentialBackoff;
use crate::breaker::CircuitBreaker;
use crate::config::HardlineConfig;
use crate::engine::Engine;
use crate::redirect::RedirectFollower;
use crate::transport::{EngineTransport, Transport};

/// Build the standard resilient transport for `cfg`.
pub fn build_transport(cfg: &HardlineConfig) -> Box<dyn Transport> {
    let base = EngineTransport::new(Engine::new(cfg.max_concurrency));
    let backoff = ExponentialBackoff::with_delays(
        base,
        cfg.backoff_delays_ms()
            .into_iter()
            .map(Duration::from_millis)
            .collect(),
    );
    let breaker = CircuitBreaker::new(backoff, Duration::from_secs(cfg.breaker_cooldown_secs));
    Box::new(RedirectFollower::with_max_hops(
        breaker,
        cfg.max_redirect_hops,
    ))
}

/// Same stack without the backoff layer: breaker over the engine base, for
/// callers that must not block between attempts.
pub fn build_transport_without_retry(cfg: &HardlineConfig) -> Box<dyn Transport> {
    let base = EngineTransport::new(Engine::new(cfg.max_concurrency));
    let breaker = CircuitBreaker::new(base, Duration::from_secs(cfg.breaker_cooldown_secs));
    Box::new(RedirectFollower::with_max_hops(
        breaker,
        cfg.max_redirect_hops,
    ))
}
