//! The transport contract and the two base transports.
//!
//! `attempt(Request) -> Outcome` is the sole boundary: decorators wrap a
//! boxed inner transport and compose around this one method. No error ever
//! crosses it as a Rust `Err`; every failure is an `Outcome` value.

use crate::engine::{self, Engine};
use crate::outcome::Outcome;
use crate::request::Request;

/// One attempt at a request/response exchange.
pub trait Transport {
    fn attempt(&mut self, request: Request) -> Outcome;
}

impl Transport for Box<dyn Transport> {
    fn attempt(&mut self, request: Request) -> Outcome {
        (**self).attempt(request)
    }
}

/// Simple base transport: one blocking curl exchange per attempt, no
/// shared state between attempts.
#[derive(Debug, Default)]
pub struct CurlTransport;

impl CurlTransport {
    pub fn new() -> Self {
        CurlTransport
    }
}

impl Transport for CurlTransport {
    fn attempt(&mut self, request: Request) -> Outcome {
        let mut easy = match engine::build_handle(&request) {
            Ok(easy) => easy,
            Err(reason) => return Outcome::Failure { request, reason },
        };
        let result = easy.perform();
        let sink_failed = easy.get_ref().sink_failed();
        let (head, sink) = easy.get_mut().take_parts();
        engine::outcome_from_exchange(request, result, sink_failed, head, sink)
    }
}

/// Engine-backed base transport. Each attempt is scheduled and resolved
/// immediately, which also drives any attempts other callers scheduled on
/// the shared engine.
pub struct EngineTransport {
    engine: Engine,
}

impl EngineTransport {
    pub fn new(engine: Engine) -> Self {
        EngineTransport { engine }
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }
}

impl Transport for EngineTransport {
    fn attempt(&mut self, request: Request) -> Outcome {
        let token = self.engine.schedule(request);
        self.engine.resolve(&token)
    }
}
