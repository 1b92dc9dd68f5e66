//! hardline-core: a resilient HTTP client transport.
//!
//! Callers submit an immutable [`request::Request`] through the
//! [`transport::Transport`] contract and get back an
//! [`outcome::Outcome`]: success and every category of failure are
//! explicit values, never exceptions. Around the base transports compose
//! three stateful decorators: a per-host circuit breaker, exponential
//! backoff retry, and a redirect follower. The concurrent engine
//! multiplexes many exchanges over a bounded number of connections from a
//! single thread via curl's multi interface.

pub mod config;
pub mod logging;

pub mod backoff;
pub mod breaker;
pub mod engine;
pub mod error;
pub mod headers;
pub mod outcome;
pub mod redirect;
pub mod request;
pub mod response;
pub mod sink;
pub mod stack;
pub mod transport;

#[cfg(test)]
mod testutil;
