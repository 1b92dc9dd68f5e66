//! Concurrent execution engine: many independent exchanges over at most
//! `max_concurrency` simultaneously open connections, multiplexed from one
//! thread by a curl `Multi` handle.
//!
//! Callers `schedule` requests without starting any I/O, then `resolve`
//! tokens for outcomes. Resolving any one token drives a full batch pass
//! over every still-unstarted attempt, so concurrency never degrades to
//! one-request-at-a-time no matter which token is resolved first.

mod build;
mod decode;
mod handler;
mod run;

pub(crate) use build::build_handle;
pub(crate) use decode::outcome_from_exchange;

use crate::outcome::Outcome;
use crate::request::Request;

/// Lifecycle of one scheduled attempt.
enum Slot {
    /// Registered, no I/O yet.
    Unstarted(Request),
    /// Handle currently owned by a running batch pass.
    Started,
    /// Caller gave up the token before the attempt started.
    Discarded,
    /// Cached terminal outcome; repeated resolves clone this.
    Finished(Outcome),
}

/// Token for one scheduled attempt. Owning it is what keeps the attempt
/// alive: `Engine::discard` consumes the token and lets the engine skip
/// the work on its next pass.
#[derive(Debug)]
pub struct AttemptToken {
    index: usize,
}

/// Single-threaded batch execution engine over curl's multi interface.
pub struct Engine {
    max_concurrency: Option<usize>,
    slots: Vec<Slot>,
}

impl Engine {
    /// `max_concurrency` bounds simultaneously open connections per batch;
    /// `None` means every registered attempt runs in one batch.
    pub fn new(max_concurrency: Option<usize>) -> Self {
        Engine {
            max_concurrency,
            slots: Vec::new(),
        }
    }

    /// Register an attempt. O(1), no I/O, never blocks.
    pub fn schedule(&mut self, request: Request) -> AttemptToken {
        let index = self.slots.len();
        self.slots.push(Slot::Unstarted(request));
        AttemptToken { index }
    }

    /// Give up an attempt. If it has not started yet, later batch passes
    /// skip it entirely; a finished outcome is simply dropped.
    pub fn discard(&mut self, token: AttemptToken) {
        if matches!(self.slots[token.index], Slot::Unstarted(_)) {
            self.slots[token.index] = Slot::Discarded;
        }
    }

    /// Drive every unstarted attempt to completion, then return the cached
    /// outcome for `token`. Idempotent: a second resolve returns the same
    /// cached value without touching the network.
    pub fn resolve(&mut self, token: &AttemptToken) -> Outcome {
        while self.has_unstarted() {
            self.run_batch();
        }
        match &self.slots[token.index] {
            Slot::Finished(outcome) => outcome.clone(),
            // A live token's slot is never Discarded (discard consumes the
            // token) and the loop above leaves no slot Unstarted/Started.
            _ => unreachable!("resolved token without a finished outcome"),
        }
    }

    fn has_unstarted(&self) -> bool {
        self.slots
            .iter()
            .any(|slot| matches!(slot, Slot::Unstarted(_)))
    }

    /// Number of attempts with a cached outcome.
    pub fn finished(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Finished(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn req() -> Request {
        Request::new(Url::parse("http://example.com/").unwrap())
    }

    #[test]
    fn schedule_registers_without_io() {
        let mut engine = Engine::new(Some(2));
        let a = engine.schedule(req());
        let b = engine.schedule(req());
        assert_eq!(a.index, 0);
        assert_eq!(b.index, 1);
        assert_eq!(engine.finished(), 0);
        assert!(engine.has_unstarted());
    }

    #[test]
    fn discard_skips_unstarted_attempts() {
        let mut engine = Engine::new(None);
        let a = engine.schedule(req());
        engine.discard(a);
        assert!(!engine.has_unstarted());
        // A batch pass over an empty eligible set is a no-op.
        engine.run_batch();
        assert_eq!(engine.finished(), 0);
    }
}
