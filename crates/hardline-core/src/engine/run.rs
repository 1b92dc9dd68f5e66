//! Batch pass over the curl multi handle: add up to the concurrency cap of
//! unstarted attempts, drive perform/messages/wait until no transfer is
//! running, then decode each completion into a cached outcome.
//!
//! Handles and the multi context are owned by one pass and dropped before
//! it returns on every path.

use std::time::Duration;

use curl::multi::{Easy2Handle, Multi};

use crate::error::TransportError;
use crate::outcome::Outcome;
use crate::request::Request;

use super::build;
use super::decode;
use super::handler::ExchangeHandler;
use super::{Engine, Slot};

const WAIT_INTERVAL: Duration = Duration::from_millis(100);

struct Active {
    handle: Easy2Handle<ExchangeHandler>,
    slot: usize,
    request: Request,
    result: Option<Result<(), curl::Error>>,
}

impl Engine {
    /// Run one batch pass. Attempts whose handle cannot be built fail
    /// individually; siblings in the same batch are unaffected.
    pub(super) fn run_batch(&mut self) {
        let cap = self.max_concurrency.unwrap_or(usize::MAX).max(1);
        let batch: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| matches!(slot, Slot::Unstarted(_)))
            .map(|(i, _)| i)
            .take(cap)
            .collect();
        if batch.is_empty() {
            return;
        }
        tracing::debug!(attempts = batch.len(), "engine batch pass");

        let multi = Multi::new();
        let mut active: Vec<Active> = Vec::new();
        for index in batch {
            let request = match std::mem::replace(&mut self.slots[index], Slot::Started) {
                Slot::Unstarted(request) => request,
                other => {
                    self.slots[index] = other;
                    continue;
                }
            };
            let easy = match build::build_handle(&request) {
                Ok(easy) => easy,
                Err(reason) => {
                    tracing::debug!(url = %request.url(), error = %reason, "handle build failed");
                    self.slots[index] = Slot::Finished(Outcome::Failure { request, reason });
                    continue;
                }
            };
            match multi.add2(easy) {
                Ok(handle) => active.push(Active {
                    handle,
                    slot: index,
                    request,
                    result: None,
                }),
                Err(e) => {
                    self.slots[index] = Slot::Finished(Outcome::Failure {
                        request,
                        reason: TransportError::Setup(format!("multi add: {e}")),
                    });
                }
            }
        }

        // perform/messages/wait until no transfer is still running.
        let mut batch_error: Option<String> = None;
        loop {
            let running = match multi.perform() {
                Ok(n) => n,
                Err(e) => {
                    batch_error = Some(format!("multi perform: {e}"));
                    break;
                }
            };
            multi.messages(|msg| {
                for entry in active.iter_mut() {
                    if entry.result.is_none() {
                        if let Some(result) = msg.result_for2(&entry.handle) {
                            entry.result = Some(result);
                            break;
                        }
                    }
                }
            });
            if running == 0 {
                break;
            }
            if let Err(e) = multi.wait(&mut [], WAIT_INTERVAL) {
                batch_error = Some(format!("multi wait: {e}"));
                break;
            }
        }

        for entry in active {
            let Active {
                handle,
                slot,
                request,
                result,
            } = entry;
            let outcome = if let Some(err) = &batch_error {
                Outcome::Failure {
                    request,
                    reason: TransportError::Transfer(err.clone()),
                }
            } else {
                match (multi.remove2(handle), result) {
                    (Ok(mut easy), Some(result)) => {
                        let sink_failed = easy.get_ref().sink_failed();
                        let (head, sink) = easy.get_mut().take_parts();
                        decode::outcome_from_exchange(request, result, sink_failed, head, sink)
                    }
                    (Ok(_), None) => Outcome::Failure {
                        request,
                        reason: TransportError::Transfer(
                            "transfer ended without a completion status".to_string(),
                        ),
                    },
                    (Err(e), _) => Outcome::Failure {
                        request,
                        reason: TransportError::Transfer(format!("multi remove: {e}")),
                    },
                }
            };
            tracing::debug!(slot, outcome = %outcome, "attempt finished");
            self.slots[slot] = Slot::Finished(outcome);
        }
        // `multi` (and any handle left on the error path) is dropped here.
    }
}
