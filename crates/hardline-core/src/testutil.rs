//! Scripted transports and outcome builders shared by decorator tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use url::Url;

use crate::error::TransportError;
use crate::headers::Headers;
use crate::outcome::Outcome;
use crate::request::{Request, Version};
use crate::response::Response;
use crate::sink::BodyStream;
use crate::transport::Transport;

enum Script {
    Sequence(VecDeque<Outcome>),
    Repeat(Outcome),
}

/// Fake transport that replays scripted outcomes and records every request
/// it was asked to attempt.
pub struct Scripted {
    script: Script,
    calls: Rc<Cell<usize>>,
    seen: Rc<RefCell<Vec<Request>>>,
}

impl Scripted {
    /// Replay `outcomes` in order; panics if attempted after exhaustion.
    pub fn new(outcomes: Vec<Outcome>) -> Self {
        Scripted {
            script: Script::Sequence(outcomes.into()),
            calls: Rc::new(Cell::new(0)),
            seen: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Return a clone of the same outcome on every attempt.
    pub fn repeating(outcome: Outcome) -> Self {
        Scripted {
            script: Script::Repeat(outcome),
            calls: Rc::new(Cell::new(0)),
            seen: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.calls)
    }

    pub fn seen(&self) -> Rc<RefCell<Vec<Request>>> {
        Rc::clone(&self.seen)
    }
}

impl Transport for Scripted {
    fn attempt(&mut self, request: Request) -> Outcome {
        self.calls.set(self.calls.get() + 1);
        self.seen.borrow_mut().push(request);
        match &mut self.script {
            Script::Sequence(queue) => queue.pop_front().expect("scripted transport exhausted"),
            Script::Repeat(outcome) => outcome.clone(),
        }
    }
}

pub fn dummy_request() -> Request {
    Request::new(Url::parse("http://scripted.test/").unwrap())
}

pub fn response_with_status(status: u16) -> Response {
    Response::new(status, Version::Http11, Headers::new(), BodyStream::empty())
}

/// Outcome classified from a plain response with the given status.
pub fn outcome_with_status(status: u16) -> Outcome {
    Outcome::of(dummy_request(), response_with_status(status))
}

/// ConnectionFailed outcome as a connect-refused peer would produce.
pub fn refused_outcome() -> Outcome {
    Outcome::ConnectionFailed {
        request: dummy_request(),
        reason: TransportError::Connect("connection refused".to_string()),
    }
}

/// Redirection outcome for `request` with an optional Location header.
pub fn redirect_outcome(request: Request, status: u16, location: Option<&str>) -> Outcome {
    let mut headers = Headers::new();
    if let Some(location) = location {
        headers.append("Location", location);
    }
    let response = Response::new(status, Version::Http11, headers, BodyStream::empty());
    Outcome::of(request, response)
}
