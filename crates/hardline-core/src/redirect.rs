//! Redirect-following decorator.
//!
//! Follows `Redirection` outcomes up to a hop limit. 303 downgrades the
//! re-issue to a bodiless GET; 301/302/307/308 are followed with the
//! original method and body only when that method is GET or HEAD, since
//! RFC 2616 §10.3.2 forbids auto-redirecting unsafe methods. Everything else,
//! including a missing Location header, passes through unchanged.

use crate::outcome::Outcome;
use crate::request::{Body, Method, Request};
use crate::transport::Transport;

pub const DEFAULT_MAX_HOPS: usize = 5;

/// Redirect decorator with a bounded hop count.
pub struct RedirectFollower<T> {
    inner: T,
    max_hops: usize,
}

impl<T: Transport> RedirectFollower<T> {
    pub fn new(inner: T) -> Self {
        Self::with_max_hops(inner, DEFAULT_MAX_HOPS)
    }

    pub fn with_max_hops(inner: T, max_hops: usize) -> Self {
        RedirectFollower { inner, max_hops }
    }
}

/// Next request to issue for a redirectable outcome, or `None` when the
/// outcome must be returned unchanged.
fn next_request(outcome: &Outcome) -> Option<Request> {
    let (request, response) = match outcome {
        Outcome::Redirection { request, response } => (request, response),
        _ => return None,
    };
    let location = response.header("location")?;
    // Relative targets inherit scheme/authority from the redirecting
    // request; an unresolvable Location is treated as non-redirectable.
    let target = request.url().join(location).ok()?;
    match response.status() {
        303 => Some(
            request
                .clone()
                .with_url(target)
                .with_method(Method::Get)
                .with_body(Body::Empty),
        ),
        301 | 302 | 307 | 308 if request.method().is_safe() => {
            Some(request.clone().with_url(target))
        }
        _ => None,
    }
}

impl<T: Transport> Transport for RedirectFollower<T> {
    fn attempt(&mut self, request: Request) -> Outcome {
        let mut outcome = self.inner.attempt(request);
        for hop in 0..self.max_hops {
            let next = match next_request(&outcome) {
                Some(next) => next,
                None => break,
            };
            tracing::debug!(hop = hop + 1, url = %next.url(), "following redirect");
            outcome = self.inner.attempt(next);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{outcome_with_status, redirect_outcome, Scripted};
    use url::Url;

    fn req(url: &str) -> Request {
        Request::new(Url::parse(url).unwrap())
    }

    #[test]
    fn follows_relative_location_against_original_authority() {
        let original = req("http://a.test/old");
        let inner = Scripted::new(vec![
            redirect_outcome(original.clone(), 301, Some("/new")),
            outcome_with_status(200),
        ]);
        let seen = inner.seen();
        let mut follower = RedirectFollower::new(inner);

        let outcome = follower.attempt(original);
        assert!(outcome.is_success());
        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].url().as_str(), "http://a.test/new");
        assert_eq!(seen[1].method(), Method::Get);
    }

    #[test]
    fn resolves_dot_segments_against_original_path() {
        let original = req("http://a.test/dir/page");
        let inner = Scripted::new(vec![
            redirect_outcome(original.clone(), 302, Some("../other")),
            outcome_with_status(200),
        ]);
        let seen = inner.seen();
        let mut follower = RedirectFollower::new(inner);
        follower.attempt(original);
        assert_eq!(seen.borrow()[1].url().as_str(), "http://a.test/other");
    }

    #[test]
    fn see_other_downgrades_to_bodiless_get() {
        let original = req("http://a.test/form")
            .with_method(Method::Post)
            .with_header("X-Trace", "abc")
            .with_body(Body::Bytes(b"payload".to_vec()));
        let inner = Scripted::new(vec![
            redirect_outcome(original.clone(), 303, Some("http://a.test/result")),
            outcome_with_status(200),
        ]);
        let seen = inner.seen();
        let mut follower = RedirectFollower::new(inner);

        follower.attempt(original);
        let seen = seen.borrow();
        let next = &seen[1];
        assert_eq!(next.method(), Method::Get);
        assert!(next.body().is_empty());
        assert_eq!(next.url().as_str(), "http://a.test/result");
        // Original headers are kept.
        assert_eq!(next.headers().get("x-trace"), Some("abc"));
    }

    #[test]
    fn unsafe_method_is_not_auto_redirected() {
        for status in [301u16, 302, 307, 308] {
            let original = req("http://a.test/submit").with_method(Method::Post);
            let inner = Scripted::new(vec![redirect_outcome(
                original.clone(),
                status,
                Some("/elsewhere"),
            )]);
            let calls = inner.calls();
            let mut follower = RedirectFollower::new(inner);

            let outcome = follower.attempt(original);
            assert!(
                matches!(outcome, Outcome::Redirection { .. }),
                "status {status} with POST must return the redirection unchanged"
            );
            assert_eq!(calls.get(), 1);
        }
    }

    #[test]
    fn head_is_followed_with_method_kept() {
        let original = req("http://a.test/res").with_method(Method::Head);
        let inner = Scripted::new(vec![
            redirect_outcome(original.clone(), 308, Some("/moved")),
            outcome_with_status(200),
        ]);
        let seen = inner.seen();
        let mut follower = RedirectFollower::new(inner);
        follower.attempt(original);
        assert_eq!(seen.borrow()[1].method(), Method::Head);
    }

    #[test]
    fn missing_location_returns_outcome_unchanged() {
        let original = req("http://a.test/");
        let inner = Scripted::new(vec![redirect_outcome(original.clone(), 301, None)]);
        let calls = inner.calls();
        let mut follower = RedirectFollower::new(inner);
        let outcome = follower.attempt(original);
        assert!(matches!(outcome, Outcome::Redirection { .. }));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn other_3xx_statuses_are_not_followed() {
        let original = req("http://a.test/");
        let inner = Scripted::new(vec![redirect_outcome(
            original.clone(),
            304,
            Some("/ignored"),
        )]);
        let calls = inner.calls();
        let mut follower = RedirectFollower::new(inner);
        let outcome = follower.attempt(original);
        assert!(matches!(outcome, Outcome::Redirection { .. }));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn hop_limit_returns_last_redirection() {
        let original = req("http://a.test/loop");
        let inner = Scripted::repeating(redirect_outcome(original.clone(), 301, Some("/loop")));
        let calls = inner.calls();
        let mut follower = RedirectFollower::with_max_hops(inner, 5);

        let outcome = follower.attempt(original);
        assert!(matches!(outcome, Outcome::Redirection { .. }));
        // Initial attempt plus exactly max_hops re-issues, never one more.
        assert_eq!(calls.get(), 6);
    }

    #[test]
    fn non_redirection_outcomes_pass_through() {
        let inner = Scripted::new(vec![outcome_with_status(404)]);
        let calls = inner.calls();
        let mut follower = RedirectFollower::new(inner);
        let outcome = follower.attempt(req("http://a.test/"));
        assert!(matches!(outcome, Outcome::ClientError { .. }));
        assert_eq!(calls.get(), 1);
    }
}
