//! Tagged outcome of one transport attempt.
//!
//! Exactly one variant describes any completed attempt. The five
//! response-carrying variants partition status codes 100–599 by hundreds
//! digit; the remaining three cover attempts where no usable response was
//! obtained. `Success` is the only non-error channel.

use std::fmt;

use crate::error::TransportError;
use crate::request::Request;
use crate::response::Response;

/// Result of one `Transport::attempt`.
///
/// Build the response-carrying variants through [`Outcome::of`] or the
/// range-checked constructors; a variant holding a response outside its
/// status range violates the classification invariant.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// 1xx response.
    Information { request: Request, response: Response },
    /// 2xx response.
    Success { request: Request, response: Response },
    /// 3xx response.
    Redirection { request: Request, response: Response },
    /// 4xx response.
    ClientError { request: Request, response: Response },
    /// 5xx response.
    ServerError { request: Request, response: Response },
    /// No response: the connection could not be established.
    ConnectionFailed {
        request: Request,
        reason: TransportError,
    },
    /// Bytes arrived but did not parse into a well-formed response head.
    MalformedResponse {
        request: Request,
        reason: TransportError,
    },
    /// Any other transport-level failure.
    Failure {
        request: Request,
        reason: TransportError,
    },
}

impl Outcome {
    /// Classify a completed response by status-code range. Total over
    /// 100–599; `Response` construction already rejects anything else.
    pub fn of(request: Request, response: Response) -> Outcome {
        match response.status() / 100 {
            1 => Outcome::information(request, response),
            2 => Outcome::success(request, response),
            3 => Outcome::redirection(request, response),
            4 => Outcome::client_error(request, response),
            5 => Outcome::server_error(request, response),
            // Response::new guarantees 100..=599.
            _ => unreachable!("response status out of validated range"),
        }
    }

    /// 1xx constructor. Panics if the response is outside 1xx.
    pub fn information(request: Request, response: Response) -> Outcome {
        assert_eq!(
            response.status() / 100,
            1,
            "information requires a 1xx status"
        );
        Outcome::Information { request, response }
    }

    /// 2xx constructor. Panics if the response is outside 2xx.
    pub fn success(request: Request, response: Response) -> Outcome {
        assert_eq!(response.status() / 100, 2, "success requires a 2xx status");
        Outcome::Success { request, response }
    }

    /// 3xx constructor. Panics if the response is outside 3xx.
    pub fn redirection(request: Request, response: Response) -> Outcome {
        assert_eq!(
            response.status() / 100,
            3,
            "redirection requires a 3xx status"
        );
        Outcome::Redirection { request, response }
    }

    /// 4xx constructor. Panics if the response is outside 4xx.
    pub fn client_error(request: Request, response: Response) -> Outcome {
        assert_eq!(
            response.status() / 100,
            4,
            "client_error requires a 4xx status"
        );
        Outcome::ClientError { request, response }
    }

    /// 5xx constructor. Panics if the response is outside 5xx. Used by the
    /// circuit breaker for its synthetic 503.
    pub fn server_error(request: Request, response: Response) -> Outcome {
        assert_eq!(
            response.status() / 100,
            5,
            "server_error requires a 5xx status"
        );
        Outcome::ServerError { request, response }
    }

    /// The request that produced this outcome.
    pub fn request(&self) -> &Request {
        match self {
            Outcome::Information { request, .. }
            | Outcome::Success { request, .. }
            | Outcome::Redirection { request, .. }
            | Outcome::ClientError { request, .. }
            | Outcome::ServerError { request, .. }
            | Outcome::ConnectionFailed { request, .. }
            | Outcome::MalformedResponse { request, .. }
            | Outcome::Failure { request, .. } => request,
        }
    }

    /// The response, when one was obtained.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Outcome::Information { response, .. }
            | Outcome::Success { response, .. }
            | Outcome::Redirection { response, .. }
            | Outcome::ClientError { response, .. }
            | Outcome::ServerError { response, .. } => Some(response),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// True for the variants the breaker and backoff act on.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Outcome::ServerError { .. } | Outcome::ConnectionFailed { .. }
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Information { response, .. } => {
                write!(f, "information ({})", response.status())
            }
            Outcome::Success { response, .. } => write!(f, "success ({})", response.status()),
            Outcome::Redirection { response, .. } => {
                write!(f, "redirection ({})", response.status())
            }
            Outcome::ClientError { response, .. } => {
                write!(f, "client error ({})", response.status())
            }
            Outcome::ServerError { response, .. } => {
                write!(f, "server error ({})", response.status())
            }
            Outcome::ConnectionFailed { reason, .. } => write!(f, "{reason}"),
            Outcome::MalformedResponse { reason, .. } => write!(f, "{reason}"),
            Outcome::Failure { reason, .. } => write!(f, "{reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::Headers;
    use crate::request::Version;
    use crate::sink::BodyStream;
    use url::Url;

    fn req() -> Request {
        Request::new(Url::parse("http://example.com/").unwrap())
    }

    fn resp(status: u16) -> Response {
        Response::new(status, Version::Http11, Headers::new(), BodyStream::empty())
    }

    #[test]
    fn dispatch_covers_every_hundreds_range() {
        for status in 100u16..=599 {
            let outcome = Outcome::of(req(), resp(status));
            let expected = status / 100;
            let actual = match outcome {
                Outcome::Information { .. } => 1,
                Outcome::Success { .. } => 2,
                Outcome::Redirection { .. } => 3,
                Outcome::ClientError { .. } => 4,
                Outcome::ServerError { .. } => 5,
                _ => 0,
            };
            assert_eq!(actual, expected, "status {status} misclassified");
        }
    }

    #[test]
    fn dispatch_keeps_request_and_response() {
        let outcome = Outcome::of(req(), resp(404));
        assert_eq!(outcome.request().url().as_str(), "http://example.com/");
        assert_eq!(outcome.response().map(|r| r.status()), Some(404));
        assert!(!outcome.is_success());
    }

    #[test]
    fn retryable_variants() {
        assert!(Outcome::of(req(), resp(500)).is_retryable());
        assert!(Outcome::ConnectionFailed {
            request: req(),
            reason: TransportError::Connect("refused".into()),
        }
        .is_retryable());
        assert!(!Outcome::of(req(), resp(404)).is_retryable());
        assert!(!Outcome::of(req(), resp(200)).is_retryable());
        assert!(!Outcome::Failure {
            request: req(),
            reason: TransportError::Transfer("reset".into()),
        }
        .is_retryable());
        assert!(!Outcome::MalformedResponse {
            request: req(),
            reason: TransportError::MalformedHead("junk".into()),
        }
        .is_retryable());
    }

    #[test]
    #[should_panic(expected = "requires a 2xx")]
    fn success_constructor_rejects_wrong_range() {
        let _ = Outcome::success(req(), resp(500));
    }

    #[test]
    #[should_panic(expected = "requires a 5xx")]
    fn server_error_constructor_rejects_wrong_range() {
        let _ = Outcome::server_error(req(), resp(200));
    }

    #[test]
    #[should_panic(expected = "requires a 1xx")]
    fn information_constructor_rejects_wrong_range() {
        let _ = Outcome::information(req(), resp(200));
    }

    #[test]
    #[should_panic(expected = "requires a 3xx")]
    fn redirection_constructor_rejects_wrong_range() {
        let _ = Outcome::redirection(req(), resp(404));
    }

    #[test]
    #[should_panic(expected = "requires a 4xx")]
    fn client_error_constructor_rejects_wrong_range() {
        let _ = Outcome::client_error(req(), resp(301));
    }

    #[test]
    fn checked_constructors_accept_their_own_range() {
        assert!(matches!(
            Outcome::information(req(), resp(101)),
            Outcome::Information { .. }
        ));
        assert!(matches!(
            Outcome::redirection(req(), resp(307)),
            Outcome::Redirection { .. }
        ));
        assert!(matches!(
            Outcome::client_error(req(), resp(429)),
            Outcome::ClientError { .. }
        ));
    }
}
