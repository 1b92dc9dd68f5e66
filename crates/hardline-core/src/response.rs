//! Immutable response model.
//!
//! A `Response` is only meaningful together with the `Request` that
//! produced it; the pair travels inside an `Outcome`.

use crate::headers::Headers;
use crate::request::Version;
use crate::sink::BodyStream;

/// Completed HTTP response: validated status, version, headers, and a
/// re-readable body stream.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    version: Version,
    headers: Headers,
    body: BodyStream,
}

impl Response {
    /// Build a response.
    ///
    /// # Panics
    ///
    /// Panics if `status` is outside 100–599. Wire decoding validates the
    /// parsed code before calling this, so a panic here is a programming
    /// error, not a remote-input error.
    pub fn new(status: u16, version: Version, headers: Headers, body: BodyStream) -> Self {
        assert!(
            (100..=599).contains(&status),
            "status code {status} outside 100-599"
        );
        Response {
            status,
            version,
            headers,
            body,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// First value of the named header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &BodyStream {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let mut headers = Headers::new();
        headers.append("Content-Type", "text/plain");
        let r = Response::new(200, Version::Http11, headers, BodyStream::empty());
        assert_eq!(r.status(), 200);
        assert_eq!(r.version(), Version::Http11);
        assert_eq!(r.header("content-type"), Some("text/plain"));
        assert!(r.body().is_empty());
    }

    #[test]
    #[should_panic(expected = "outside 100-599")]
    fn rejects_status_below_range() {
        let _ = Response::new(99, Version::Http11, Headers::new(), BodyStream::empty());
    }

    #[test]
    #[should_panic(expected = "outside 100-599")]
    fn rejects_status_above_range() {
        let _ = Response::new(600, Version::Http11, Headers::new(), BodyStream::empty());
    }
}
