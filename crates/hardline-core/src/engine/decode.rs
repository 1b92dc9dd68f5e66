//! Decode a completed exchange into an `Outcome`.
//!
//! The handler accumulates raw head lines and body bytes during the
//! transfer; this module parses them into a `Response` and classifies the
//! result, or maps curl/parse failures onto the error variants.

use crate::error::TransportError;
use crate::headers::Headers;
use crate::outcome::Outcome;
use crate::request::{Request, Version};
use crate::response::Response;
use crate::sink::BodySink;

/// Parse collected head lines into (status, version, headers).
pub(crate) fn decode_head(lines: &[String]) -> Result<(u16, Version, Headers), TransportError> {
    let status_line = lines
        .first()
        .ok_or_else(|| TransportError::MalformedHead("empty response head".to_string()))?;

    let mut parts = status_line.split_whitespace();
    let version_token = parts.next().unwrap_or("");
    let version = Version::parse_token(version_token).ok_or_else(|| {
        TransportError::MalformedHead(format!("bad protocol version in {status_line:?}"))
    })?;
    let status: u16 = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            TransportError::MalformedHead(format!("bad status code in {status_line:?}"))
        })?;
    if !(100..=599).contains(&status) {
        return Err(TransportError::MalformedHead(format!(
            "status code {status} out of range"
        )));
    }

    let mut headers = Headers::new();
    for line in &lines[1..] {
        match line.split_once(':') {
            Some((name, value)) => headers.append(name.trim(), value.trim()),
            None => {
                return Err(TransportError::MalformedHead(format!(
                    "header line without colon: {line:?}"
                )))
            }
        }
    }
    Ok((status, version, headers))
}

/// Produce the final outcome for one exchange: curl completion result plus
/// the head lines and body sink taken from the handler.
pub(crate) fn outcome_from_exchange(
    request: Request,
    result: Result<(), curl::Error>,
    sink_failed: bool,
    head: Vec<String>,
    sink: BodySink,
) -> Outcome {
    if let Err(e) = result {
        if sink_failed {
            // The transfer aborted because our own sink rejected a write,
            // not because of the peer.
            return Outcome::Failure {
                request,
                reason: TransportError::Transfer("response body sink write failed".to_string()),
            };
        }
        let reason = TransportError::from_curl(&e);
        return if reason.is_connect() {
            Outcome::ConnectionFailed { request, reason }
        } else {
            Outcome::Failure { request, reason }
        };
    }

    let (status, version, headers) = match decode_head(&head) {
        Ok(parts) => parts,
        Err(reason) => return Outcome::MalformedResponse { request, reason },
    };

    let body = match sink.finish() {
        Ok(stream) => stream,
        Err(e) => {
            return Outcome::Failure {
                request,
                reason: TransportError::Transfer(format!("body sink finish failed: {e}")),
            }
        }
    };

    Outcome::of(request, Response::new(status, version, headers, body))
}
