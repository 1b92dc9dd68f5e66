//! Easy2 handler for one request/response exchange.
//!
//! Collects the raw response head (status line + header lines), streams the
//! inbound body into a spill sink, and serves the outgoing request body to
//! curl's read callback.

use std::str;

use crate::sink::BodySink;

/// Handler state for one exchange. Implements curl's `Handler` for `Easy2`.
pub struct ExchangeHandler {
    /// Raw head lines of the most recent response block. Cleared whenever a
    /// new `HTTP/` status line arrives, so interim 1xx/3xx blocks from the
    /// wire leave only the final head behind.
    head: Vec<String>,
    sink: BodySink,
    sink_failed: bool,
    upload: Vec<u8>,
    upload_pos: usize,
}

impl ExchangeHandler {
    pub fn new(upload: Vec<u8>) -> Self {
        ExchangeHandler {
            head: Vec::new(),
            sink: BodySink::new(),
            sink_failed: false,
            upload,
            upload_pos: 0,
        }
    }

    /// True when an inbound body write failed and the transfer was aborted.
    pub fn sink_failed(&self) -> bool {
        self.sink_failed
    }

    /// Take the collected head lines and body sink, leaving the handler
    /// empty. Called once after the transfer completes.
    pub fn take_parts(&mut self) -> (Vec<String>, BodySink) {
        (
            std::mem::take(&mut self.head),
            std::mem::take(&mut self.sink),
        )
    }
}

impl curl::easy::Handler for ExchangeHandler {
    fn header(&mut self, data: &[u8]) -> bool {
        if let Ok(s) = str::from_utf8(data) {
            let line = s.trim_end();
            if line.starts_with("HTTP/") {
                self.head.clear();
            }
            if !line.is_empty() {
                self.head.push(line.to_string());
            }
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, curl::easy::WriteError> {
        match self.sink.write(data) {
            Ok(()) => Ok(data.len()),
            Err(e) => {
                tracing::warn!(error = %e, "body sink write failed, aborting transfer");
                self.sink_failed = true;
                // Returning a short count makes curl abort with a write error.
                Ok(0)
            }
        }
    }

    fn read(&mut self, data: &mut [u8]) -> Result<usize, curl::easy::ReadError> {
        let remaining = &self.upload[self.upload_pos..];
        let n = remaining.len().min(data.len());
        data[..n].copy_from_slice(&remaining[..n]);
        self.upload_pos += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curl::easy::Handler;

    #[test]
    fn head_clears_on_new_status_line() {
        let mut h = ExchangeHandler::new(Vec::new());
        h.header(b"HTTP/1.1 301 Moved Permanently\r\n");
        h.header(b"Location: http://other/\r\n");
        assert_eq!(h.head.len(), 2);
        h.header(b"HTTP/1.1 200 OK\r\n");
        assert_eq!(h.head.len(), 1, "head cleared on new HTTP/ line");
        h.header(b"Content-Length: 4\r\n");
        h.header(b"\r\n");
        let (head, _) = h.take_parts();
        assert_eq!(head, vec!["HTTP/1.1 200 OK", "Content-Length: 4"]);
    }

    #[test]
    fn write_streams_into_sink() {
        let mut h = ExchangeHandler::new(Vec::new());
        assert_eq!(h.write(b"abcd").unwrap(), 4);
        assert_eq!(h.write(b"efgh").unwrap(), 4);
        let (_, sink) = h.take_parts();
        assert_eq!(sink.finish().unwrap().bytes().unwrap(), b"abcdefgh");
    }

    #[test]
    fn read_serves_upload_in_chunks() {
        let mut h = ExchangeHandler::new(b"0123456789".to_vec());
        let mut buf = [0u8; 4];
        assert_eq!(h.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"0123");
        assert_eq!(h.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"4567");
        assert_eq!(h.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"89");
        assert_eq!(h.read(&mut buf).unwrap(), 0);
    }
}
