//! Translate a `Request` into a configured curl Easy2 handle.
//!
//! Method, version, headers and body are mapped onto curl options; the
//! timeout pseudo-header is applied as the total transfer timeout and
//! stripped from the wire headers. Redirect following stays off; the
//! redirect decorator owns that behavior.

use std::time::Duration;

use curl::easy::{Easy2, HttpVersion, List};

use crate::error::TransportError;
use crate::request::{Body, Method, Request, Version, TIMEOUT_HEADER};

use super::handler::ExchangeHandler;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

fn setup(e: curl::Error) -> TransportError {
    TransportError::Setup(e.to_string())
}

/// Build a ready-to-add Easy2 handle for `request`.
pub(crate) fn build_handle(request: &Request) -> Result<Easy2<ExchangeHandler>, TransportError> {
    let upload = match request.body() {
        Body::Empty => Vec::new(),
        Body::Bytes(b) => b.clone(),
    };
    let has_body = !upload.is_empty();
    let body_len = upload.len() as u64;

    let mut easy = Easy2::new(ExchangeHandler::new(upload));
    easy.url(request.url().as_str()).map_err(setup)?;

    match request.method() {
        Method::Get => easy.get(true).map_err(setup)?,
        Method::Head => easy.nobody(true).map_err(setup)?,
        method => {
            if has_body {
                easy.upload(true).map_err(setup)?;
                easy.in_filesize(body_len).map_err(setup)?;
            }
            // upload(true) implies PUT; the explicit verb overrides it.
            easy.custom_request(method.as_str()).map_err(setup)?;
        }
    }

    let http_version = match request.version() {
        Version::Http10 => HttpVersion::V10,
        Version::Http11 => HttpVersion::V11,
        Version::Http2 => HttpVersion::V2,
    };
    easy.http_version(http_version).map_err(setup)?;

    easy.connect_timeout(CONNECT_TIMEOUT).map_err(setup)?;
    if let Some(timeout) = request.timeout() {
        easy.timeout(timeout).map_err(setup)?;
    }

    let wire_headers: Vec<(&str, &str)> = request
        .headers()
        .iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case(TIMEOUT_HEADER))
        .collect();
    if !wire_headers.is_empty() {
        let mut list = List::new();
        for (name, value) in wire_headers {
            list.append(&format!("{}: {}", name.trim(), value.trim()))
                .map_err(setup)?;
        }
        easy.http_headers(list).map_err(setup)?;
    }

    Ok(easy)
}
