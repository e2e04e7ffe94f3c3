use crate::http::request::{Method, Request, Version};
use std::collections::HashMap;

/// Upper bound on headers accepted in one request.
pub const MAX_HEADERS: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid request syntax: {0}")]
    Parse(#[from] httparse::Error),
    #[error("request head is incomplete")]
    Partial,
    #[error("unsupported method {0:?}")]
    UnsupportedMethod(String),
    #[error("unsupported HTTP version 1.{0}")]
    UnsupportedVersion(u8),
    #[error("header {0:?} is not valid UTF-8")]
    InvalidHeaderValue(String),
}

/// Decodes one framed request.
///
/// `buf` must be exactly the bytes the framer reported as complete; whatever
/// follows the head is taken as the body.
pub fn decode_request(buf: &[u8]) -> Result<Request, DecodeError> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut headers);

    let head_len = match req.parse(buf)? {
        httparse::Status::Complete(n) => n,
        httparse::Status::Partial => return Err(DecodeError::Partial),
    };

    // Complete parses always carry method, path and version.
    let method_str = req.method.ok_or(DecodeError::Partial)?;
    let method = Method::from_str(method_str)
        .ok_or_else(|| DecodeError::UnsupportedMethod(method_str.to_string()))?;
    let path = req.path.ok_or(DecodeError::Partial)?.to_string();
    let minor = req.version.ok_or(DecodeError::Partial)?;
    let version = Version::from_minor(minor).ok_or(DecodeError::UnsupportedVersion(minor))?;

    let mut parsed = HashMap::with_capacity(req.headers.len());
    for header in req.headers.iter() {
        let value = std::str::from_utf8(header.value)
            .map_err(|_| DecodeError::InvalidHeaderValue(header.name.to_string()))?;
        parsed.insert(header.name.to_string(), value.trim().to_string());
    }

    Ok(Request {
        method,
        path,
        version,
        headers: parsed,
        body: buf[head_len..].to_vec(),
    })
}
