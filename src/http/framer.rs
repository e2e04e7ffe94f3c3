//! Request framing.
//!
//! Decides, from the bytes accumulated so far, whether a whole request has
//! arrived. Only the message boundary is checked here; the request grammar is
//! left to [`crate::http::parser`].

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";
const CRLF: &[u8] = b"\r\n";
const CONTENT_LENGTH: &[u8] = b"content-length:";
const TRANSFER_ENCODING: &[u8] = b"transfer-encoding:";

/// Result of evaluating an accumulated buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// More bytes are needed.
    Incomplete,
    /// `buf[..end]` is one full request; `buf[end..]` belongs to the next one.
    Complete { header_end: usize, end: usize },
    /// The connection must be closed.
    Malformed(FrameError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("request carries a body but no Content-Length")]
    BodyWithoutLength,
    #[error("Content-Length value is not a non-negative integer")]
    InvalidContentLength,
    #[error("conflicting Content-Length headers")]
    ConflictingContentLength,
    #[error("Transfer-Encoding is not supported")]
    TransferEncoding,
}

impl Frame {
    pub fn is_complete(&self) -> bool {
        matches!(self, Frame::Complete { .. })
    }
}

/// Evaluates `buf` without side effects.
pub fn evaluate(buf: &[u8]) -> Frame {
    let Some(terminator) = find(buf, HEADER_TERMINATOR) else {
        return Frame::Incomplete;
    };
    let header_end = terminator + HEADER_TERMINATOR.len();
    let headers = &buf[..header_end];

    if find_header_line(headers, TRANSFER_ENCODING, 0).is_some() {
        return Frame::Malformed(FrameError::TransferEncoding);
    }

    let length = match content_length(headers) {
        Ok(Some(length)) => length,
        Ok(None) => {
            // No declared body: anything past the terminator is a body we
            // cannot frame.
            return if header_end == buf.len() {
                Frame::Complete {
                    header_end,
                    end: header_end,
                }
            } else {
                Frame::Malformed(FrameError::BodyWithoutLength)
            };
        }
        Err(e) => return Frame::Malformed(e),
    };

    if length > 0 && header_end >= buf.len() {
        return Frame::Incomplete;
    }

    if buf.len() - header_end < length {
        return Frame::Incomplete;
    }

    Frame::Complete {
        header_end,
        end: header_end + length,
    }
}

/// Declared Content-Length of a header block, if any.
fn content_length(headers: &[u8]) -> Result<Option<usize>, FrameError> {
    let mut declared = None;
    let mut from = 0;

    while let Some(start) = find_header_line(headers, CONTENT_LENGTH, from) {
        let value_start = start + CONTENT_LENGTH.len();
        // `headers` ends in CRLFCRLF, so every header line is terminated.
        let line_end = find(&headers[value_start..], CRLF)
            .map_or(headers.len(), |i| value_start + i);

        let length = parse_length(strip_ows(&headers[value_start..line_end]))?;

        match declared {
            Some(previous) if previous != length => {
                return Err(FrameError::ConflictingContentLength);
            }
            _ => declared = Some(length),
        }
        from = line_end;
    }

    Ok(declared)
}

/// Drops at most one SP or HTAB in front of the value.
fn strip_ows(value: &[u8]) -> &[u8] {
    match value.split_first() {
        Some((b' ' | b'\t', rest)) => rest,
        _ => value,
    }
}

/// Strict decimal parse: digits only, no sign, no whitespace, no overflow.
fn parse_length(value: &[u8]) -> Result<usize, FrameError> {
    if value.is_empty() {
        return Err(FrameError::InvalidContentLength);
    }

    value.iter().try_fold(0usize, |acc, &b| {
        if !b.is_ascii_digit() {
            return Err(FrameError::InvalidContentLength);
        }
        acc.checked_mul(10)
            .and_then(|acc| acc.checked_add(usize::from(b - b'0')))
            .ok_or(FrameError::InvalidContentLength)
    })
}

/// Offset of the first header line at or after `from` whose name matches
/// `name` (lowercase, including the colon).
fn find_header_line(headers: &[u8], name: &[u8], from: usize) -> Option<usize> {
    let mut line_start = from;
    // Never match inside the request line.
    if line_start == 0 {
        line_start = find(headers, CRLF)? + CRLF.len();
    } else if !headers[..line_start].ends_with(CRLF) {
        line_start = line_start + find(&headers[line_start..], CRLF)? + CRLF.len();
    }

    while line_start < headers.len() {
        let rest = &headers[line_start..];
        if rest.len() >= name.len() && rest[..name.len()].eq_ignore_ascii_case(name) {
            return Some(line_start);
        }
        line_start += find(rest, CRLF)? + CRLF.len();
    }

    None
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|w| w == needle)
}
