use std::io;

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("invalid response header {name:?}")]
    InvalidHeader { name: String },
}

/// Serializes `resp` onto the end of `buf`.
///
/// Headers are written sorted by name. Nothing is appended if a header
/// name or value would break the message framing.
pub fn serialize_response(resp: &Response, buf: &mut BytesMut) -> Result<(), WriteError> {
    let mut headers: Vec<_> = resp.headers.iter().collect();
    headers.sort_by(|a, b| a.0.cmp(b.0));

    for (k, v) in &headers {
        if !valid_name(k) || !valid_value(v) {
            return Err(WriteError::InvalidHeader {
                name: k.to_string(),
            });
        }
    }

    // Status line
    buf.put_slice(
        format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            resp.status.as_u16(),
            resp.status.reason_phrase()
        )
        .as_bytes(),
    );

    for (k, v) in headers {
        buf.put_slice(k.as_bytes());
        buf.put_slice(b": ");
        buf.put_slice(v.as_bytes());
        buf.put_slice(b"\r\n");
    }

    buf.put_slice(b"\r\n");
    buf.put_slice(&resp.body);

    Ok(())
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_graphic() && b != b':')
}

fn valid_value(value: &str) -> bool {
    !value.bytes().any(|b| b == b'\r' || b == b'\n' || b == 0)
}

/// Flushes serialized response bytes to a connection, tracking how much was
/// written so far.
pub struct ResponseWriter {
    buffer: Bytes,
    written: usize,
}

impl ResponseWriter {
    pub fn new(buffer: Bytes) -> Self {
        Self { buffer, written: 0 }
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "connection closed while writing",
                ));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
