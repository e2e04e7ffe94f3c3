use bytes::{Buf, BytesMut};

/// Accumulates the bytes of one in-flight request across readable callbacks.
///
/// `begin` appends a freshly read chunk and hands back everything received
/// so far; `end` tells the cursor how much of that view was consumed so only
/// the remainder is carried into the next callback.
#[derive(Debug, Default)]
pub struct ByteCursor {
    buf: BytesMut,
}

impl ByteCursor {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    /// Appends `input` and returns the full accumulated view.
    pub fn begin(&mut self, input: &[u8]) -> &[u8] {
        self.buf.extend_from_slice(input);
        &self.buf
    }

    /// Keeps `buf[consumed..]` as the stored remainder.
    ///
    /// `end(0)` keeps everything (request still incomplete), `end(len)`
    /// empties the cursor.
    pub fn end(&mut self, consumed: usize) {
        if consumed >= self.buf.len() {
            self.buf.clear();
        } else {
            self.buf.advance(consumed);
        }
    }

    /// The bytes currently held, without appending anything.
    pub fn view(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn reset(&mut self) {
        self.buf.clear();
    }
}
