use crate::http::cursor::ByteCursor;
use crate::http::framer::{self, Frame};
use crate::reactor::event::ConnId;

/// Where a connection is in its current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing buffered; waiting for the first byte of a request.
    Empty,
    /// Part of a request is buffered.
    Accumulating,
    /// A full request is buffered and being dispatched.
    Ready,
    /// The connection is about to close; further input is ignored.
    Closing,
}

/// Per-connection framing state.
///
/// Lives in exactly one event loop and is only touched from that
/// connection's callbacks, so it needs no synchronisation.
#[derive(Debug)]
pub struct ConnectionSession {
    id: ConnId,
    cursor: ByteCursor,
    state: SessionState,
}

impl ConnectionSession {
    pub fn new(id: ConnId) -> Self {
        Self {
            id,
            cursor: ByteCursor::new(),
            state: SessionState::Empty,
        }
    }

    pub fn id(&self) -> ConnId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Appends a chunk and returns everything buffered so far.
    pub fn begin(&mut self, input: &[u8]) -> &[u8] {
        if !input.is_empty() && self.state != SessionState::Closing {
            self.state = SessionState::Accumulating;
        }
        self.cursor.begin(input)
    }

    pub fn buffered(&self) -> &[u8] {
        self.cursor.view()
    }

    /// Frames the buffered bytes, moving to `Ready` on a complete request.
    pub fn frame(&mut self) -> Frame {
        let frame = framer::evaluate(self.cursor.view());
        if frame.is_complete() {
            self.state = SessionState::Ready;
        }
        frame
    }

    /// Drops the first `consumed` bytes once a request has been dispatched.
    ///
    /// Any pipelined remainder stays buffered as the start of the next
    /// request.
    pub fn end(&mut self, consumed: usize) {
        self.cursor.end(consumed);
        self.state = if self.cursor.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Accumulating
        };
    }

    pub fn reset(&mut self) {
        self.cursor.reset();
        self.state = SessionState::Empty;
    }

    pub fn mark_closing(&mut self) {
        self.state = SessionState::Closing;
    }

    pub fn is_closing(&self) -> bool {
        self.state == SessionState::Closing
    }
}
