use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;

/// Opaque connection handle handed out by the multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(pub u64);

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a callback sees of a connection.
#[derive(Debug, Clone)]
pub struct ConnInfo {
    pub id: ConnId,
    pub local_addr: Option<SocketAddr>,
    pub peer_addr: Option<SocketAddr>,
}

impl ConnInfo {
    pub fn new(id: ConnId) -> Self {
        Self {
            id,
            local_addr: None,
            peer_addr: None,
        }
    }
}

/// Passed to [`EventHandler::on_init`] once the listener is bound.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub loops: usize,
    pub addr: SocketAddr,
}

/// What the multiplexer should do after a callback returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    None,
    /// Flush pending output, then close this connection.
    Close,
    /// Stop accepting, close every connection and stop the loops.
    Shutdown,
}

/// Result of a readable callback: bytes to write back plus the follow-up
/// action. Output is always written before the action takes effect.
#[derive(Debug, Clone, Default)]
pub struct Reaction {
    pub out: Bytes,
    pub action: Action,
}

impl Reaction {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn close() -> Self {
        Self {
            out: Bytes::new(),
            action: Action::Close,
        }
    }
}

/// Connection event callbacks driven by a multiplexer.
///
/// Each event loop owns its own handler and calls it from a single thread,
/// one callback at a time. Callbacks run to completion and must not block.
pub trait EventHandler {
    /// Fired once per process after the listener is bound.
    fn on_init(&mut self, server: &ServerInfo) -> Action;

    fn on_open(&mut self, conn: &ConnInfo) -> Action;

    /// Fired for every chunk read, in arrival order.
    fn on_readable(&mut self, conn: &ConnInfo, input: &[u8]) -> Reaction;

    /// Fired exactly once per opened connection. `err` is the I/O error
    /// that caused the close, if any.
    fn on_closed(&mut self, conn: &ConnInfo, err: Option<&io::Error>) -> Action;

    /// Periodic callback; returns the delay until the next tick.
    fn on_tick(&mut self) -> (Duration, Action);
}
