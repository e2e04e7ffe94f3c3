use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use tracing::{debug, error, info, warn};

use crate::http::dispatch::Dispatcher;
use crate::http::framer::Frame;
use crate::http::service::Service;
use crate::http::session::ConnectionSession;
use crate::reactor::event::{Action, ConnId, ConnInfo, EventHandler, Reaction, ServerInfo};
use crate::reactor::shutdown::Shutdown;

/// Interval between ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// HTTP/1.1 connection handler for one event loop.
///
/// Owns the sessions of every connection assigned to its loop. Build one per
/// loop with [`HttpEngine::new`]; clones of the same `Arc<S>` and
/// [`Shutdown`] are shared between them.
pub struct HttpEngine<S> {
    dispatcher: Dispatcher<S>,
    shutdown: Shutdown,
    sessions: HashMap<ConnId, ConnectionSession>,
}

impl<S: Service> HttpEngine<S> {
    pub fn new(service: Arc<S>, shutdown: Shutdown) -> Self {
        Self {
            dispatcher: Dispatcher::new(service),
            shutdown,
            sessions: HashMap::new(),
        }
    }

    /// Number of connections currently tracked by this engine.
    pub fn open_connections(&self) -> usize {
        self.sessions.len()
    }

    pub fn session(&self, id: ConnId) -> Option<&ConnectionSession> {
        self.sessions.get(&id)
    }

    fn stop_action(&self) -> Action {
        if self.shutdown.is_signaled() {
            Action::Shutdown
        } else {
            Action::None
        }
    }
}

impl<S: Service> EventHandler for HttpEngine<S> {
    fn on_init(&mut self, server: &ServerInfo) -> Action {
        info!(
            loops = server.loops,
            addr = %server.addr,
            "spindle started"
        );
        self.stop_action()
    }

    fn on_open(&mut self, conn: &ConnInfo) -> Action {
        self.sessions
            .insert(conn.id, ConnectionSession::new(conn.id));

        if self.shutdown.is_signaled() {
            debug!(conn = %conn.id, "Refusing connection during shutdown");
            return Action::Close;
        }

        debug!(conn = %conn.id, peer = ?conn.peer_addr, "Connection opened");
        Action::None
    }

    fn on_readable(&mut self, conn: &ConnInfo, input: &[u8]) -> Reaction {
        if input.is_empty() {
            return Reaction::none();
        }

        let Some(session) = self.sessions.get_mut(&conn.id) else {
            warn!(conn = %conn.id, "Data for unknown connection");
            return Reaction::close();
        };
        if session.is_closing() {
            return Reaction::close();
        }

        session.begin(input);
        let mut out = BytesMut::new();

        // A single read may carry several pipelined requests.
        loop {
            let end = match session.frame() {
                Frame::Incomplete => {
                    return Reaction {
                        out: out.freeze(),
                        action: Action::None,
                    };
                }
                Frame::Malformed(e) => {
                    warn!(conn = %conn.id, error = %e, "Malformed request");
                    session.mark_closing();
                    return Reaction {
                        out: out.freeze(),
                        action: Action::Close,
                    };
                }
                Frame::Complete { end, .. } => end,
            };

            let closing = self.shutdown.is_signaled();
            let dispatched =
                self.dispatcher
                    .dispatch(&session.buffered()[..end], closing, &mut out);

            match dispatched {
                Err(e) => {
                    warn!(conn = %conn.id, error = %e, "Failed to dispatch request");
                    session.mark_closing();
                    return Reaction {
                        out: out.freeze(),
                        action: Action::Close,
                    };
                }
                Ok(d) if !d.keep_alive => {
                    session.mark_closing();
                    return Reaction {
                        out: out.freeze(),
                        action: Action::Close,
                    };
                }
                Ok(_) => {
                    session.end(end);
                    if session.buffered().is_empty() {
                        return Reaction {
                            out: out.freeze(),
                            action: Action::None,
                        };
                    }
                }
            }
        }
    }

    fn on_closed(&mut self, conn: &ConnInfo, err: Option<&io::Error>) -> Action {
        self.sessions.remove(&conn.id);

        match err {
            Some(e) => error!(
                conn = %conn.id,
                local = ?conn.local_addr,
                peer = ?conn.peer_addr,
                error = %e,
                "Connection closed with error"
            ),
            None => debug!(conn = %conn.id, "Connection closed"),
        }

        self.stop_action()
    }

    fn on_tick(&mut self) -> (Duration, Action) {
        (TICK_INTERVAL, self.stop_action())
    }
}
