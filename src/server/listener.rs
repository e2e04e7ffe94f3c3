//! Multi-loop TCP multiplexer.
//!
//! One accept thread hands sockets round-robin to N event-loop threads. Each
//! loop runs a current-thread tokio runtime and owns one [`EventHandler`];
//! connections never move between loops.

use std::cell::RefCell;
use std::io;
use std::net::SocketAddr;
use std::rc::Rc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::http::writer::ResponseWriter;
use crate::reactor::event::{Action, ConnId, ConnInfo, EventHandler, ServerInfo};

/// Pause after a failed accept, e.g. when out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(10);

/// A socket on its way from the accept thread to its loop.
struct Accepted {
    id: ConnId,
    stream: std::net::TcpStream,
    peer: SocketAddr,
}

/// Internal stop broadcast, raised once any callback asks for
/// [`Action::Shutdown`].
#[derive(Clone)]
struct Stop {
    tx: Arc<watch::Sender<bool>>,
}

impl Stop {
    fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    fn trigger(&self) {
        self.tx.send_replace(true);
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

async fn stopped(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

pub struct Server {
    listener: std::net::TcpListener,
    addr: SocketAddr,
    loops: usize,
    read_buffer_size: usize,
}

impl Server {
    pub fn bind(cfg: &ServerConfig) -> anyhow::Result<Self> {
        let listen = cfg.listen_addr()?;
        let listener = std::net::TcpListener::bind(&listen)
            .with_context(|| format!("failed to bind {listen}"))?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        Ok(Self {
            listener,
            addr,
            loops: cfg.loops.max(1),
            read_buffer_size: cfg.read_buffer_size.max(1),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Runs until a callback returns [`Action::Shutdown`], then drains.
    ///
    /// `factory` builds one handler per loop. Loop 0's handler also receives
    /// `on_init` and `on_tick`.
    pub fn run<H, F>(self, mut factory: F) -> anyhow::Result<()>
    where
        H: EventHandler + Send + 'static,
        F: FnMut(usize) -> H,
    {
        let mut handlers: Vec<H> = (0..self.loops).map(&mut factory).collect();

        let info = ServerInfo {
            loops: self.loops,
            addr: self.addr,
        };
        if handlers[0].on_init(&info) == Action::Shutdown {
            info!("Shutdown requested before start");
            return Ok(());
        }

        let stop = Stop::new();
        let mut senders = Vec::with_capacity(self.loops);
        let mut threads = Vec::with_capacity(self.loops);

        for (index, handler) in handlers.drain(..).enumerate() {
            let (tx, rx) = mpsc::unbounded_channel();
            senders.push(tx);

            let stop = stop.clone();
            let read_buffer_size = self.read_buffer_size;
            let thread = thread::Builder::new()
                .name(format!("spindle-loop-{index}"))
                .spawn(move || run_loop(index, handler, rx, stop, read_buffer_size))
                .context("failed to spawn event loop thread")?;
            threads.push(thread);
        }

        let accepted = accept_loop(self.listener, senders, stop.clone());
        if accepted.is_err() {
            stop.trigger();
        }

        for (index, thread) in threads.into_iter().enumerate() {
            match thread.join() {
                Ok(Ok(())) => debug!(index, "Event loop stopped"),
                Ok(Err(e)) => error!(index, error = %e, "Event loop failed"),
                Err(_) => error!(index, "Event loop panicked"),
            }
        }

        info!("Server stopped");
        accepted
    }
}

fn accept_loop(
    listener: std::net::TcpListener,
    senders: Vec<mpsc::UnboundedSender<Accepted>>,
    stop: Stop,
) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build accept runtime")?;

    rt.block_on(async move {
        let listener = TcpListener::from_std(listener)?;
        let mut stop_rx = stop.subscribe();
        let mut next_id = 0u64;

        loop {
            let (stream, peer) = tokio::select! {
                res = listener.accept() => match res {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(error = %e, "Failed to accept connection");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                        continue;
                    }
                },
                _ = stopped(&mut stop_rx) => break,
            };

            let id = ConnId(next_id);
            let index = (next_id % senders.len() as u64) as usize;
            next_id += 1;

            let stream = match stream.into_std() {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(conn = %id, error = %e, "Failed to detach accepted socket");
                    continue;
                }
            };

            if senders[index].send(Accepted { id, stream, peer }).is_err() {
                warn!(conn = %id, index, "Event loop is gone, dropping connection");
            }
        }

        Ok::<_, anyhow::Error>(())
    })
}

fn run_loop<H>(
    index: usize,
    handler: H,
    mut rx: mpsc::UnboundedReceiver<Accepted>,
    stop: Stop,
    read_buffer_size: usize,
) -> anyhow::Result<()>
where
    H: EventHandler + 'static,
{
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build event loop runtime")?;
    let local = tokio::task::LocalSet::new();
    let handler = Rc::new(RefCell::new(handler));

    local.block_on(&rt, async move {
        let mut stop_rx = stop.subscribe();
        let mut conns = JoinSet::new();

        if index == 0 {
            tokio::task::spawn_local(drive_ticks(Rc::clone(&handler), stop.clone()));
        }

        loop {
            tokio::select! {
                accepted = rx.recv() => match accepted {
                    Some(accepted) => {
                        conns.spawn_local(serve_connection(
                            Rc::clone(&handler),
                            accepted,
                            stop.clone(),
                            read_buffer_size,
                        ));
                    }
                    None => break,
                },
                Some(_) = conns.join_next(), if !conns.is_empty() => {}
                _ = stopped(&mut stop_rx) => break,
            }
        }

        // Connections notice the stop at their next read and close.
        while conns.join_next().await.is_some() {}
    });

    Ok(())
}

async fn drive_ticks<H: EventHandler>(handler: Rc<RefCell<H>>, stop: Stop) {
    let mut stop_rx = stop.subscribe();

    loop {
        let (delay, action) = handler.borrow_mut().on_tick();
        if action == Action::Shutdown {
            stop.trigger();
            return;
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = stopped(&mut stop_rx) => return,
        }
    }
}

async fn serve_connection<H: EventHandler>(
    handler: Rc<RefCell<H>>,
    accepted: Accepted,
    stop: Stop,
    read_buffer_size: usize,
) {
    let Accepted { id, stream, peer } = accepted;
    let mut stream = match TcpStream::from_std(stream) {
        Ok(stream) => stream,
        Err(e) => {
            error!(conn = %id, error = %e, "Failed to register connection");
            return;
        }
    };

    let conn = ConnInfo {
        id,
        local_addr: stream.local_addr().ok(),
        peer_addr: Some(peer),
    };

    let opened = handler.borrow_mut().on_open(&conn);
    let (err, action) = match opened {
        Action::None => drive(&handler, &conn, &mut stream, &stop, read_buffer_size).await,
        other => (None, other),
    };

    let _ = stream.shutdown().await;

    let closed = handler.borrow_mut().on_closed(&conn, err.as_ref());
    if action == Action::Shutdown || closed == Action::Shutdown {
        stop.trigger();
    }
}

/// Feeds reads into the handler until the connection ends.
async fn drive<H: EventHandler>(
    handler: &RefCell<H>,
    conn: &ConnInfo,
    stream: &mut TcpStream,
    stop: &Stop,
    read_buffer_size: usize,
) -> (Option<io::Error>, Action) {
    let mut stop_rx = stop.subscribe();
    let mut buf = vec![0u8; read_buffer_size];

    loop {
        let n = tokio::select! {
            res = stream.read(&mut buf) => match res {
                Ok(0) => return (None, Action::None),
                Ok(n) => n,
                Err(e) => return (Some(e), Action::None),
            },
            _ = stopped(&mut stop_rx) => return (None, Action::Close),
        };

        // The borrow ends with the callback; nothing is held across awaits.
        let reaction = handler.borrow_mut().on_readable(conn, &buf[..n]);

        if !reaction.out.is_empty() {
            let mut writer = ResponseWriter::new(reaction.out);
            if let Err(e) = writer.write_to_stream(stream).await {
                return (Some(e), Action::Close);
            }
        }

        match reaction.action {
            Action::None => {}
            action => return (None, action),
        }
    }
}
