use std::sync::Arc;

use anyhow::Context;
use spindle::{Config, Echo, HttpEngine, Server, Shutdown};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let server = Server::bind(&cfg.server)?;

    let shutdown = Shutdown::new();
    let service = Arc::new(Echo);
    let engine_shutdown = shutdown.clone();
    let mut running = tokio::task::spawn_blocking(move || {
        server.run(|_| HttpEngine::new(Arc::clone(&service), engine_shutdown.clone()))
    });

    tokio::select! {
        res = &mut running => {
            return res.context("server thread panicked")?;
        }

        _ = tokio::signal::ctrl_c() => {
            shutdown.signal();
        }
    }

    // Loops notice the flag on their next tick and drain.
    running.await.context("server thread panicked")?
}
