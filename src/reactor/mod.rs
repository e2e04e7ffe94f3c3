//! Event-loop side of the server.
//!
//! - **`event`**: the callback capability a multiplexer drives
//!   ([`EventHandler`]) and the values passed through it
//! - **`engine`**: [`HttpEngine`], the HTTP implementation of those callbacks
//! - **`shutdown`**: the process-wide [`Shutdown`] flag every callback polls
//!
//! # Connection lifecycle
//!
//! ```text
//!   on_open ──► on_readable* ──► on_closed
//!                  │
//!                  ├─ Incomplete → keep buffering
//!                  ├─ Complete   → dispatch, reset (or Close on shutdown)
//!                  └─ Malformed  → Close
//! ```
//!
//! `on_init` fires once before any loop starts and `on_tick` fires about
//! once a second on loop 0. Any callback may return `Action::Shutdown`.

pub mod engine;
pub mod event;
pub mod shutdown;

pub use engine::HttpEngine;
pub use event::{Action, ConnId, ConnInfo, EventHandler, Reaction, ServerInfo};
pub use shutdown::Shutdown;
