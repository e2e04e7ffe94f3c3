//! HTTP/1.1 request handling.
//!
//! # Architecture
//!
//! - **`cursor`**: per-connection byte accumulation across reads
//! - **`framer`**: decides whether the accumulated bytes hold a whole request
//! - **`session`**: one connection's cursor plus its framing state
//! - **`parser`**: decodes a framed request (via `httparse`)
//! - **`request`** / **`response`**: the request and response models
//! - **`writer`**: response serialization and flushing
//! - **`service`**: the application handler trait
//! - **`dispatch`**: decode → serve → serialize
//!
//! # Session State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │    Empty    │ ← Nothing buffered
//!        └──────┬──────┘
//!               │ bytes arrive
//!               ▼
//!        ┌──────────────────┐
//!        │   Accumulating   │ ← Framer says Incomplete
//!        └──────┬───────────┘
//!               │ Framer says Complete
//!               ▼
//!        ┌──────────────────┐
//!        │      Ready       │ ← Dispatch
//!        └──────┬───────────┘
//!               │ response emitted
//!               ├─ Keep-Alive → Empty (or Accumulating if pipelined)
//!               └─ Close / Malformed → Closing
//! ```

pub mod cursor;
pub mod dispatch;
pub mod framer;
pub mod parser;
pub mod request;
pub mod response;
pub mod service;
pub mod session;
pub mod writer;
