//! spindle - multi-loop reactor HTTP/1.1 server core
//!
//! A fixed pool of event loops serves many keep-alive connections. Requests
//! are framed incrementally from whatever bytes each read delivers and only
//! handed to the application once complete.

pub mod config;
pub mod http;
pub mod reactor;
pub mod server;

pub use config::Config;
pub use http::service::{Echo, Service};
pub use reactor::engine::HttpEngine;
pub use reactor::shutdown::Shutdown;
pub use server::listener::Server;
