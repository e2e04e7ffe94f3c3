//! TCP front end driving the reactor callbacks.

pub mod listener;

pub use listener::Server;
