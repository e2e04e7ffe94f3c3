use std::sync::Arc;

use bytes::BytesMut;

use crate::http::parser::{DecodeError, decode_request};
use crate::http::service::Service;
use crate::http::writer::{WriteError, serialize_response};

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Outcome of one successful dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatched {
    /// False when the connection must close after this response.
    pub keep_alive: bool,
}

/// Bridges framed request bytes to a [`Service`] and serializes the answer.
pub struct Dispatcher<S> {
    service: Arc<S>,
}

impl<S> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<S: Service> Dispatcher<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// Decodes `framed`, serves it and appends the serialized response to
    /// `out`.
    ///
    /// When `closing` is set, or the client asked for it, the response
    /// carries `Connection: close` and `keep_alive` comes back false.
    pub fn dispatch(
        &self,
        framed: &[u8],
        closing: bool,
        out: &mut BytesMut,
    ) -> Result<Dispatched, DispatchError> {
        let request = decode_request(framed)?;
        let keep_alive = !closing && request.keep_alive();

        let mut response = self.service.serve(&request);
        if !keep_alive {
            response.set_header("Connection", "close");
        }

        serialize_response(&response, out)?;

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status = response.status.as_u16(),
            keep_alive,
            "Request served"
        );

        Ok(Dispatched { keep_alive })
    }
}
