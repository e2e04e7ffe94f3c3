//! Application handlers.

use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};

/// The application capability the dispatcher hands framed requests to.
///
/// `serve` runs on an event-loop thread, so it must not block.
pub trait Service: Send + Sync + 'static {
    fn serve(&self, req: &Request) -> Response;
}

impl<F> Service for F
where
    F: Fn(&Request) -> Response + Send + Sync + 'static,
{
    fn serve(&self, req: &Request) -> Response {
        self(req)
    }
}

/// Answers every request with 200 and the request body echoed back.
#[derive(Debug, Clone, Copy, Default)]
pub struct Echo;

impl Service for Echo {
    fn serve(&self, req: &Request) -> Response {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", "application/octet-stream")
            .body(req.body.clone())
            .build()
    }
}
