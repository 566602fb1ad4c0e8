//! Per-request access log.

use tracing::info;

use crate::middleware::Middleware;
use crate::request::RequestHead;
use crate::response::Response;

/// Emits one `INFO` event per request with method, path, final status and
/// latency. Latency counts from when the server received the request head,
/// so it includes reading the body. Register it first so its `after` hook
/// sees the response every other middleware produced.
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl Middleware for Trace {
    fn after(&self, req: &RequestHead, res: Response) -> Response {
        let latency = req.received_at().elapsed();
        info!(
            method = %req.method(),
            path = req.path(),
            status = res.status_code().as_u16(),
            latency_ms = latency.as_secs_f64() * 1000.0,
            "request",
        );
        res
    }
}
