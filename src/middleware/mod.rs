//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: tracing, identity extraction, and rewriting
//! responses on their way out.
//!
//! There is no global event registration. A [`Router`](crate::Router) holds an
//! explicit, ordered list of middleware and composes it around every route:
//!
//! ```text
//!   request ──▶ A.before ──▶ B.before ──▶ handler ─┐
//!                                                  │
//!  response ◀── A.after  ◀── B.after  ◀────────────┘
//! ```
//!
//! A `before` hook that returns `Some(response)` short-circuits: the handler
//! and the remaining `before` hooks are skipped, and only the `after` hooks of
//! middleware registered ahead of it see the early response.
//!
//! Hooks are synchronous. They run on whichever task hyper assigns to the
//! request and must not block.
//!
//! Built-in middleware:
//! - [`QueryIdentity`] copies `?username=` into the request context
//! - [`LoginRedirect`] turns `401 Unauthorized` into a login redirect
//! - [`RequestGate`] bundles the two
//! - [`Trace`] logs method, path, status and latency per request

mod gate;
mod trace;

use std::sync::Arc;

use crate::handler::BoxFuture;
use crate::request::{Request, RequestHead};
use crate::response::Response;

pub use gate::{LoginRedirect, QueryIdentity, RedirectStatus, RequestGate};
pub use trace::Trace;

/// A pair of hooks around the route handler. Both default to no-ops, so an
/// implementation overrides only the side it cares about.
pub trait Middleware: Send + Sync + 'static {
    /// Runs before routing dispatches to the handler. Return `Some` to answer
    /// the request without calling the handler.
    fn before(&self, req: &mut Request) -> Option<Response> {
        let _ = req;
        None
    }

    /// Runs after the handler. Returns the response to send, which may be
    /// `res` itself or a replacement.
    fn after(&self, req: &RequestHead, res: Response) -> Response {
        let _ = req;
        res
    }
}

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn before(&self, req: &mut Request) -> Option<Response> {
        (**self).before(req)
    }

    fn after(&self, req: &RequestHead, res: Response) -> Response {
        (**self).after(req, res)
    }
}

// ── Closure adapters ──────────────────────────────────────────────────────────

/// Middleware built from a `before` closure. See [`before`].
pub struct Before<F>(F);

/// Middleware built from an `after` closure. See [`after`].
pub struct After<F>(F);

/// Wraps a closure as a pre-request hook.
///
/// ```rust
/// use wicket::{Router, middleware};
///
/// let app = Router::new().with(middleware::before(|req| {
///     if let Some(tenant) = req.header("x-tenant").map(str::to_owned) {
///         req.context_mut().insert("tenant", tenant);
///     }
///     None
/// }));
/// ```
pub fn before<F>(f: F) -> Before<F>
where
    F: Fn(&mut Request) -> Option<Response> + Send + Sync + 'static,
{
    Before(f)
}

/// Wraps a closure as a post-response hook.
pub fn after<F>(f: F) -> After<F>
where
    F: Fn(&RequestHead, Response) -> Response + Send + Sync + 'static,
{
    After(f)
}

impl<F> Middleware for Before<F>
where
    F: Fn(&mut Request) -> Option<Response> + Send + Sync + 'static,
{
    fn before(&self, req: &mut Request) -> Option<Response> {
        (self.0)(req)
    }
}

impl<F> Middleware for After<F>
where
    F: Fn(&RequestHead, Response) -> Response + Send + Sync + 'static,
{
    fn after(&self, req: &RequestHead, res: Response) -> Response {
        (self.0)(req, res)
    }
}

// ── Chain execution ───────────────────────────────────────────────────────────

pub(crate) type BoxedMiddleware = Arc<dyn Middleware>;

/// Runs `req` through `layers` around `endpoint`.
pub(crate) async fn run<F>(layers: &[BoxedMiddleware], mut req: Request, endpoint: F) -> Response
where
    F: FnOnce(Request) -> BoxFuture,
{
    for (entered, layer) in layers.iter().enumerate() {
        if let Some(early) = layer.before(&mut req) {
            return unwind(&layers[..entered], req.head(), early);
        }
    }

    let head = req.head().clone();
    let res = endpoint(req).await;
    unwind(layers, &head, res)
}

fn unwind(layers: &[BoxedMiddleware], head: &RequestHead, res: Response) -> Response {
    layers.iter().rev().fold(res, |res, layer| layer.after(head, res))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bytes::Bytes;
    use http::StatusCode;

    use super::*;

    /// Records hook invocations into a shared log.
    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        stop: bool,
    }

    impl Middleware for Recorder {
        fn before(&self, _req: &mut Request) -> Option<Response> {
            self.log.lock().unwrap().push(format!("{}.before", self.name));
            self.stop.then(|| Response::status(StatusCode::FORBIDDEN))
        }

        fn after(&self, _req: &RequestHead, res: Response) -> Response {
            self.log.lock().unwrap().push(format!("{}.after", self.name));
            res
        }
    }

    fn layer(name: &'static str, log: &Arc<Mutex<Vec<String>>>, stop: bool) -> BoxedMiddleware {
        Arc::new(Recorder { name, log: Arc::clone(log), stop })
    }

    fn request(uri: &str) -> Request {
        Request::from_http(http::Request::get(uri).body(Bytes::new()).unwrap())
    }

    fn ok_endpoint(log: Arc<Mutex<Vec<String>>>) -> impl FnOnce(Request) -> BoxFuture {
        move |_req| -> BoxFuture {
            Box::pin(async move {
                log.lock().unwrap().push("handler".to_owned());
                Response::text("ok")
            })
        }
    }

    #[tokio::test]
    async fn hooks_wrap_handler_in_onion_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let layers = vec![layer("a", &log, false), layer("b", &log, false)];

        let res = run(&layers, request("/"), ok_endpoint(Arc::clone(&log))).await;

        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(
            *log.lock().unwrap(),
            ["a.before", "b.before", "handler", "b.after", "a.after"]
        );
    }

    #[tokio::test]
    async fn early_response_skips_handler_and_inner_layers() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let layers = vec![
            layer("a", &log, false),
            layer("b", &log, true),
            layer("c", &log, false),
        ];

        let res = run(&layers, request("/"), ok_endpoint(Arc::clone(&log))).await;

        assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(*log.lock().unwrap(), ["a.before", "b.before", "a.after"]);
    }

    #[tokio::test]
    async fn closure_adapters_see_context() {
        let layers: Vec<BoxedMiddleware> = vec![
            Arc::new(before(|req: &mut Request| {
                req.context_mut().insert("seen", "yes");
                None
            })) as BoxedMiddleware,
            Arc::new(after(|head: &RequestHead, _res: Response| {
                let seen = head.context().get("seen").unwrap_or("no").to_owned();
                Response::text(seen)
            })) as BoxedMiddleware,
        ];

        let res = run(&layers, request("/"), |_req| -> BoxFuture {
            Box::pin(async { Response::status(StatusCode::NO_CONTENT) })
        })
        .await;

        assert_eq!(res.body(), b"yes");
    }
}
