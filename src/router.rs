//! Radix-tree request router with an explicit middleware chain.
//!
//! One tree per HTTP method, O(path-length) lookup. Middleware registered
//! with [`Router::with`] wraps every request, including the 404 and 405
//! fallbacks.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::header::ALLOW;
use http::{HeaderValue, Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::middleware::{self, BoxedMiddleware, Middleware};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Every registration returns `self` so calls chain.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    middleware: Vec<BoxedMiddleware>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), middleware: Vec::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route pattern or conflicts with an
    /// existing route.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PATCH, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    /// Appends `middleware` to the chain. Earlier registrations are outer
    /// layers: their `before` runs first and their `after` runs last.
    pub fn with(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Runs one request through the middleware chain and the matching route.
    ///
    /// The server calls this for every request; tests can call it directly.
    pub async fn call(&self, req: http::Request<Bytes>) -> Response {
        self.call_at(req, Instant::now()).await
    }

    /// Like [`call`](Router::call), timing the request from `received_at`.
    pub(crate) async fn call_at(&self, req: http::Request<Bytes>, received_at: Instant) -> Response {
        let mut req = Request::from_http_at(req, received_at);
        let endpoint = match self.lookup(req.method(), req.path()) {
            Lookup::Found(handler, params) => {
                req.set_params(params);
                handler
            }
            Lookup::MethodNotAllowed(allow) => fallback(method_not_allowed(&allow)),
            Lookup::NotFound => fallback(Response::status(StatusCode::NOT_FOUND)),
        };
        middleware::run(&self.middleware, req, |req| endpoint.call(req)).await
    }

    fn lookup(&self, method: &Method, path: &str) -> Lookup {
        if let Some(matched) = self.routes.get(method).and_then(|tree| tree.at(path).ok()) {
            let params = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            return Lookup::Found(Arc::clone(matched.value), params);
        }

        let mut allow: Vec<&str> = self.routes.iter()
            .filter(|(m, tree)| *m != method && tree.at(path).is_ok())
            .map(|(m, _)| m.as_str())
            .collect();
        if allow.is_empty() {
            return Lookup::NotFound;
        }
        allow.sort_unstable();
        Lookup::MethodNotAllowed(allow.join(", "))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

enum Lookup {
    Found(BoxedHandler, HashMap<String, String>),
    MethodNotAllowed(String),
    NotFound,
}

fn method_not_allowed(allow: &str) -> Response {
    let mut res = Response::status(StatusCode::METHOD_NOT_ALLOWED);
    if let Ok(value) = HeaderValue::from_str(allow) {
        res.headers_mut().insert(ALLOW, value);
    }
    res
}

/// Wraps a fixed response as a handler so fallbacks run through the chain too.
fn fallback(res: Response) -> BoxedHandler {
    struct Fixed(Response);

    impl crate::handler::ErasedHandler for Fixed {
        fn call(&self, _req: Request) -> BoxFuture {
            let res = self.0.clone();
            Box::pin(async move { res })
        }
    }

    Arc::new(Fixed(res))
}
