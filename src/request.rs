//! Incoming HTTP request type.

use std::collections::HashMap;
use std::time::Instant;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

use crate::context::RequestContext;
use crate::query::Query;

// ── RequestHead ───────────────────────────────────────────────────────────────

/// Everything about a request except its body and route params.
///
/// Handlers take the [`Request`] by value, so `after` hooks see this snapshot
/// instead. It is taken once the `before` hooks have run, so the context
/// reflects what they wrote.
#[derive(Clone, Debug)]
pub struct RequestHead {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    context: RequestContext,
    received_at: Instant,
}

impl RequestHead {
    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn context(&self) -> &RequestContext { &self.context }

    /// When wicket started handling this request.
    pub fn received_at(&self) -> Instant { self.received_at }

    /// Path plus query, as the client sent it (`/search?q=rust`).
    pub fn path_and_query(&self) -> &str {
        self.uri.path_and_query().map_or_else(|| self.uri.path(), |pq| pq.as_str())
    }

    /// Header lookup. Names are case-insensitive; non-UTF-8 values read as `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

// ── Request ───────────────────────────────────────────────────────────────────

/// An incoming HTTP request with its body fully read.
///
/// Besides the wire data, a request carries two things built by wicket:
/// the parsed [`Query`] and a [`RequestContext`] that middleware fills in
/// before the handler runs.
pub struct Request {
    head: RequestHead,
    body: Bytes,
    params: HashMap<String, String>,
    query: Query,
}

impl Request {
    /// Wraps an `http::Request` whose body has already been collected.
    pub fn from_http(req: http::Request<Bytes>) -> Self {
        Self::from_http_at(req, Instant::now())
    }

    /// Like [`from_http`](Request::from_http), with the instant the request
    /// arrived, before its body was read.
    pub fn from_http_at(req: http::Request<Bytes>, received_at: Instant) -> Self {
        let (parts, body) = req.into_parts();
        let query = parts.uri.query().map(Query::parse).unwrap_or_default();
        let head = RequestHead {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            context: RequestContext::new(),
            received_at,
        };
        Self { head, body, params: HashMap::new(), query }
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    pub fn head(&self) -> &RequestHead { &self.head }
    pub fn method(&self) -> &Method { &self.head.method }
    pub fn uri(&self) -> &Uri { &self.head.uri }
    pub fn path(&self) -> &str { self.head.path() }
    pub fn path_and_query(&self) -> &str { self.head.path_and_query() }
    pub fn headers(&self) -> &HeaderMap { &self.head.headers }
    pub fn header(&self, name: &str) -> Option<&str> { self.head.header(name) }
    pub fn received_at(&self) -> Instant { self.head.received_at }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn query(&self) -> &Query { &self.query }
    pub fn context(&self) -> &RequestContext { &self.head.context }
    pub fn context_mut(&mut self) -> &mut RequestContext { &mut self.head.context }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Decodes an `application/x-www-form-urlencoded` body.
    pub fn form(&self) -> Query {
        Query::from_bytes(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(uri: &str) -> Request {
        Request::from_http(http::Request::get(uri).body(Bytes::new()).unwrap())
    }

    #[test]
    fn query_is_parsed_on_construction() {
        let req = get("/profile?username=bob");
        assert_eq!(req.path(), "/profile");
        assert_eq!(req.query().get("username"), Some("bob"));
        assert!(req.context().is_empty());
    }

    #[test]
    fn path_and_query_keeps_query() {
        assert_eq!(get("/admin").path_and_query(), "/admin");
        assert_eq!(get("/search?q=a%20b").path_and_query(), "/search?q=a%20b");
    }

    #[test]
    fn arrival_instant_is_kept() {
        let arrived = Instant::now();
        let req = Request::from_http_at(
            http::Request::get("/").body(Bytes::new()).unwrap(),
            arrived,
        );
        assert_eq!(req.received_at(), arrived);
        assert_eq!(req.head().received_at(), arrived);
    }

    #[test]
    fn head_snapshot_carries_context() {
        let mut req = get("/secure");
        req.context_mut().insert("username", "alice");
        let head = req.head().clone();
        assert_eq!(head.context().get("username"), Some("alice"));
        assert_eq!(*head.method(), Method::GET);
    }

    #[test]
    fn form_body_decodes() {
        let req = Request::from_http(
            http::Request::post("/login")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Bytes::from_static(b"username=alice&returnUrl=%2Fsecure"))
                .unwrap(),
        );
        let form = req.form();
        assert_eq!(form.get("username"), Some("alice"));
        assert_eq!(form.get("returnUrl"), Some("/secure"));
        assert_eq!(req.header("Content-Type"), Some("application/x-www-form-urlencoded"));
    }
}
