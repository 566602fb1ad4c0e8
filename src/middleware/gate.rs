//! The request gate: query-string identity in, login redirect out.
//!
//! [`QueryIdentity`] is the pre-request half. It copies a `username` query
//! parameter into the request context so handlers can read it. It performs no
//! authentication whatsoever; it only marks where real identity extraction
//! would plug in.
//!
//! [`LoginRedirect`] is the post-response half. Any `401 Unauthorized` leaving
//! the handler is replaced by a redirect to the login page, carrying the
//! original URI in `returnUrl`.
//!
//! ```rust
//! use wicket::{Request, Response, Router, StatusCode};
//! use wicket::middleware::RequestGate;
//!
//! async fn secure(req: Request) -> Response {
//!     match req.context().get("username") {
//!         Some(user) => Response::text(format!("hello {user}")),
//!         None => Response::status(StatusCode::UNAUTHORIZED),
//!     }
//! }
//!
//! let app = Router::new()
//!     .get("/secure", secure)
//!     .with(RequestGate::default());
//! ```

use http::StatusCode;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use tracing::debug;

use crate::middleware::Middleware;
use crate::request::{Request, RequestHead};
use crate::response::Response;

/// Characters escaped in the `returnUrl` value: everything that would end or
/// split a query component. `/`, `?`, `:` and `@` are legal inside a query
/// and stay literal, so `/admin` round-trips as `returnUrl=/admin`.
const RETURN_URL: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'`');

const DEFAULT_USERNAME_PARAM: &str = "username";
const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_RETURN_PARAM: &str = "returnUrl";

// ── QueryIdentity ─────────────────────────────────────────────────────────────

/// Pre-request hook: `?username=alice` → `context["username"] = "alice"`.
///
/// A missing or empty parameter leaves the context untouched. Never
/// short-circuits.
#[derive(Clone, Debug)]
pub struct QueryIdentity {
    param: String,
    key: String,
}

impl QueryIdentity {
    pub fn new() -> Self {
        Self {
            param: DEFAULT_USERNAME_PARAM.to_owned(),
            key: DEFAULT_USERNAME_PARAM.to_owned(),
        }
    }

    /// Query parameter to read. Defaults to `username`.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.param = name.into();
        self
    }

    /// Context key to write. Defaults to `username`.
    pub fn context_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

impl Default for QueryIdentity {
    fn default() -> Self { Self::new() }
}

impl Middleware for QueryIdentity {
    fn before(&self, req: &mut Request) -> Option<Response> {
        if let Some(user) = req.query().get_non_empty(&self.param).map(str::to_owned) {
            debug!(path = req.path(), user = %user, "identity taken from query string");
            req.context_mut().insert(self.key.clone(), user);
        }
        None
    }
}

// ── LoginRedirect ─────────────────────────────────────────────────────────────

/// Status used for the login redirect.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RedirectStatus {
    /// `302 Found`.
    #[default]
    Found,
    /// `303 See Other`; forces the follow-up request to be a `GET`.
    SeeOther,
}

impl From<RedirectStatus> for StatusCode {
    fn from(s: RedirectStatus) -> StatusCode {
        match s {
            RedirectStatus::Found    => StatusCode::FOUND,
            RedirectStatus::SeeOther => StatusCode::SEE_OTHER,
        }
    }
}

/// Post-response hook: `401` → redirect to `/login?returnUrl=<original URI>`.
///
/// Every other status passes through untouched.
#[derive(Clone, Debug)]
pub struct LoginRedirect {
    login_path: String,
    return_param: String,
    status: RedirectStatus,
}

impl LoginRedirect {
    pub fn new() -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            return_param: DEFAULT_RETURN_PARAM.to_owned(),
            status: RedirectStatus::Found,
        }
    }

    /// Login page to redirect to. Defaults to `/login`. May carry its own
    /// query; `returnUrl` is then appended with `&`.
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Name of the parameter carrying the original URI. Defaults to `returnUrl`.
    pub fn return_param(mut self, name: impl Into<String>) -> Self {
        self.return_param = name.into();
        self
    }

    pub fn status(mut self, status: RedirectStatus) -> Self {
        self.status = status;
        self
    }

    /// The redirect target for a request to `original`.
    pub fn location_for(&self, original: &str) -> String {
        let sep = if self.login_path.contains('?') { '&' } else { '?' };
        format!(
            "{}{sep}{}={}",
            self.login_path,
            self.return_param,
            utf8_percent_encode(original, RETURN_URL),
        )
    }
}

impl Default for LoginRedirect {
    fn default() -> Self { Self::new() }
}

impl Middleware for LoginRedirect {
    fn after(&self, req: &RequestHead, res: Response) -> Response {
        if res.status_code() != StatusCode::UNAUTHORIZED {
            return res;
        }
        let location = self.location_for(req.path_and_query());
        debug!(path = req.path(), %location, "unauthorized, redirecting to login");
        Response::redirect(self.status.into(), &location)
    }
}

// ── RequestGate ───────────────────────────────────────────────────────────────

/// [`QueryIdentity`] and [`LoginRedirect`] as a single middleware.
#[derive(Clone, Debug, Default)]
pub struct RequestGate {
    identity: QueryIdentity,
    redirect: LoginRedirect,
}

impl RequestGate {
    pub fn new(identity: QueryIdentity, redirect: LoginRedirect) -> Self {
        Self { identity, redirect }
    }

    pub fn identity(&self) -> &QueryIdentity { &self.identity }
    pub fn redirect(&self) -> &LoginRedirect { &self.redirect }
}

impl Middleware for RequestGate {
    fn before(&self, req: &mut Request) -> Option<Response> {
        self.identity.before(req)
    }

    fn after(&self, req: &RequestHead, res: Response) -> Response {
        self.redirect.after(req, res)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn request(uri: &str) -> Request {
        Request::from_http(http::Request::get(uri).body(Bytes::new()).unwrap())
    }

    #[test]
    fn username_lands_in_context() {
        let mut req = request("/profile?username=alice");
        assert!(QueryIdentity::default().before(&mut req).is_none());
        assert_eq!(req.context().get("username"), Some("alice"));
    }

    #[test]
    fn missing_or_empty_username_leaves_context_alone() {
        for uri in ["/profile", "/profile?username=", "/profile?user=alice"] {
            let mut req = request(uri);
            assert!(QueryIdentity::default().before(&mut req).is_none());
            assert!(!req.context().contains("username"), "{uri}");
        }
    }

    #[test]
    fn custom_param_and_key() {
        let mut req = request("/?u=dave");
        QueryIdentity::new().param("u").context_key("user").before(&mut req);
        assert_eq!(req.context().get("user"), Some("dave"));
        assert!(!req.context().contains("username"));
    }

    #[test]
    fn unauthorized_becomes_redirect() {
        let req = request("/admin");
        let res = LoginRedirect::default()
            .after(req.head(), Response::status(StatusCode::UNAUTHORIZED));
        assert_eq!(res.status_code(), StatusCode::FOUND);
        assert_eq!(res.location(), Some("/login?returnUrl=/admin"));
    }

    #[test]
    fn other_statuses_pass_through() {
        let req = request("/admin");
        for status in [StatusCode::OK, StatusCode::FORBIDDEN, StatusCode::NOT_FOUND] {
            let res = LoginRedirect::default().after(
                req.head(),
                Response::builder().status(status).text("body"),
            );
            assert_eq!(res.status_code(), status);
            assert_eq!(res.body(), b"body");
            assert_eq!(res.location(), None);
        }
    }

    #[test]
    fn return_url_escapes_query_delimiters() {
        let redirect = LoginRedirect::default();
        assert_eq!(
            redirect.location_for("/search?q=a&b=c"),
            "/login?returnUrl=/search?q%3Da%26b%3Dc"
        );
        assert_eq!(
            redirect.location_for("/docs?q=a%20b#top"),
            "/login?returnUrl=/docs?q%3Da%2520b%23top"
        );
    }

    #[test]
    fn see_other_and_login_path_with_query() {
        let redirect = LoginRedirect::new()
            .login_path("/auth/login?theme=dark")
            .return_param("next")
            .status(RedirectStatus::SeeOther);
        let res = redirect.after(
            request("/secure").head(),
            Response::status(StatusCode::UNAUTHORIZED),
        );
        assert_eq!(res.status_code(), StatusCode::SEE_OTHER);
        assert_eq!(res.location(), Some("/auth/login?theme=dark&next=/secure"));
    }
}
