//! The demo site: a public page, a login form, and a page behind the gate.
//!
//! `GET /secure` answers 401 until a username is supplied. The gate turns that
//! into a redirect to `/login?returnUrl=/secure`; the login form posts back
//! here, and `POST /login` sends the browser to `returnUrl` with
//! `?username=` attached, which the gate picks up on the next request.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::config::Config;
use crate::middleware::{QueryIdentity, RequestGate, Trace};
use crate::{Request, Response, Router, StatusCode};

/// Builds the demo router with tracing and the request gate installed.
pub fn build_app(config: &Config) -> Router {
    Router::new()
        .get("/", home)
        .get(&config.login_path, login_form)
        .post(&config.login_path, login_submit)
        .get("/secure", secure)
        .get("/healthz", liveness)
        .with(Trace)
        .with(RequestGate::new(QueryIdentity::new(), config.login_redirect()))
}

async fn home(req: Request) -> Response {
    let greeting = match req.context().get("username") {
        Some(user) => format!("Hello, {}.", encode_text(user)),
        None => "Hello, stranger.".to_owned(),
    };
    Response::html(page(
        "Home",
        &format!(r#"<p>{greeting}</p><p><a href="/secure">Secure area</a></p>"#),
    ))
}

async fn login_form(req: Request) -> Response {
    let return_url = req.query().get("returnUrl").unwrap_or("/");
    Response::html(login_page(return_url, None))
}

/// An empty username re-renders the form with the posted `returnUrl`, so a
/// retry still lands on the page first asked for.
async fn login_submit(req: Request) -> Response {
    let form = req.form();
    let return_url = form.get("returnUrl")
        .or_else(|| req.query().get("returnUrl"))
        .unwrap_or("/");
    let Some(user) = form.get_non_empty("username") else {
        return Response::builder()
            .status(StatusCode::UNPROCESSABLE_ENTITY)
            .html(login_page(return_url, Some("Enter a username.")));
    };
    let target = local_target(return_url);
    let sep = if target.contains('?') { '&' } else { '?' };
    tracing::info!(user, to = target, "demo login");
    let user: String = form_urlencoded::byte_serialize(user.as_bytes()).collect();
    Response::redirect(StatusCode::SEE_OTHER, &format!("{target}{sep}username={user}"))
}

fn login_page(return_url: &str, error: Option<&str>) -> String {
    let error = error
        .map(|msg| format!(r#"<p class="error">{}</p>"#, encode_text(msg)))
        .unwrap_or_default();
    page(
        "Login",
        &format!(
            r#"{error}<form method="post">
  <input type="hidden" name="returnUrl" value="{}">
  <label>Username <input name="username" autofocus></label>
  <button type="submit">Log in</button>
</form>"#,
            encode_double_quoted_attribute(return_url),
        ),
    )
}

async fn secure(req: Request) -> Response {
    match req.context().get("username") {
        Some(user) => Response::html(page(
            "Secure",
            &format!("<p>Welcome to the secure area, {}.</p>", encode_text(user)),
        )),
        None => Response::status(StatusCode::UNAUTHORIZED),
    }
}

async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Only same-site paths are followed after login; anything else goes home.
///
/// Browsers read `/\host` as `//host` and strip tabs and newlines, so a
/// second byte of `/` or `\` and any control character are refused.
fn local_target(return_url: &str) -> &str {
    let bytes = return_url.as_bytes();
    let same_site = bytes.first() == Some(&b'/')
        && !matches!(bytes.get(1), Some(b'/' | b'\\'))
        && !return_url.chars().any(char::is_control);
    if same_site { return_url } else { "/" }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html><head><title>{title}</title></head><body><h1>{title}</h1>{body}</body></html>\n"
    )
}
