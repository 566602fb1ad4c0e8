//! The request gate written as two closures instead of the built-in
//! `RequestGate`, to show the shape of a hand-rolled middleware pair.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example closures
//!
//! Try:
//!   curl -i http://localhost:3000/profile?username=bob   → 200, "profile of bob"
//!   curl -i http://localhost:3000/admin                  → 302, location: /login?returnUrl=/admin

use wicket::middleware::{self, Trace};
use wicket::{Request, RequestHead, Response, Router, Server, StatusCode};

#[tokio::main]
async fn main() -> Result<(), wicket::Error> {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .get("/profile", profile)
        .get("/admin", admin)
        .with(Trace)
        .with(middleware::before(|req: &mut Request| {
            if let Some(user) = req.query().get_non_empty("username").map(str::to_owned) {
                req.context_mut().insert("username", user);
            }
            None
        }))
        .with(middleware::after(|req: &RequestHead, res: Response| {
            if res.status_code() == StatusCode::UNAUTHORIZED {
                let location = format!("/login?returnUrl={}", req.path_and_query());
                return Response::redirect(StatusCode::FOUND, &location);
            }
            res
        }));

    Server::bind("0.0.0.0:3000")?.serve(app).await
}

async fn profile(req: Request) -> Response {
    match req.context().get("username") {
        Some(user) => Response::text(format!("profile of {user}")),
        None => Response::status(StatusCode::UNAUTHORIZED),
    }
}

async fn admin(_req: Request) -> StatusCode {
    StatusCode::UNAUTHORIZED
}
