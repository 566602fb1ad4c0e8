//! # wicket
//!
//! A minimal HTTP framework with an explicit middleware chain, and a small
//! gate built on it.
//!
//! ## The gate
//!
//! [`RequestGate`](middleware::RequestGate) is two hooks around every route:
//!
//! - **before**: `?username=alice` is copied into the request context, where
//!   handlers read it with `req.context().get("username")`.
//! - **after**: a `401 Unauthorized` from any handler is replaced by
//!   `302 Found` to `/login?returnUrl=<original URI>`.
//!
//! It does no authentication. Sessions, tokens, passwords and policy are out
//! of scope; the gate only shows where they plug into the pipeline.
//!
//! ## The chain
//!
//! Middleware is registered explicitly on the [`Router`], in order. There are
//! no global events: what runs around a handler is exactly what
//! [`Router::with`] was given.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use wicket::{Request, Response, Router, Server, StatusCode};
//! use wicket::middleware::{RequestGate, Trace};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), wicket::Error> {
//!     let app = Router::new()
//!         .get("/profile", profile)
//!         .with(Trace)
//!         .with(RequestGate::default());
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! async fn profile(req: Request) -> Response {
//!     match req.context().get("username") {
//!         Some(user) => Response::text(format!("profile of {user}")),
//!         None => Response::status(StatusCode::UNAUTHORIZED),
//!     }
//! }
//! ```

mod context;
mod error;
mod handler;
mod query;
mod request;
mod response;
mod router;
mod server;

pub mod config;
pub mod demo;
pub mod middleware;

pub use context::RequestContext;
pub use error::Error;
pub use handler::Handler;
pub use http::{Method, StatusCode};
pub use middleware::Middleware;
pub use query::Query;
pub use request::{Request, RequestHead};
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
