//! End to end over a real socket.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use wicket::middleware::RequestGate;
use wicket::{Request, Response, Router, Server, StatusCode};

async fn admin(req: Request) -> Response {
    match req.context().get("username") {
        Some(user) => Response::text(format!("admin {user}")),
        None => Response::status(StatusCode::UNAUTHORIZED),
    }
}

async fn roundtrip(addr: std::net::SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();
    raw
}

#[tokio::test]
async fn gate_works_over_http() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let app = Router::new()
        .get("/admin", admin)
        .with(RequestGate::default());
    let server = tokio::spawn(
        Server::from_listener(listener).serve_with_shutdown(app, async {
            let _ = stopped.await;
        }),
    );

    let redirected = roundtrip(addr, "/admin").await;
    assert!(redirected.starts_with("HTTP/1.1 302 Found\r\n"), "{redirected}");
    assert!(redirected.contains("location: /login?returnUrl=/admin\r\n"), "{redirected}");

    let allowed = roundtrip(addr, "/admin?username=root").await;
    assert!(allowed.starts_with("HTTP/1.1 200 OK\r\n"), "{allowed}");
    assert!(allowed.ends_with("admin root"), "{allowed}");

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}

#[test]
fn bad_bind_address_is_an_error() {
    let err = Server::bind("not an address").err().unwrap();
    assert!(err.to_string().starts_with("invalid socket address `not an address`"));
}
