// Connection handling module
// Accepts a single TCP connection and serves it over HTTP/1.1

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Accept and process a connection, checking limits and logging.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            // Exceeded limit: rollback counter and reject
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);

    if let Err(err) = configure_stream(&stream) {
        logger::log_warning(&format!("Failed to set TCP_NODELAY for {peer_addr}: {err}"));
    }

    handle_connection(
        stream,
        peer_addr,
        Arc::clone(state),
        Arc::clone(conn_counter),
    );
}

/// Per-connection socket options. `TCP_NODELAY` is not inherited from the
/// listening socket on every platform, so it is set on each accepted stream.
fn configure_stream(stream: &TcpStream) -> std::io::Result<()> {
    stream.set_nodelay(true)
}

/// Serve a single connection in a spawned task.
///
/// The whole connection, keep-alive requests included, is bounded by
/// `max(read_timeout, write_timeout)`. The connection counter is decremented
/// when the task ends.
fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let performance = &state.config.performance;
        let timeout_duration = std::time::Duration::from_secs(std::cmp::max(
            performance.read_timeout,
            performance.write_timeout,
        ));

        let mut builder = http1::Builder::new();
        builder.keep_alive(performance.keep_alive);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let state = Arc::clone(&service_state);
                async move { handler::handle_request(req, state, peer_addr).await }
            }),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::{BodyExt, Full};
    use hyper::body::Bytes;
    use hyper::{header, Request, StatusCode};
    use std::time::Duration;
    use tokio::net::TcpListener;

    fn test_state(keep_alive: bool) -> Arc<AppState> {
        let mut cfg = Config::load_from("does-not-exist/calc-test-config", false, None).unwrap();
        cfg.logging.access_log = false;
        cfg.performance.keep_alive = keep_alive;
        Arc::new(AppState::new(&cfg))
    }

    #[tokio::test]
    async fn test_accepted_stream_has_nodelay() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).await.unwrap();
        let (stream, _) = listener.accept().await.unwrap();

        configure_stream(&stream).unwrap();
        assert!(stream.nodelay().unwrap());
        drop(client);
    }

    /// Serve one accepted connection and return the client side of it
    async fn serve_one(
        state: &Arc<AppState>,
    ) -> (
        hyper::client::conn::http1::SendRequest<Full<Bytes>>,
        tokio::task::JoinHandle<hyper::Result<()>>,
        SocketAddr,
    ) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let server_state = Arc::clone(state);
        tokio::spawn(async move {
            let (stream, peer) = listener.accept().await.unwrap();
            accept_connection(stream, peer, &server_state, &counter);
        });

        let stream = TcpStream::connect(addr).await.unwrap();
        let (sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .unwrap();
        (sender, tokio::spawn(conn), addr)
    }

    fn calc_request(addr: SocketAddr) -> Request<Full<Bytes>> {
        Request::post("/")
            .header(header::HOST, addr.to_string())
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Full::new(Bytes::from_static(
                b"query=%7B%22op%22%3A%22%2B%22%2C%22ops%22%3A%5B1%2C2%5D%7D",
            )))
            .unwrap()
    }

    #[tokio::test]
    async fn test_keep_alive_disabled_closes_after_response() {
        let state = test_state(false);
        let (mut sender, conn, addr) = serve_one(&state).await;

        let resp = sender.send_request(calc_request(addr)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"result":3}"#);

        // The server hangs up, so the client connection ends on its own
        tokio::time::timeout(Duration::from_secs(5), conn)
            .await
            .expect("connection stayed open")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_keep_alive_serves_several_requests() {
        let state = test_state(true);
        let (mut sender, conn, addr) = serve_one(&state).await;

        for _ in 0..2 {
            sender.ready().await.unwrap();
            let resp = sender.send_request(calc_request(addr)).await.unwrap();
            let body = resp.into_body().collect().await.unwrap().to_bytes();
            assert_eq!(&body[..], br#"{"result":3}"#);
        }
        assert!(!conn.is_finished());
    }
}
