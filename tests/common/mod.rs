//! Shared utilities for integration testing.

use std::net::SocketAddr;

use http_engine::config::ServerConfig;
use http_engine::lifecycle::{self, Shutdown, StartupError};
use http_engine::net::Listener;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), StartupError>>,
}

/// Start the full server stack with `config`, ignoring its bind address.
pub async fn start_server(config: ServerConfig) -> TestServer {
    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = tcp.local_addr().unwrap();
    let listener = Listener::from_tcp(tcp, config.listener.max_connections);

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(lifecycle::run_with_listener(config, listener, rx));

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// Write `request` verbatim and read until the server closes the socket.
pub async fn send_raw(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    response
}

/// Split a raw response into its head (without the blank line) and body.
#[allow(dead_code)]
pub fn split_response(raw: &[u8]) -> (String, Vec<u8>) {
    let pos = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has no head terminator");
    let head = String::from_utf8(raw[..pos].to_vec()).unwrap();
    (head, raw[pos + 4..].to_vec())
}
