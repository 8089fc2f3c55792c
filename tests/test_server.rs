use std::fs;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use webroot::config::Config;
use webroot::server::listener::serve;

#[tokio::test]
async fn test_slow_client_does_not_block_others() {
    let dir = tempfile::TempDir::new().unwrap();
    fs::write(dir.path().join("index.html"), "home").unwrap();

    let mut cfg = Config::default();
    cfg.static_files.root_dir = dir.path().to_path_buf();
    cfg.server.client_timeout_ms = 5_000;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { serve(listener, &cfg).await });

    // Connected but silent; would hold a sequential server for 5 seconds
    let _idle = TcpStream::connect(addr).await.unwrap();

    let mut client = TcpStream::connect(addr).await.unwrap();
    client
        .write_all(b"GET /index.html HTTP/1.1\r\nHost: test\r\n\r\n")
        .await
        .unwrap();

    let mut response = Vec::new();
    timeout(Duration::from_secs(2), client.read_to_end(&mut response))
        .await
        .expect("second client was not served while the first was idle")
        .unwrap();

    let response = String::from_utf8(response).unwrap();
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("Content-Type: text/html\r\n"));
    assert!(response.ends_with("\r\n\r\nhome"));
}
