use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;

use webroot::http::connection::Connection;
use webroot::http::error::HttpError;
use webroot::http::handler::Handler;
use webroot::http::reader::ReadLimits;
use webroot::http::request::Request;
use webroot::http::response::Response;

/// Echoes the body back, or fails on a couple of reserved paths.
struct Echo;

impl Handler for Echo {
    async fn handle(&self, request: &Request) -> Result<Response, HttpError> {
        match request.path.as_str() {
            "/fail" => Err(std::io::Error::other("secret internal detail").into()),
            "/reject" => Err(HttpError::bad_request("rejected by handler")),
            "/large" => Ok(Response::ok("text/plain", vec![b'x'; 256 * 1024])),
            _ => Ok(Response::ok(
                "text/plain",
                request.body().unwrap_or_default().to_vec(),
            )),
        }
    }
}

fn limits(read_timeout: Duration) -> ReadLimits {
    ReadLimits {
        read_timeout,
        ..ReadLimits::default()
    }
}

fn start(limits: ReadLimits) -> (DuplexStream, JoinHandle<std::io::Result<()>>) {
    let (client, server) = tokio::io::duplex(16 * 1024);
    let conn = Connection::new(server, Arc::new(Echo), limits);
    (client, tokio::spawn(conn.run()))
}

async fn read_all(client: &mut DuplexStream) -> String {
    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

async fn exchange(request: &[u8]) -> String {
    let (mut client, task) = start(limits(Duration::from_secs(5)));

    client.write_all(request).await.unwrap();
    let response = read_all(&mut client).await;

    task.await.unwrap().unwrap();
    response
}

#[tokio::test]
async fn test_successful_exchange() {
    let response = exchange(b"POST /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello").await;

    assert_eq!(
        response,
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello"
    );
}

#[tokio::test]
async fn test_bad_request_line() {
    let response = exchange(b"GET\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(response.ends_with("\r\n\r\nInvalid first request line"));
}

#[tokio::test]
async fn test_bad_content_length() {
    let response = exchange(b"POST / HTTP/1.1\r\nContent-Length: 1x\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(response.contains("Content-Type: text/plain\r\n"));
    assert!(response.ends_with("Content-Length isn't integer"));
}

#[tokio::test]
async fn test_line_too_long() {
    let (mut client, task) = start(ReadLimits {
        max_line_length: 16,
        ..limits(Duration::from_secs(5))
    });

    client
        .write_all(b"GET /this/path/is/far/too/long HTTP/1.1\r\n\r\n")
        .await
        .unwrap();
    let response = read_all(&mut client).await;
    task.await.unwrap().unwrap();

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(response.ends_with("line too long"));
}

#[tokio::test]
async fn test_handler_bad_request() {
    let response = exchange(b"GET /reject HTTP/1.1\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(response.ends_with("rejected by handler"));
}

#[tokio::test]
async fn test_handler_failure_is_opaque_500() {
    let response = exchange(b"GET /fail HTTP/1.1\r\n\r\n").await;

    assert_eq!(
        response,
        "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\n\r\n"
    );
    assert!(!response.contains("secret"));
}

#[tokio::test]
async fn test_silent_client_times_out() {
    let (mut client, task) = start(limits(Duration::from_millis(50)));

    // Send nothing, keep the socket open, and wait for the server to give up
    let response = read_all(&mut client).await;
    task.await.unwrap().unwrap();

    assert_eq!(
        response,
        "HTTP/1.1 408 Request Timeout\r\nConnection: close\r\nContent-Length: 0\r\n\r\n"
    );
}

#[tokio::test]
async fn test_stalled_body_times_out() {
    let (mut client, task) = start(limits(Duration::from_millis(50)));

    client
        .write_all(b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc")
        .await
        .unwrap();
    let response = read_all(&mut client).await;
    task.await.unwrap().unwrap();

    assert!(response.starts_with("HTTP/1.1 408 Request Timeout\r\n"));
}

#[tokio::test]
async fn test_peer_closing_mid_request_is_500() {
    let (mut client, task) = start(limits(Duration::from_secs(5)));

    client.write_all(b"GET / HTTP/1.1\r\nHost: x").await.unwrap();
    client.shutdown().await.unwrap();
    let response = read_all(&mut client).await;
    task.await.unwrap().unwrap();

    assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
}

#[tokio::test]
async fn test_one_response_per_connection() {
    // A second pipelined request is never answered
    let response = exchange(b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n").await;

    assert_eq!(response.matches("HTTP/1.1 ").count(), 1);
}

#[tokio::test]
async fn test_client_that_never_reads_times_out() {
    let (mut client, server) = tokio::io::duplex(1024);
    let conn = Connection::new(server, Arc::new(Echo), limits(Duration::from_millis(50)));
    let task = tokio::spawn(conn.run());

    // Keep the client alive but never drain the response
    client.write_all(b"GET /large HTTP/1.1\r\n\r\n").await.unwrap();

    let result = tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("connection still blocked writing")
        .unwrap();

    let err = result.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::TimedOut);
    drop(client);
}
