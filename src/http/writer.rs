use std::io;
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Renders the status line, headers in map order, the blank separator and
/// the body.
///
/// Content-Length is taken from the response as is; `Response` keeps it in
/// step with the body.
pub fn serialize_response(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128 + resp.body().len());

    // Status line
    let status = resp.status();
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        status.as_u16(),
        status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in resp.headers() {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    // Body
    buf.extend_from_slice(resp.body());

    buf
}

/// Holds a fully serialized response and tracks how much of it has reached
/// the peer.
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
    write_timeout: Option<Duration>,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response),
            written: 0,
            write_timeout: None,
        }
    }

    /// Bounds every single write (and the final flush) by `limit`.
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.write_timeout = Some(limit);
        self
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Fails with [`io::ErrorKind::TimedOut`] once a write stalls past the
    /// configured timeout.
    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = self
                .deadline(stream.write(&self.buffer[self.written..]))
                .await?;

            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "connection closed while writing",
                ));
            }

            self.written += n;
        }

        self.deadline(stream.flush()).await
    }

    async fn deadline<T, F>(&self, fut: F) -> io::Result<T>
    where
        F: Future<Output = io::Result<T>>,
    {
        let Some(limit) = self.write_timeout else {
            return fut.await;
        };

        match timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "peer stopped reading the response",
            )),
        }
    }
}

/// Serializes `response` and writes all of it to `stream`.
pub async fn write_response<W>(stream: &mut W, response: &Response) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    ResponseWriter::new(response).write_to_stream(stream).await
}
