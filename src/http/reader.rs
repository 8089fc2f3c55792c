use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;

use crate::http::error::{HttpError, Result};

/// Chunk size used when reading a framed body
const BODY_CHUNK_SIZE: usize = 8192;

/// Per-connection read limits.
#[derive(Debug, Clone, Copy)]
pub struct ReadLimits {
    /// How long a single read may wait for data
    pub read_timeout: Duration,
    /// Longest accepted line, CRLF excluded
    pub max_line_length: usize,
    /// Largest accepted Content-Length
    pub max_body_bytes: usize,
}

impl Default for ReadLimits {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(2),
            max_line_length: 8192,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Reads CRLF-terminated lines and framed bodies straight off a stream.
///
/// Lines are read one octet at a time so nothing past the terminator is
/// consumed; the body that follows the headers stays on the stream until
/// [`LineReader::read_body`] asks for it.
pub struct LineReader<R> {
    inner: R,
    limits: ReadLimits,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(inner: R, limits: ReadLimits) -> Self {
        Self { inner, limits }
    }

    pub fn limits(&self) -> &ReadLimits {
        &self.limits
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reads one line and returns it without the trailing CRLF.
    ///
    /// A lone CR or LF is kept as part of the line.
    pub async fn read_line(&mut self) -> Result<String> {
        let mut line = Vec::new();

        loop {
            let byte = self.read_byte().await?;
            line.push(byte);

            if line.ends_with(b"\r\n") {
                line.truncate(line.len() - 2);
                break;
            }

            // One extra byte of slack for a CR still waiting on its LF
            if line.len() > self.limits.max_line_length.saturating_add(1) {
                return Err(HttpError::bad_request("line too long"));
            }
        }

        String::from_utf8(line).map_err(|_| HttpError::bad_request("Invalid UTF-8 in request"))
    }

    /// Reads exactly `len` bytes.
    ///
    /// The buffer grows as data arrives; a declared length is never
    /// allocated up front.
    pub async fn read_body(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut body = Vec::with_capacity(len.min(BODY_CHUNK_SIZE));
        let mut chunk = vec![0u8; len.min(BODY_CHUNK_SIZE)];

        while body.len() < len {
            let want = (len - body.len()).min(chunk.len());
            let n = timed(self.limits.read_timeout, self.inner.read(&mut chunk[..want])).await?;

            if n == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed before complete body received",
                )
                .into());
            }

            body.extend_from_slice(&chunk[..n]);
        }

        Ok(body)
    }

    async fn read_byte(&mut self) -> Result<u8> {
        timed(self.limits.read_timeout, self.inner.read_u8()).await
    }
}

/// Runs a single read, mapping an elapsed deadline to [`HttpError::Timeout`].
async fn timed<T, F>(limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = std::io::Result<T>>,
{
    match timeout(limit, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(HttpError::Timeout),
    }
}
