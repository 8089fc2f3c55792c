use tokio::io::AsyncRead;
use tracing::debug;

use crate::http::error::{HttpError, Result};
use crate::http::grammar::{Headers, parse_header_line, parse_request_target};
use crate::http::reader::LineReader;
use crate::http::request::{Method, Request, find_header};

/// Reads one request off the stream: request line, headers, then the body
/// if a Content-Length was sent.
///
/// Tokens after the target on the request line (normally the version) are
/// ignored. There is no chunked fallback; without Content-Length the body is
/// `None`.
pub async fn parse_request<R: AsyncRead + Unpin>(reader: &mut LineReader<R>) -> Result<Request> {
    // Request line
    let request_line = reader.read_line().await?;
    let mut parts = request_line.split(' ');

    let (method, target) = match (parts.next(), parts.next()) {
        (Some(method), Some(target)) => (method, target),
        _ => return Err(HttpError::bad_request("Invalid first request line")),
    };

    let method = Method::from(method);
    let (path, query) = parse_request_target(target);

    // Headers
    let mut headers = Headers::new();
    loop {
        let line = reader.read_line().await?;
        if line.is_empty() {
            break;
        }

        let (name, value) = parse_header_line(&line)?;
        headers.insert(name, value);
    }

    // Body
    let body = match content_length(&headers, reader.limits().max_body_bytes)? {
        Some(len) => Some(reader.read_body(len).await?),
        None => None,
    };

    debug!(
        method = %method,
        path = %path,
        headers = headers.len(),
        body_len = body.as_ref().map(Vec::len),
        "Parsed request"
    );

    Ok(Request {
        method,
        path,
        query,
        headers,
        body,
    })
}

fn content_length(headers: &Headers, max_body_bytes: usize) -> Result<Option<usize>> {
    let Some(raw) = find_header(headers, "Content-Length") else {
        return Ok(None);
    };

    let len = raw
        .parse::<usize>()
        .map_err(|_| HttpError::bad_request("Content-Length isn't integer"))?;

    if len > max_body_bytes {
        return Err(HttpError::bad_request("Content-Length too large"));
    }

    Ok(Some(len))
}
